// ============================================================================
// Analito - Library
// ============================================================================
// Expose les modules publics pour le binaire et les tests
// ============================================================================

pub mod api;       // Client de l'API de portfolio
pub mod app;       // État de l'application TUI
pub mod assistant; // Interprétation des commandes du chat
pub mod config;    // Configuration (variables d'environnement)
pub mod error;     // Erreurs du domaine
pub mod insight;   // Résumés et agrégats du portfolio
pub mod models;    // Structures de données
pub mod store;     // Wallets persistés
pub mod ui;        // Interface utilisateur
