// ============================================================================
// Module : ui
// ============================================================================
// Gère toute l'interface utilisateur (Terminal User Interface)
// ============================================================================

pub mod chat;   // Rendu du chat (transcript + saisie)
pub mod events; // Gestion des événements clavier

// Re-exports pour simplifier les imports
pub use chat::render;
pub use events::{Event, EventHandler};
