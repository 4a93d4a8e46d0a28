// ============================================================================
// Module : models
// ============================================================================
// Ce module contient toutes les structures de données de l'application
//
// CONCEPT RUST : Modules et visibilité
// - "pub mod" : déclare un sous-module publique (accessible depuis l'extérieur)
// - Sans "pub", le module serait privé au crate
// ============================================================================

pub mod message;   // Messages du chat et destination (ChatOutput)
pub mod portfolio; // Réponse de l'API de portfolio
pub mod wallet;    // Wallet enregistré + validation d'adresse

// Re-export des structures principales pour simplifier les imports
// Au lieu de : use analito::models::wallet::Wallet;
// On peut faire : use analito::models::Wallet;
pub use message::{ChatLog, ChatMessage, ChatOutput, Fragment, LineStyle, MessageBody, MessageId, RichLine, Sender};
pub use portfolio::{CollectedToken, NetworkBlock, PortfolioResponse, Strategy, StrategyAction, TokenRecord};
pub use wallet::{is_valid_address, Wallet};
