// ============================================================================
// Erreurs du domaine
// ============================================================================
// Taxonomie des erreurs que l'assistant peut rencontrer
//
// CONCEPTS RUST :
// 1. thiserror : dérive Display et Error à partir d'attributs
// 2. Enum d'erreurs : le compilateur force à gérer chaque cas
//
// Aucune de ces erreurs n'est fatale : elles sont toutes converties en
// message de chat à l'endroit où elles surviennent.
// ============================================================================

use thiserror::Error;

/// Alias de Result pour les opérations de l'assistant
pub type Result<T> = std::result::Result<T, AssistantError>;

/// Erreurs de l'assistant
#[derive(Error, Debug)]
pub enum AssistantError {
    /// L'adresse ne respecte pas le format 0x + 40 caractères hexa
    #[error("Invalid Ethereum address: {0}")]
    InvalidAddress(String),

    /// Commande avec trop peu d'arguments
    #[error("Usage: {usage}")]
    MissingArguments { usage: &'static str },

    /// Aucun wallet avec ce surnom
    #[error("No wallet found with nickname \"{0}\"")]
    WalletNotFound(String),

    /// Statut HTTP non-2xx, erreur réseau ou JSON illisible
    #[error("API error: {0}")]
    Api(String),

    /// Aucune donnée de portfolio pour la cible donnée
    #[error("No portfolio data found for {0}.")]
    EmptyResult(String),

    /// Échec de l'écriture du fichier des wallets
    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<reqwest::Error> for AssistantError {
    fn from(err: reqwest::Error) -> Self {
        AssistantError::Api(err.to_string())
    }
}
