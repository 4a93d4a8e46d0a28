// ============================================================================
// Configuration
// ============================================================================
// Lit la configuration depuis l'environnement (et un éventuel fichier .env)
//
// Variables reconnues :
// - ANALITO_API_URL  : endpoint de l'API de portfolio
// - ANALITO_DATA_DIR : répertoire du fichier wallets.json
// - ANALITO_LOG_DIR  : répertoire des logs
// ============================================================================

use std::env;
use std::path::PathBuf;

use crate::api::DEFAULT_ENDPOINT;

/// Nom du fichier de persistance des wallets
pub const WALLETS_FILE: &str = "wallets.json";

/// Configuration de l'application
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Endpoint GET <api_url>?address=<addr>
    pub api_url: String,

    /// Répertoire contenant wallets.json
    pub data_dir: PathBuf,

    /// Répertoire des fichiers de logs
    pub log_dir: PathBuf,
}

impl Config {
    /// Charge .env (s'il existe) puis lit les variables d'environnement
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Construit la config à partir d'une fonction de lecture
    ///
    /// CONCEPT RUST : closure en paramètre (impl Fn)
    /// - Permet de tester sans toucher aux vraies variables d'environnement
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_url = non_empty("ANALITO_API_URL").unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

        // Linux : ~/.local/share/analito
        let data_dir = non_empty("ANALITO_DATA_DIR")
            .map(PathBuf::from)
            .or_else(|| dirs::data_dir().map(|d| d.join("analito")))
            .unwrap_or_else(|| PathBuf::from("./data"));

        let log_dir = non_empty("ANALITO_LOG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./logs"));

        Self {
            api_url,
            data_dir,
            log_dir,
        }
    }

    /// Chemin complet du fichier des wallets
    pub fn wallets_path(&self) -> PathBuf {
        self.data_dir.join(WALLETS_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(|_| None);
        assert_eq!(config.api_url, DEFAULT_ENDPOINT);
        assert_eq!(config.log_dir, PathBuf::from("./logs"));
        assert!(config.wallets_path().ends_with(WALLETS_FILE));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("ANALITO_API_URL", "http://localhost:8080/portfolio"),
            ("ANALITO_DATA_DIR", "/tmp/analito"),
            ("ANALITO_LOG_DIR", "  "),
        ]
        .into_iter()
        .collect();

        let config = Config::from_lookup(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.api_url, "http://localhost:8080/portfolio");
        assert_eq!(config.wallets_path(), PathBuf::from("/tmp/analito/wallets.json"));
        // Valeur vide -> défaut
        assert_eq!(config.log_dir, PathBuf::from("./logs"));
    }
}
