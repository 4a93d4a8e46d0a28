// ============================================================================
// Module : store
// ============================================================================
// Liste des wallets en mémoire, synchronisée avec un fichier JSON
//
// CONCEPTS RUST :
// 1. PathBuf : chemin possédé vers le fichier de persistance
// 2. anyhow::Context : messages d'erreur lisibles pour les I/O
// 3. Option<&T> : recherche sans copie
//
// Le fichier est lu une seule fois au démarrage et réécrit en entier à
// chaque ajout. Plusieurs processus concurrents ne sont pas coordonnés.
// ============================================================================

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{debug, info, warn};

use crate::error::{AssistantError, Result};
use crate::models::{is_valid_address, Wallet};

/// Wallets enregistrés, dans l'ordre d'insertion
#[derive(Debug)]
pub struct WalletStore {
    path: PathBuf,
    wallets: Vec<Wallet>,
}

impl WalletStore {
    /// Charge la liste persistée
    ///
    /// Fichier absent ou illisible -> liste vide, aucune erreur remontée
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let wallets = match read_wallets(&path) {
            Ok(Some(wallets)) => {
                info!(path = ?path, count = wallets.len(), "Loaded saved wallets");
                wallets
            }
            Ok(None) => {
                debug!(path = ?path, "No wallet file yet, starting empty");
                Vec::new()
            }
            Err(e) => {
                warn!(path = ?path, error = ?e, "Ignoring unreadable wallet file");
                Vec::new()
            }
        };

        Self { path, wallets }
    }

    /// Ajoute un wallet et réécrit le fichier
    ///
    /// Sans surnom, le wallet s'appelle "WalletN" (N = nombre actuel + 1).
    /// L'ajout en mémoire a lieu avant l'écriture : une erreur d'écriture
    /// laisse le wallet dans la liste de la session.
    pub fn add(&mut self, address: &str, nickname: Option<&str>) -> Result<&Wallet> {
        if !is_valid_address(address) {
            return Err(AssistantError::InvalidAddress(address.to_string()));
        }

        let nickname = match nickname {
            Some(name) => name.to_string(),
            None => format!("Wallet{}", self.wallets.len() + 1),
        };

        info!(nickname = %nickname, address = %address, "Adding wallet");
        self.wallets.push(Wallet::new(address, nickname));

        self.persist()
            .map_err(|e| AssistantError::Storage(format!("{:#}", e)))?;

        // CONCEPT RUST : last() après push ne peut pas être None
        self.wallets
            .last()
            .ok_or_else(|| AssistantError::Storage("wallet list is empty after insert".to_string()))
    }

    /// Wallets dans l'ordre d'insertion
    pub fn list(&self) -> &[Wallet] {
        &self.wallets
    }

    /// Premier wallet dont le surnom correspond (insensible à la casse)
    pub fn find_by_nickname(&self, name: &str) -> Option<&Wallet> {
        self.wallets.iter().find(|w| w.has_nickname(name))
    }

    pub fn len(&self) -> usize {
        self.wallets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wallets.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Réécrit la liste complète
    fn persist(&self) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Échec de la création de {}", parent.display()))?;
            }
        }

        let json = serde_json::to_string(&self.wallets).context("Échec de la sérialisation des wallets")?;
        fs::write(&self.path, json)
            .with_context(|| format!("Échec de l'écriture de {}", self.path.display()))?;

        debug!(path = ?self.path, count = self.wallets.len(), "Wallet file rewritten");
        Ok(())
    }
}

/// Lit le fichier : Ok(None) s'il n'existe pas
fn read_wallets(path: &Path) -> anyhow::Result<Option<Vec<Wallet>>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Échec de la lecture de {}", path.display()))?;
    let wallets = serde_json::from_str(&content).context("Fichier des wallets malformé")?;
    Ok(Some(wallets))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const ADDR_A: &str = "0xAbC1234567890abcdef1234567890ABCDEF12345";
    const ADDR_B: &str = "0x0000000000000000000000000000000000000001";

    /// Chemin unique dans le répertoire temporaire
    fn temp_path(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("analito-store-{}-{}", std::process::id(), name));
        let _ = fs::remove_dir_all(&dir);
        dir.join("wallets.json")
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let store = WalletStore::load(temp_path("missing"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_load_malformed_file_is_empty() {
        let path = temp_path("malformed");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{ not json").unwrap();

        let store = WalletStore::load(&path);
        assert!(store.is_empty());
    }

    #[test]
    fn test_add_persists_and_reloads() {
        let path = temp_path("reload");
        let mut store = WalletStore::load(&path);

        store.add(ADDR_A, Some("Foo")).unwrap();
        store.add(ADDR_B, None).unwrap();

        let reloaded = WalletStore::load(&path);
        assert_eq!(reloaded.list(), store.list());
        assert_eq!(reloaded.list()[0], Wallet::new(ADDR_A, "Foo"));
        assert_eq!(reloaded.list()[1].nickname, "Wallet2");
    }

    #[test]
    fn test_add_rejects_invalid_address() {
        let mut store = WalletStore::load(temp_path("invalid"));
        let err = store.add("nothex", Some("Foo")).unwrap_err();

        assert!(matches!(err, AssistantError::InvalidAddress(_)));
        assert!(store.is_empty());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_find_by_nickname_first_match() {
        let mut store = WalletStore::load(temp_path("find"));
        store.add(ADDR_A, Some("Main")).unwrap();
        store.add(ADDR_B, Some("main")).unwrap();

        let found = store.find_by_nickname("MAIN").unwrap();
        assert_eq!(found.address, ADDR_A);
        assert!(store.find_by_nickname("Bar").is_none());
    }

    #[test]
    fn test_default_nickname_counts_existing() {
        let mut store = WalletStore::load(temp_path("default-name"));
        let first = store.add(ADDR_A, None).unwrap().nickname.clone();
        let second = store.add(ADDR_B, Some("Named")).unwrap().nickname.clone();
        let third = store.add(ADDR_A, None).unwrap().nickname.clone();

        assert_eq!(first, "Wallet1");
        assert_eq!(second, "Named");
        assert_eq!(third, "Wallet3");
    }
}
