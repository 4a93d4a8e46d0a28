// ============================================================================
// Structure : Wallet
// ============================================================================
// Un wallet enregistré par l'utilisateur sous un surnom
//
// CONCEPTS RUST :
// 1. Serialize/Deserialize : le wallet est persisté tel quel en JSON
// 2. &str vs String : validation sur des slices, stockage en String
// ============================================================================

use serde::{Deserialize, Serialize};

/// Longueur de la partie hexadécimale d'une adresse (20 octets)
const ADDRESS_HEX_LEN: usize = 40;

/// Wallet suivi par l'assistant
///
/// Le surnom sert de clé de recherche mais son unicité n'est pas imposée :
/// la recherche retourne le premier wallet dans l'ordre d'insertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    /// Adresse au format 0x + 40 caractères hexa
    pub address: String,

    /// Surnom choisi par l'utilisateur (ou "WalletN" par défaut)
    pub nickname: String,
}

impl Wallet {
    /// Crée un wallet (l'adresse doit déjà être validée)
    pub fn new(address: impl Into<String>, nickname: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            nickname: nickname.into(),
        }
    }

    /// Compare le surnom sans tenir compte de la casse
    pub fn has_nickname(&self, name: &str) -> bool {
        self.nickname.to_lowercase() == name.to_lowercase()
    }

    /// Ligne affichée par "list wallets"
    pub fn display(&self) -> String {
        format!("{}: {}", self.nickname, self.address)
    }
}

/// Vérifie qu'une chaîne est une adresse Ethereum bien formée
///
/// CONCEPT RUST : strip_prefix
/// - Retourne Some(reste) si la chaîne commence par le préfixe
/// - Le préfixe "0x" est sensible à la casse, les chiffres hexa non
pub fn is_valid_address(candidate: &str) -> bool {
    match candidate.strip_prefix("0x") {
        Some(hex) => hex.len() == ADDRESS_HEX_LEN && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

// ============================================================================
// Tests
// ============================================================================
