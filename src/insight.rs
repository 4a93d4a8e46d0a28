// ============================================================================
// Module : insight
// ============================================================================
// Classification des tokens et phrases d'analyse du portfolio
//
// CONCEPTS RUST :
// 1. Iterators : filter / map / sum pour les agrégats
// 2. Enum : une seule recommandation possible (première branche gagnante)
// 3. Display : le texte de la recommandation vit avec l'enum
// ============================================================================

use std::fmt;

use crate::models::{CollectedToken, TokenRecord};

/// Motifs de stablecoins (sous-chaîne, insensible à la casse)
const STABLECOIN_PATTERNS: [&str; 3] = ["USDT", "USDC", "DAI"];

/// Phrase retournée quand le réseau n'a aucun token
pub const NO_TOKENS_SENTENCE: &str = "No tokens in this wallet.";

/// Vrai si le symbole contient USDT, USDC ou DAI
pub fn is_stablecoin(symbol: &str) -> bool {
    let upper = symbol.to_uppercase();
    STABLECOIN_PATTERNS.iter().any(|p| upper.contains(p))
}

/// Vrai si le symbole contient ETH
///
/// Indépendant de is_stablecoin : "USDCETH" est dans les deux catégories
pub fn is_eth(symbol: &str) -> bool {
    symbol.to_uppercase().contains("ETH")
}

// ============================================================================
// Résumé d'un réseau
// ============================================================================

/// Résumé en une phrase des tokens d'un réseau
///
/// Ordre fixe : nombre -> stablecoins -> ETH (premier seulement) ->
/// avertissement altcoins si aucune des deux catégories.
pub fn summarize_tokens(tokens: &[TokenRecord]) -> String {
    if tokens.is_empty() {
        return NO_TOKENS_SENTENCE.to_string();
    }

    let stable: Vec<&str> = tokens
        .iter()
        .map(TokenRecord::symbol_str)
        .filter(|s| is_stablecoin(s))
        .collect();
    let first_eth = tokens.iter().find(|t| is_eth(t.symbol_str()));

    let mut summary = format!("This wallet holds {} tokens. ", tokens.len());

    if !stable.is_empty() {
        summary.push_str(&format!("Stablecoins detected: {}. ", stable.join(", ")));
    }

    if let Some(eth) = first_eth {
        summary.push_str(&format!(
            "ETH balance: {} (~${}). ",
            format_optional(eth.balance),
            format_optional(eth.balance_usd)
        ));
    }

    if stable.is_empty() && first_eth.is_none() {
        summary.push_str("Mostly altcoins, higher volatility risk.");
    }

    summary
}

/// Valeur absente affichée "N/A" (champ manquant dans l'API)
fn format_optional(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| v.to_string())
}

// ============================================================================
// Agrégats du dashboard
// ============================================================================

/// Totaux USD par catégorie sur tous les wallets
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DashboardTotals {
    pub total: f64,
    pub eth: f64,
    pub stable: f64,
    /// total - eth - stable : un token dans les deux catégories est
    /// soustrait deux fois
    pub alt: f64,
}

impl DashboardTotals {
    /// Calcule les totaux à partir du collecteur
    pub fn from_tokens(tokens: &[CollectedToken]) -> Self {
        let total: f64 = tokens.iter().map(|t| t.balance_usd).sum();
        let eth: f64 = tokens
            .iter()
            .filter(|t| is_eth(&t.symbol))
            .map(|t| t.balance_usd)
            .sum();
        let stable: f64 = tokens
            .iter()
            .filter(|t| is_stablecoin(&t.symbol))
            .map(|t| t.balance_usd)
            .sum();

        Self {
            total,
            eth,
            stable,
            alt: total - eth - stable,
        }
    }

    /// Part d'une valeur dans le total (NaN si total = 0)
    pub fn share(&self, value: f64) -> f64 {
        value / self.total
    }

    /// Pourcentage formaté avec une décimale
    pub fn percent(&self, value: f64) -> String {
        to_fixed(self.share(value) * 100.0, 1)
    }

    /// Recommandation : première condition vraie, comparaisons strictes
    pub fn insight(&self) -> PortfolioInsight {
        if self.share(self.stable) > 0.5 {
            PortfolioInsight::HeavyStablecoins
        } else if self.share(self.eth) > 0.5 {
            PortfolioInsight::EthHeavy
        } else if self.share(self.alt) > 0.4 {
            PortfolioInsight::HighAltcoinExposure
        } else {
            PortfolioInsight::Balanced
        }
    }
}

/// Assez de décimales pour l'expansion exacte de n'importe quel f64
const EXACT_DIGITS: usize = 1100;

/// Formate avec `digits` décimales, les égalités exactes arrondies
/// en s'éloignant de zéro (0.125 -> "0.13")
///
/// CONCEPT : `{:.2}` arrondit les égalités au chiffre pair (0.125 -> "0.12").
/// L'expansion décimale exacte permet de détecter une vraie égalité,
/// et pas un 1.005 qui vaut en réalité 1.00499999...
pub fn to_fixed(value: f64, digits: usize) -> String {
    let rounded = format!("{:.*}", digits, value);

    let exact = format!("{:.*}", EXACT_DIGITS, value.abs());
    let Some((_, fraction)) = exact.split_once('.') else {
        return rounded;
    };
    let tail = &fraction[digits..];
    let is_tie = tail.starts_with('5') && tail[1..].bytes().all(|b| b == b'0');
    if !is_tie {
        return rounded;
    }

    let step = 10f64.powi(digits as i32);
    let away = (value.abs() * step).ceil() / step;
    let sign = if value < 0.0 { "-" } else { "" };
    format!("{}{:.*}", sign, digits, away)
}

/// Recommandation globale du dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortfolioInsight {
    HeavyStablecoins,
    EthHeavy,
    HighAltcoinExposure,
    Balanced,
}

impl fmt::Display for PortfolioInsight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            PortfolioInsight::HeavyStablecoins => "You are heavily in stablecoins → safe but low yield.",
            PortfolioInsight::EthHeavy => "Most of your holdings are in ETH → strong but volatile.",
            PortfolioInsight::HighAltcoinExposure => "High altcoin exposure → risky but could be high reward.",
            PortfolioInsight::Balanced => "Balanced portfolio between ETH, stables, and altcoins.",
        };
        write!(f, "{}", text)
    }
}

// ============================================================================
// Tests
// ============================================================================
