// ============================================================================
// Structures : réponse de l'API de portfolio
// ============================================================================
// Tokens par réseau et stratégies suggérées pour un wallet
//
// CONCEPTS RUST :
// 1. Option<T> : les champs absents du JSON restent None
// 2. deserialize_with : normaliser null / tableau absent en Vec vide
// 3. serde_json::Value : champs libres (nombre ou texte)
//
// L'API n'est pas typée strictement : un champ de type inattendu ne doit
// jamais faire échouer le décodage de toute la réponse.
// ============================================================================

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Réponse complète de l'endpoint de portfolio
///
/// Format :
/// { "portfolio": [ { "network": {"name"}, "tokens": [...] } ],
///   "strategies": [ { "response": [ {"name", "risk", "actions"} ] } ] }
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PortfolioResponse {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub portfolio: Vec<NetworkBlock>,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub strategies: Vec<StrategyBlock>,
}

impl PortfolioResponse {
    /// Vrai si ni tokens ni stratégies (blocs présents mais vides inclus)
    pub fn is_empty(&self) -> bool {
        self.portfolio.is_empty() && self.strategies.is_empty()
    }

    /// Aplati tous les tokens de tous les réseaux pour le dashboard
    pub fn collect_tokens(&self) -> impl Iterator<Item = CollectedToken> + '_ {
        self.portfolio
            .iter()
            .flat_map(|block| block.tokens.iter())
            .map(CollectedToken::from)
    }
}

/// Tokens détenus sur un réseau
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NetworkBlock {
    /// Objet { "name": ... } en principe, mais accepté tel quel
    pub network: Option<Value>,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub tokens: Vec<TokenRecord>,
}

impl NetworkBlock {
    /// Nom du réseau, "Unknown Network" si absent ou null
    ///
    /// Seule l'absence déclenche le défaut : "" ou 0 sont affichés tels quels
    pub fn network_name(&self) -> String {
        self.network
            .as_ref()
            .and_then(|n| n.get("name"))
            .filter(|name| !name.is_null())
            .map(value_text)
            .unwrap_or_else(|| "Unknown Network".to_string())
    }
}

/// Un token et sa valorisation
///
/// CONCEPT : champs optionnels
/// - Les valeurs par défaut ("?", 0) sont appliquées à l'affichage
/// - balance / balanceUSD acceptent un nombre ou un nombre en texte
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TokenRecord {
    #[serde(default, deserialize_with = "lenient_text")]
    pub symbol: Option<String>,

    #[serde(default, deserialize_with = "lenient_f64")]
    pub balance: Option<f64>,

    #[serde(rename = "balanceUSD", default, deserialize_with = "lenient_f64")]
    pub balance_usd: Option<f64>,
}

impl TokenRecord {
    pub fn new(symbol: &str, balance: f64, balance_usd: f64) -> Self {
        Self {
            symbol: Some(symbol.to_string()),
            balance: Some(balance),
            balance_usd: Some(balance_usd),
        }
    }

    /// Symbole brut (chaîne vide si absent), utilisé pour la classification
    pub fn symbol_str(&self) -> &str {
        self.symbol.as_deref().unwrap_or("")
    }

    /// Ligne "symbol: balance (~$balanceUSD)"
    pub fn display(&self) -> String {
        let symbol = match self.symbol.as_deref() {
            Some(s) if !s.is_empty() => s,
            _ => "?",
        };
        format!(
            "{}: {} (~${})",
            symbol,
            self.balance.unwrap_or(0.0),
            self.balance_usd.unwrap_or(0.0)
        )
    }
}

/// Élément du collecteur du dashboard : symbole + valeur USD
#[derive(Debug, Clone, PartialEq)]
pub struct CollectedToken {
    pub symbol: String,
    pub balance_usd: f64,
}

impl CollectedToken {
    pub fn new(symbol: &str, balance_usd: f64) -> Self {
        Self {
            symbol: symbol.to_string(),
            balance_usd,
        }
    }
}

impl From<&TokenRecord> for CollectedToken {
    fn from(token: &TokenRecord) -> Self {
        Self {
            symbol: token.symbol_str().to_string(),
            balance_usd: token.balance_usd.unwrap_or(0.0),
        }
    }
}

/// Bloc de stratégies retourné par l'API
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StrategyBlock {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub response: Vec<Strategy>,
}

/// Stratégie suggérée (nom, risque, actions)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Strategy {
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: Option<String>,
    pub risk: Option<Value>,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub actions: Vec<StrategyAction>,
}

/// Action d'une stratégie (affichage uniquement)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StrategyAction {
    #[serde(default, deserialize_with = "lenient_text")]
    pub description: Option<String>,
    pub tokens: Option<Value>,

    #[serde(default, deserialize_with = "lenient_list")]
    pub networks: Vec<String>,

    #[serde(default, deserialize_with = "lenient_list")]
    pub operations: Vec<String>,

    pub apy: Option<Value>,
}

// ============================================================================
// Helpers d'affichage
// ============================================================================

/// Texte d'une valeur JSON telle qu'interpolée dans un message
///
/// - tableau : éléments joints par "," (null -> "")
/// - objet : "[object Object]"
/// - nombre : sans ".0" superflu (1.0 -> "1")
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) if n.is_f64() => n.as_f64().map_or_else(|| n.to_string(), |f| f.to_string()),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(value_text).collect::<Vec<_>>().join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

/// Vrai pour null, false, 0 et ""
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => true,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Texte d'un champ libre, ou `default` si absent / vide / nul / false
///
/// CONCEPT : valeurs "falsy"
/// - null, "", 0 et false sont tous remplacés par la valeur par défaut
pub fn text_or(value: Option<&Value>, default: &str) -> String {
    match value {
        Some(v) if !is_falsy(v) => value_text(v),
        _ => default.to_string(),
    }
}

/// Texte d'une chaîne optionnelle, ou `default` si absente ou vide
pub fn str_or<'a>(value: Option<&'a str>, default: &'a str) -> &'a str {
    match value {
        Some(s) if !s.is_empty() => s,
        _ => default,
    }
}

/// Joint une liste avec ", " ou retourne "N/A" si elle est vide
pub fn join_or_na(items: &[String]) -> String {
    if items.is_empty() {
        "N/A".to_string()
    } else {
        items.join(", ")
    }
}

// ============================================================================
// Désérialiseurs tolérants
// ============================================================================

/// Tableau absent ou null -> Vec vide
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// N'importe quelle valeur -> texte ; null / "" / 0 / false -> None
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.filter(|v| !is_falsy(v)).map(|v| value_text(&v)))
}

/// Tableau -> texte de chaque élément ; tout autre type -> Vec vide
fn lenient_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => items.iter().map(value_text).collect(),
        _ => Vec::new(),
    })
}

/// Nombre JSON ou nombre écrit en texte -> f64
fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

// ============================================================================
// Tests
// ============================================================================
