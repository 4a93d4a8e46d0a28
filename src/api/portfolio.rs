// ============================================================================
// API Client : Portfolio & Strategies
// ============================================================================
// Récupère les tokens et stratégies d'un wallet depuis l'API de portfolio
//
// CONCEPTS RUST AVANCÉS :
// 1. async/await : programmation asynchrone (non-bloquante)
// 2. async_trait : source de données interchangeable (HTTP ou fake en test)
// 3. Option<&mut T> : mode collecteur vs mode rendu dans la même fonction
// ============================================================================

use async_trait::async_trait;
use tracing::{debug, error, info, instrument};

use crate::error::{AssistantError, Result};
use crate::insight::summarize_tokens;
use crate::models::portfolio::{join_or_na, str_or, text_or};
use crate::models::{
    ChatMessage, ChatOutput, CollectedToken, NetworkBlock, PortfolioResponse, RichLine, Strategy,
    StrategyAction,
};

/// Endpoint par défaut de l'API de portfolio
pub const DEFAULT_ENDPOINT: &str = "https://aura.adex.network/api/portfolio/strategies";

// ============================================================================
// Trait PortfolioSource
// ============================================================================
// CONCEPT RUST : Trait objects (dyn Trait)
// - L'assistant ne connaît que le trait
// - En production : HttpPortfolioClient (reqwest)
// - En test : une source en mémoire qui compte les appels
// ============================================================================

/// Source des données de portfolio d'un wallet
#[async_trait]
pub trait PortfolioSource: Send + Sync {
    /// Récupère le portfolio et les stratégies d'une adresse
    async fn fetch(&self, address: &str) -> Result<PortfolioResponse>;
}

/// Client HTTP vers l'endpoint de portfolio
#[derive(Debug, Clone)]
pub struct HttpPortfolioClient {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpPortfolioClient {
    /// Crée le client HTTP
    ///
    /// Aucun timeout : une requête bloquée bloque la commande en cours
    pub fn new(endpoint: impl Into<String>) -> anyhow::Result<Self> {
        use anyhow::Context;

        let client = reqwest::Client::builder()
            .user_agent(concat!("analito/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Échec de la création du client HTTP")?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl PortfolioSource for HttpPortfolioClient {
    #[instrument(skip(self))]
    async fn fetch(&self, address: &str) -> Result<PortfolioResponse> {
        debug!(endpoint = %self.endpoint, "Sending HTTP request to portfolio API");

        // CONCEPT : query() encode les paramètres dans l'URL
        // -> GET <endpoint>?address=<addr>
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("address", address)])
            .send()
            .await?;

        let status = response.status();
        debug!(status = %status, "Received HTTP response");

        // Vérifie que la réponse est un succès HTTP (200-299)
        if !status.is_success() {
            error!(status = %status, "Portfolio API returned error status");
            return Err(AssistantError::Api(status.as_u16().to_string()));
        }

        let data: PortfolioResponse = response.json().await?;
        info!(
            networks = data.portfolio.len(),
            strategies = data.strategies.len(),
            "Portfolio fetched"
        );
        Ok(data)
    }
}

// ============================================================================
// Fetch + rendu
// ============================================================================

/// Récupère le portfolio d'un wallet et l'affiche (ou le collecte)
///
/// CONCEPT : deux modes
/// - collector = Some(vec) : aplatit les tokens dans vec, n'affiche rien
/// - collector = None : affiche réseaux, insights et stratégies
///
/// Les erreurs ne remontent jamais : elles sont affichées dans le chat
/// et la fonction retourne normalement.
pub async fn fetch_portfolio(
    source: &dyn PortfolioSource,
    address: &str,
    nickname: &str,
    collector: Option<&mut Vec<CollectedToken>>,
    out: &mut dyn ChatOutput,
) {
    let data = match source.fetch(address).await {
        Ok(data) => data,
        Err(e) => {
            error!(address = %address, nickname = %nickname, error = %e, "Portfolio fetch failed");
            out.post(ChatMessage::bot(format!("❌ Error: {}", e)));
            return;
        }
    };

    // Mode collecteur : pas de rendu
    if let Some(collector) = collector {
        let before = collector.len();
        collector.extend(data.collect_tokens());
        debug!(nickname = %nickname, collected = collector.len() - before, "Tokens collected");
        return;
    }

    if data.is_empty() {
        out.post(ChatMessage::bot(format!(
            "Wallet \"{}\" has no tokens or strategies.",
            nickname
        )));
        return;
    }

    for block in &data.portfolio {
        out.post(ChatMessage::rich(render_network(nickname, block)));
        out.post(ChatMessage::bot(format!(
            "💡 Insight: {}",
            summarize_tokens(&block.tokens)
        )));
    }

    for strategy in data.strategies.iter().flat_map(|b| b.response.iter()) {
        out.post(ChatMessage::rich(render_strategy(strategy)));
    }
}

/// En-tête "surnom – réseau" puis une ligne par token
fn render_network(nickname: &str, block: &NetworkBlock) -> Vec<RichLine> {
    let mut lines = vec![RichLine::strong(format!(
        "{} – {}",
        nickname,
        block.network_name()
    ))];
    lines.extend(block.tokens.iter().map(|t| RichLine::text(t.display())));
    lines
}

/// Nom, risque, puis une carte par action
fn render_strategy(strategy: &Strategy) -> Vec<RichLine> {
    let mut lines = vec![
        RichLine::strong(format!(
            "Strategy: {}",
            str_or(strategy.name.as_deref(), "Unnamed")
        )),
        RichLine::text(format!("Risk: {}", text_or(strategy.risk.as_ref(), "N/A"))),
    ];

    for action in &strategy.actions {
        lines.extend(render_action(action));
    }
    lines
}

fn render_action(action: &StrategyAction) -> Vec<RichLine> {
    vec![
        RichLine::text(str_or(action.description.as_deref(), "No description")).in_card(),
        RichLine::labeled("Tokens", text_or(action.tokens.as_ref(), "N/A")).in_card(),
        RichLine::labeled("Networks", join_or_na(&action.networks)).in_card(),
        RichLine::labeled("Operations", join_or_na(&action.operations)).in_card(),
        RichLine::labeled("APY", text_or(action.apy.as_ref(), "N/A")).in_card(),
    ]
}

// ============================================================================
// Tests unitaires
// ============================================================================
