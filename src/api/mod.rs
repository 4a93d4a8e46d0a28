// ============================================================================
// Module : api
// ============================================================================
// Ce module contient le client de l'API de portfolio (tokens + stratégies)
// et le rendu de ses réponses dans le chat
// ============================================================================

pub mod portfolio;  // Client API portfolio/strategies

// Re-export des éléments principaux
pub use portfolio::{fetch_portfolio, HttpPortfolioClient, PortfolioSource, DEFAULT_ENDPOINT};
