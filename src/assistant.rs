// ============================================================================
// Structure : Assistant
// ============================================================================
// Interprète les lignes saisies par l'utilisateur et exécute les commandes
//
// CONCEPTS RUST :
// 1. State machine : awaiting_address_reply oscille entre false et true
// 2. Ownership : l'Assistant possède le WalletStore de la session
// 3. Arc<dyn Trait> : source de portfolio partageable et remplaçable
// 4. async fn + &mut dyn ChatOutput : les messages partent au fil de l'eau
//
// Commandes (insensibles à la casse, dans cet ordre de priorité) :
// - add wallet <address> [<nickname>]
// - list wallets
// - check wallet <nickname>
// - dashboard
// - sinon : conversation d'accueil / saisie d'une adresse brute
// ============================================================================

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::api::{fetch_portfolio, PortfolioSource};
use crate::error::AssistantError;
use crate::insight::{to_fixed, DashboardTotals};
use crate::models::{is_valid_address, ChatMessage, ChatOutput, CollectedToken, RichLine};
use crate::store::WalletStore;

/// Aide affichée quand une commande manque d'arguments
const ADD_USAGE: &str = "add wallet <address> <nickname>";

/// Préfixes des commandes
const ADD_PREFIX: &str = "add wallet";
const CHECK_PREFIX: &str = "check wallet";

/// Commande reconnue dans une ligne de saisie
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command<'a> {
    /// Tokens séparés par des espaces (mots de commande inclus)
    AddWallet(Vec<&'a str>),
    ListWallets,
    /// Surnom après le préfixe "check wallet"
    CheckWallet(&'a str),
    Dashboard,
    /// Aucune commande : conversation libre
    Other(&'a str),
}

impl<'a> Command<'a> {
    /// Reconnaît une commande (la ligne doit déjà être trimée)
    ///
    /// CONCEPT RUST : Lifetimes
    /// - Command<'a> emprunte des morceaux de `line`, sans copie
    pub fn parse(line: &'a str) -> Self {
        let lower = line.to_lowercase();

        if lower.starts_with(ADD_PREFIX) {
            Command::AddWallet(line.split_whitespace().collect())
        } else if lower == "list wallets" {
            Command::ListWallets
        } else if lower.starts_with(CHECK_PREFIX) {
            // Les préfixes sont ASCII : même longueur en minuscules
            let nickname = line.get(CHECK_PREFIX.len()..).unwrap_or("").trim();
            Command::CheckWallet(nickname)
        } else if lower == "dashboard" {
            Command::Dashboard
        } else {
            Command::Other(line)
        }
    }
}

/// Session de chat : wallets + état de la conversation
pub struct Assistant {
    store: WalletStore,
    source: Arc<dyn PortfolioSource>,

    /// Vrai après l'aide d'accueil : la prochaine saisie libre est
    /// traitée comme une adresse
    awaiting_address_reply: bool,
}

impl Assistant {
    pub fn new(store: WalletStore, source: Arc<dyn PortfolioSource>) -> Self {
        Self {
            store,
            source,
            awaiting_address_reply: false,
        }
    }

    pub fn store(&self) -> &WalletStore {
        &self.store
    }

    pub fn is_awaiting_address_reply(&self) -> bool {
        self.awaiting_address_reply
    }

    /// Messages de bienvenue affichés à l'ouverture de la session
    pub fn greet(&self, out: &mut dyn ChatOutput) {
        out.post(ChatMessage::bot(
            "👋 Hi! I'm Analito, your Smart Portfolio Assistant. You can:",
        ));
        out.post(ChatMessage::rich(vec![
            RichLine::text("• Add a wallet → `add wallet 0x123... MyWallet`"),
            RichLine::text("• List wallets → `list wallets`"),
            RichLine::text("• Check one → `check wallet MyWallet`"),
            RichLine::text("• Multi-wallet overview → `dashboard`"),
        ]));
    }

    /// Traite une ligne saisie par l'utilisateur
    ///
    /// Ligne vide (après trim) : rien. Sinon la ligne est affichée comme
    /// message utilisateur puis la commande est exécutée. Aucune erreur ne
    /// sort d'ici : la session reste prête pour la saisie suivante.
    pub async fn handle_input(&mut self, input: &str, out: &mut dyn ChatOutput) {
        let line = input.trim();
        if line.is_empty() {
            return;
        }

        out.post(ChatMessage::user(line));

        let command = Command::parse(line);
        debug!(?command, "Dispatching user input");

        match command {
            Command::AddWallet(parts) => self.add_wallet(&parts, out),
            Command::ListWallets => self.list_wallets(out),
            Command::CheckWallet(nickname) => self.check_wallet(nickname, out).await,
            Command::Dashboard => self.build_dashboard(out).await,
            Command::Other(text) => self.converse(text, out).await,
        }
    }

    // ========================================================================
    // Commandes
    // ========================================================================

    fn add_wallet(&mut self, parts: &[&str], out: &mut dyn ChatOutput) {
        if parts.len() < 3 {
            let err = AssistantError::MissingArguments { usage: ADD_USAGE };
            debug!(error = %err, "Rejected add wallet");
            out.post(ChatMessage::bot(err.to_string()));
            return;
        }

        let address = parts[2];
        let nickname = parts.get(3).copied();

        match self.store.add(address, nickname) {
            Ok(wallet) => {
                out.post(ChatMessage::bot(format!("✅ Wallet \"{}\" added.", wallet.nickname)));
            }
            Err(AssistantError::InvalidAddress(addr)) => {
                debug!(address = %addr, "Rejected invalid address");
                out.post(ChatMessage::bot("❌ Invalid Ethereum address."));
            }
            Err(e) => {
                warn!(error = %e, "Wallet kept in session but not saved");
                out.post(ChatMessage::bot(format!("❌ Error: {}", e)));
            }
        }
    }

    fn list_wallets(&self, out: &mut dyn ChatOutput) {
        if self.store.is_empty() {
            out.post(ChatMessage::bot(format!(
                "No wallets saved yet. Use: {}",
                ADD_USAGE
            )));
            return;
        }

        let mut lines = vec![RichLine::text("💼 Saved wallets:")];
        lines.extend(
            self.store
                .list()
                .iter()
                .map(|w| RichLine::text(format!("• {}", w.display()))),
        );
        out.post(ChatMessage::rich(lines));
    }

    async fn check_wallet(&self, nickname: &str, out: &mut dyn ChatOutput) {
        let Some(wallet) = self.store.find_by_nickname(nickname) else {
            let err = AssistantError::WalletNotFound(nickname.to_string());
            debug!(error = %err, "Lookup miss");
            out.post(ChatMessage::bot(format!("❌ {}.", err)));
            return;
        };

        info!(nickname = %wallet.nickname, "Checking wallet");
        fetch_portfolio(self.source.as_ref(), &wallet.address, &wallet.nickname, None, out).await;
    }

    /// Conversation libre : aide d'accueil, puis saisie d'une adresse
    async fn converse(&mut self, text: &str, out: &mut dyn ChatOutput) {
        if !self.awaiting_address_reply {
            out.post(ChatMessage::bot(format!(
                "I can track wallets for you. Try: {}",
                ADD_USAGE
            )));
            self.awaiting_address_reply = true;
            return;
        }

        if is_valid_address(text) {
            out.post(ChatMessage::bot("✅ Checking wallet..."));
            self.awaiting_address_reply = false;
            fetch_portfolio(self.source.as_ref(), text, "Unnamed", None, out).await;
        } else {
            out.post(ChatMessage::bot(
                "❌ That doesn't look like a valid Ethereum address. Try again.",
            ));
        }
    }

    // ========================================================================
    // Dashboard multi-wallets
    // ========================================================================

    /// Agrège tous les wallets et affiche la répartition
    ///
    /// CONCEPT : boucle séquentielle
    /// - Chaque fetch se termine avant le suivant (pas de parallélisme)
    /// - L'indicateur de chargement est retiré une fois tous les fetch finis
    pub async fn build_dashboard(&self, out: &mut dyn ChatOutput) {
        if self.store.is_empty() {
            out.post(ChatMessage::bot(format!(
                "⚠️ No wallets saved. Use: {}",
                ADD_USAGE
            )));
            return;
        }

        let spinner = out.post(ChatMessage::loading());

        let mut collector: Vec<CollectedToken> = Vec::new();
        for wallet in self.store.list() {
            fetch_portfolio(
                self.source.as_ref(),
                &wallet.address,
                &wallet.nickname,
                Some(&mut collector),
                out,
            )
            .await;
        }

        out.retract(spinner);

        if collector.is_empty() {
            let err = AssistantError::EmptyResult("any wallet".to_string());
            debug!(error = %err, wallets = self.store.len(), "Dashboard has no data");
            out.post(ChatMessage::bot(err.to_string()));
            return;
        }

        let totals = DashboardTotals::from_tokens(&collector);
        info!(
            tokens = collector.len(),
            total = totals.total,
            eth = totals.eth,
            stable = totals.stable,
            alt = totals.alt,
            "Dashboard aggregated"
        );

        out.post(ChatMessage::rich(vec![
            RichLine::strong("📊 Multi-Wallet Dashboard"),
            RichLine::text(format!("Total value: ~${}", to_fixed(totals.total, 2))),
            RichLine::text(format!(
                "ETH: ${} ({}%)",
                to_fixed(totals.eth, 2),
                totals.percent(totals.eth)
            )),
            RichLine::text(format!(
                "Stablecoins: ${} ({}%)",
                to_fixed(totals.stable, 2),
                totals.percent(totals.stable)
            )),
            RichLine::text(format!(
                "Altcoins: ${} ({}%)",
                to_fixed(totals.alt, 2),
                totals.percent(totals.alt)
            )),
        ]));
        out.post(ChatMessage::bot(format!("💡 Portfolio Insight: {}", totals.insight())));
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::error::Result;
    use crate::models::{ChatLog, PortfolioResponse, Sender};

    const ADDR_A: &str = "0xAbC1234567890abcdef1234567890ABCDEF12345";
    const ADDR_B: &str = "0x0000000000000000000000000000000000000001";

    /// Source en mémoire : réponse JSON par adresse, enregistre les appels
    #[derive(Default)]
    struct FakeSource {
        responses: HashMap<String, std::result::Result<String, u16>>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeSource {
        fn with(mut self, address: &str, json: &str) -> Self {
            self.responses.insert(address.to_string(), Ok(json.to_string()));
            self
        }

        fn failing(mut self, address: &str, status: u16) -> Self {
            self.responses.insert(address.to_string(), Err(status));
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PortfolioSource for FakeSource {
        async fn fetch(&self, address: &str) -> Result<PortfolioResponse> {
            self.calls.lock().unwrap().push(address.to_string());
            match self.responses.get(address) {
                Some(Ok(json)) => Ok(serde_json::from_str(json).unwrap()),
                Some(Err(status)) => Err(AssistantError::Api(status.to_string())),
                None => Ok(PortfolioResponse::default()),
            }
        }
    }

    fn temp_store(name: &str) -> WalletStore {
        let dir: PathBuf =
            std::env::temp_dir().join(format!("analito-assistant-{}-{}", std::process::id(), name));
        let _ = std::fs::remove_dir_all(&dir);
        WalletStore::load(dir.join("wallets.json"))
    }

    fn assistant(name: &str, source: &Arc<FakeSource>) -> Assistant {
        Assistant::new(temp_store(name), source.clone())
    }

    /// Dernier message de l'assistant
    fn last_bot(out: &ChatLog) -> String {
        out.bot_texts().pop().unwrap_or_default()
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            Command::parse("ADD WALLET 0xabc Foo"),
            Command::AddWallet(vec!["ADD", "WALLET", "0xabc", "Foo"])
        );
        assert_eq!(Command::parse("List Wallets"), Command::ListWallets);
        assert_eq!(Command::parse("list wallets now"), Command::Other("list wallets now"));
        assert_eq!(Command::parse("Check Wallet  Main "), Command::CheckWallet("Main"));
        assert_eq!(Command::parse("check wallet"), Command::CheckWallet(""));
        assert_eq!(Command::parse("DASHBOARD"), Command::Dashboard);
        assert_eq!(Command::parse("hello"), Command::Other("hello"));
    }

    #[tokio::test]
    async fn test_empty_input_is_noop() {
        let source = Arc::new(FakeSource::default());
        let mut assistant = assistant("empty-input", &source);
        let mut out = ChatLog::new();

        assistant.handle_input("   ", &mut out).await;

        assert!(out.is_empty());
        assert!(!assistant.is_awaiting_address_reply());
    }

    #[tokio::test]
    async fn test_input_is_echoed_trimmed() {
        let source = Arc::new(FakeSource::default());
        let mut assistant = assistant("echo", &source);
        let mut out = ChatLog::new();

        assistant.handle_input("  list wallets  ", &mut out).await;

        let first = out.messages().next().unwrap();
        assert_eq!(first.sender, Sender::User);
        assert_eq!(first.text(), "list wallets");
    }

    #[tokio::test]
    async fn test_add_then_list() {
        let source = Arc::new(FakeSource::default());
        let mut assistant = assistant("add-list", &source);
        let mut out = ChatLog::new();

        assistant.handle_input(&format!("add wallet {} Foo", ADDR_A), &mut out).await;
        assert_eq!(last_bot(&out), "✅ Wallet \"Foo\" added.");

        assistant.handle_input("list wallets", &mut out).await;
        assert_eq!(last_bot(&out), format!("💼 Saved wallets:\n• Foo: {}", ADDR_A));
        assert!(source.calls().is_empty());
    }

    #[tokio::test]
    async fn test_add_default_nickname() {
        let source = Arc::new(FakeSource::default());
        let mut assistant = assistant("add-default", &source);
        let mut out = ChatLog::new();

        assistant.handle_input(&format!("Add Wallet {}", ADDR_A), &mut out).await;
        assert_eq!(last_bot(&out), "✅ Wallet \"Wallet1\" added.");
    }

    #[tokio::test]
    async fn test_add_invalid_address() {
        let source = Arc::new(FakeSource::default());
        let mut assistant = assistant("add-invalid", &source);
        let mut out = ChatLog::new();

        assistant.handle_input("add wallet nothex Foo", &mut out).await;

        assert_eq!(last_bot(&out), "❌ Invalid Ethereum address.");
        assert!(assistant.store().is_empty());
    }

    #[tokio::test]
    async fn test_add_missing_arguments() {
        let source = Arc::new(FakeSource::default());
        let mut assistant = assistant("add-missing", &source);
        let mut out = ChatLog::new();

        assistant.handle_input("add wallet", &mut out).await;
        assert_eq!(last_bot(&out), "Usage: add wallet <address> <nickname>");

        // "add wallets" compte aussi comme "add wallet" (préfixe)
        assistant.handle_input("add wallets", &mut out).await;
        assert_eq!(last_bot(&out), "Usage: add wallet <address> <nickname>");
        assert!(assistant.store().is_empty());
    }

    #[tokio::test]
    async fn test_list_empty() {
        let source = Arc::new(FakeSource::default());
        let mut assistant = assistant("list-empty", &source);
        let mut out = ChatLog::new();

        assistant.handle_input("list wallets", &mut out).await;
        assert_eq!(
            last_bot(&out),
            "No wallets saved yet. Use: add wallet <address> <nickname>"
        );
    }

    #[tokio::test]
    async fn test_check_wallet_not_found_makes_no_call() {
        let source = Arc::new(FakeSource::default());
        let mut assistant = assistant("check-miss", &source);
        let mut out = ChatLog::new();

        assistant.handle_input(&format!("add wallet {} Foo", ADDR_A), &mut out).await;
        assistant.handle_input("check wallet Bar", &mut out).await;

        assert_eq!(last_bot(&out), "❌ No wallet found with nickname \"Bar\".");
        assert!(source.calls().is_empty());
    }

    #[tokio::test]
    async fn test_check_wallet_case_insensitive() {
        let source = Arc::new(FakeSource::default().with(
            ADDR_A,
            r#"{"portfolio": [{"network": {"name": "Base"}, "tokens": [{"symbol": "DOGE", "balance": 5, "balanceUSD": 1}]}]}"#,
        ));
        let mut assistant = assistant("check-hit", &source);
        let mut out = ChatLog::new();

        assistant.handle_input(&format!("add wallet {} Foo", ADDR_A), &mut out).await;
        assistant.handle_input("check wallet fOO", &mut out).await;

        assert_eq!(source.calls(), vec![ADDR_A.to_string()]);
        let texts = out.bot_texts();
        assert_eq!(texts[texts.len() - 2], "Foo – Base\nDOGE: 5 (~$1)");
    }

    #[tokio::test]
    async fn test_onboarding_flow() {
        let source = Arc::new(FakeSource::default());
        let mut assistant = assistant("onboarding", &source);
        let mut out = ChatLog::new();

        assistant.handle_input("hello", &mut out).await;
        assert_eq!(
            last_bot(&out),
            "I can track wallets for you. Try: add wallet <address> <nickname>"
        );
        assert!(assistant.is_awaiting_address_reply());

        assistant.handle_input("not an address", &mut out).await;
        assert_eq!(
            last_bot(&out),
            "❌ That doesn't look like a valid Ethereum address. Try again."
        );
        assert!(assistant.is_awaiting_address_reply());
        assert!(source.calls().is_empty());

        assistant.handle_input(ADDR_B, &mut out).await;
        assert!(!assistant.is_awaiting_address_reply());
        assert_eq!(source.calls(), vec![ADDR_B.to_string()]);

        let texts = out.bot_texts();
        assert_eq!(texts[texts.len() - 2], "✅ Checking wallet...");
        assert_eq!(last_bot(&out), "Wallet \"Unnamed\" has no tokens or strategies.");

        // Retour à l'aide d'accueil
        assistant.handle_input("hi again", &mut out).await;
        assert!(assistant.is_awaiting_address_reply());
    }

    #[tokio::test]
    async fn test_commands_do_not_reset_awaiting_flag() {
        let source = Arc::new(FakeSource::default());
        let mut assistant = assistant("flag", &source);
        let mut out = ChatLog::new();

        assistant.handle_input("hello", &mut out).await;
        assistant.handle_input("list wallets", &mut out).await;
        assert!(assistant.is_awaiting_address_reply());
    }

    #[tokio::test]
    async fn test_dashboard_without_wallets_makes_no_call() {
        let source = Arc::new(FakeSource::default());
        let mut assistant = assistant("dash-empty", &source);
        let mut out = ChatLog::new();

        assistant.handle_input("dashboard", &mut out).await;

        assert_eq!(
            last_bot(&out),
            "⚠️ No wallets saved. Use: add wallet <address> <nickname>"
        );
        assert!(source.calls().is_empty());
        assert!(!out.has_loading());
    }

    #[tokio::test]
    async fn test_dashboard_aggregates_sequentially() {
        let source = Arc::new(
            FakeSource::default()
                .with(
                    ADDR_A,
                    r#"{"portfolio": [{"tokens": [{"symbol": "ETH", "balanceUSD": 100}, {"symbol": "USDT", "balanceUSD": 200}]}]}"#,
                )
                .with(
                    ADDR_B,
                    r#"{"portfolio": [{"tokens": [{"symbol": "DOGE", "balanceUSD": 50}]}]}"#,
                ),
        );
        let mut assistant = assistant("dash-full", &source);
        let mut out = ChatLog::new();

        assistant.handle_input(&format!("add wallet {} A", ADDR_A), &mut out).await;
        assistant.handle_input(&format!("add wallet {} B", ADDR_B), &mut out).await;
        assistant.handle_input("dashboard", &mut out).await;

        assert_eq!(source.calls(), vec![ADDR_A.to_string(), ADDR_B.to_string()]);
        assert!(!out.has_loading());

        let texts = out.bot_texts();
        assert_eq!(
            texts[texts.len() - 2],
            "📊 Multi-Wallet Dashboard\n\
             Total value: ~$350.00\n\
             ETH: $100.00 (28.6%)\n\
             Stablecoins: $200.00 (57.1%)\n\
             Altcoins: $50.00 (14.3%)"
        );
        assert_eq!(
            last_bot(&out),
            "💡 Portfolio Insight: You are heavily in stablecoins → safe but low yield."
        );
    }

    #[tokio::test]
    async fn test_dashboard_no_data() {
        let source = Arc::new(FakeSource::default().failing(ADDR_A, 502));
        let mut assistant = assistant("dash-no-data", &source);
        let mut out = ChatLog::new();

        assistant.handle_input(&format!("add wallet {} A", ADDR_A), &mut out).await;
        assistant.handle_input(&format!("add wallet {} B", ADDR_B), &mut out).await;
        assistant.handle_input("dashboard", &mut out).await;

        // L'erreur du premier wallet reste visible, le spinner est retiré
        let texts = out.bot_texts();
        assert_eq!(texts[texts.len() - 2], "❌ Error: API error: 502");
        assert_eq!(last_bot(&out), "No portfolio data found for any wallet.");
        assert!(!out.has_loading());
        assert_eq!(source.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_greeting() {
        let source = Arc::new(FakeSource::default());
        let assistant = assistant("greet", &source);
        let mut out = ChatLog::new();

        assistant.greet(&mut out);

        let texts = out.bot_texts();
        assert_eq!(texts.len(), 2);
        assert!(texts[0].starts_with("👋 Hi! I'm Analito"));
        assert!(texts[1].contains("`dashboard`"));
    }
}
