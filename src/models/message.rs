// ============================================================================
// Structure : ChatMessage
// ============================================================================
// Un message du chat (utilisateur ou assistant)
//
// CONCEPTS RUST :
// 1. Enums avec données : corps texte, texte enrichi ou indicateur
// 2. Traits : ChatOutput abstrait la destination des messages
// 3. DateTime<Local> : horodatage affiché dans le chat
//
// Le cœur de l'assistant décide QUOI afficher (MessageBody), la couche
// ratatui décide COMMENT (couleurs, gras, cartes).
// ============================================================================

use chrono::{DateTime, Local};

/// Auteur d'un message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Bot,
}

/// Morceau de texte d'une ligne enrichie
#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    /// Texte normal
    Text(String),
    /// Texte en gras (titres)
    Strong(String),
    /// Texte en italique (libellés)
    Emphasis(String),
}

impl Fragment {
    pub fn as_str(&self) -> &str {
        match self {
            Fragment::Text(s) | Fragment::Strong(s) | Fragment::Emphasis(s) => s,
        }
    }
}

/// Style d'une ligne enrichie
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Normal,
    /// Ligne appartenant à une carte (bloc encadré)
    Card,
}

/// Ligne de texte enrichi
#[derive(Debug, Clone, PartialEq)]
pub struct RichLine {
    pub fragments: Vec<Fragment>,
    pub style: LineStyle,
}

impl RichLine {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            fragments: vec![Fragment::Text(text.into())],
            style: LineStyle::Normal,
        }
    }

    pub fn strong(text: impl Into<String>) -> Self {
        Self {
            fragments: vec![Fragment::Strong(text.into())],
            style: LineStyle::Normal,
        }
    }

    /// Ligne "Libellé: valeur" avec le libellé en italique
    pub fn labeled(label: &str, value: impl Into<String>) -> Self {
        Self {
            fragments: vec![
                Fragment::Emphasis(format!("{}:", label)),
                Fragment::Text(format!(" {}", value.into())),
            ],
            style: LineStyle::Normal,
        }
    }

    /// Passe la ligne en style carte
    pub fn in_card(mut self) -> Self {
        self.style = LineStyle::Card;
        self
    }

    /// Texte brut de la ligne (sans style)
    pub fn plain(&self) -> String {
        self.fragments.iter().map(Fragment::as_str).collect()
    }
}

/// Corps d'un message
#[derive(Debug, Clone, PartialEq)]
pub enum MessageBody {
    /// Texte simple
    Plain(String),
    /// Plusieurs lignes avec mise en forme
    Rich(Vec<RichLine>),
    /// Indicateur de chargement transitoire
    Loading,
}

/// Identifiant d'un message dans le transcript
pub type MessageId = u64;

/// Un message du chat
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub sender: Sender,
    pub body: MessageBody,
    pub timestamp: DateTime<Local>,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Sender::User, MessageBody::Plain(text.into()))
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self::new(Sender::Bot, MessageBody::Plain(text.into()))
    }

    pub fn rich(lines: Vec<RichLine>) -> Self {
        Self::new(Sender::Bot, MessageBody::Rich(lines))
    }

    pub fn loading() -> Self {
        Self::new(Sender::Bot, MessageBody::Loading)
    }

    fn new(sender: Sender, body: MessageBody) -> Self {
        Self {
            sender,
            body,
            timestamp: Local::now(),
        }
    }

    /// Texte brut du message, lignes séparées par '\n'
    pub fn text(&self) -> String {
        match &self.body {
            MessageBody::Plain(text) => text.clone(),
            MessageBody::Rich(lines) => lines
                .iter()
                .map(RichLine::plain)
                .collect::<Vec<_>>()
                .join("\n"),
            MessageBody::Loading => String::new(),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.body == MessageBody::Loading
    }
}

// ============================================================================
// Trait ChatOutput
// ============================================================================
// CONCEPT RUST : Trait comme point d'extension
// - L'assistant écrit dans n'importe quelle implémentation
// - ChatLog en mémoire (tests), état partagé de l'App (TUI)
// ============================================================================

/// Destination des messages produits par l'assistant
pub trait ChatOutput {
    /// Ajoute un message et retourne son identifiant
    fn post(&mut self, message: ChatMessage) -> MessageId;

    /// Retire un message précédemment posté (no-op si inconnu)
    fn retract(&mut self, id: MessageId);
}

/// Transcript du chat : messages dans l'ordre d'arrivée
#[derive(Debug, Default)]
pub struct ChatLog {
    entries: Vec<(MessageId, ChatMessage)>,
    next_id: MessageId,
}

impl ChatLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> impl Iterator<Item = &ChatMessage> {
        self.entries.iter().map(|(_, message)| message)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Textes des messages de l'assistant (pratique pour les tests)
    pub fn bot_texts(&self) -> Vec<String> {
        self.messages()
            .filter(|m| m.sender == Sender::Bot)
            .map(ChatMessage::text)
            .collect()
    }

    /// Vrai si un message de chargement est encore affiché
    pub fn has_loading(&self) -> bool {
        self.messages().any(ChatMessage::is_loading)
    }
}

impl ChatOutput for ChatLog {
    fn post(&mut self, message: ChatMessage) -> MessageId {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push((id, message));
        id
    }

    fn retract(&mut self, id: MessageId) {
        self.entries.retain(|(entry_id, _)| *entry_id != id);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rich_text_flattening() {
        let message = ChatMessage::rich(vec![
            RichLine::strong("Strategy: Farm"),
            RichLine::labeled("APY", "5%").in_card(),
        ]);
        assert_eq!(message.text(), "Strategy: Farm\nAPY: 5%");
        assert_eq!(message.sender, Sender::Bot);
    }

    #[test]
    fn test_retract_removes_only_target() {
        let mut log = ChatLog::new();
        log.post(ChatMessage::user("dashboard"));
        let spinner = log.post(ChatMessage::loading());
        log.post(ChatMessage::bot("❌ Error: API error: 500"));

        assert!(log.has_loading());
        log.retract(spinner);

        assert!(!log.has_loading());
        assert_eq!(log.len(), 2);
        assert_eq!(log.bot_texts(), vec!["❌ Error: API error: 500"]);

        // Retirer un id inconnu ne fait rien
        log.retract(spinner);
        assert_eq!(log.len(), 2);
    }
}
