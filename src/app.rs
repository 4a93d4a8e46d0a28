// ============================================================================
// Structure : App
// ============================================================================
// Gère l'état global de l'application TUI
//
// CONCEPTS RUST :
// 1. State Management : centraliser l'état dans une seule structure
// 2. Mutabilité contrôlée : &mut self pour modifier l'état
// 3. Arc<Mutex<>> : l'état est partagé avec le worker thread
//
// PATTERN : Cette structure suit le pattern "Application State"
// - Le rendu lit depuis App
// - Les touches et le worker modifient App via ses méthodes
// ============================================================================

use std::sync::{Arc, Mutex, MutexGuard};

use crate::models::{ChatLog, ChatMessage, ChatOutput, MessageId};

/// Prompt affiché devant la ligne de saisie
pub const INPUT_PROMPT: &str = "> ";

/// État principal de l'application
pub struct App {
    /// Indique si l'application doit continuer à tourner
    pub running: bool,

    /// Messages du chat (utilisateur et assistant)
    pub transcript: ChatLog,

    /// Buffer de saisie de la ligne de commande
    pub input_buffer: String,

    /// Nombre de lignes remontées depuis le bas du chat
    /// CONCEPT : 0 = on suit les derniers messages automatiquement
    pub scroll_offset: u16,

    /// Indique si l'utilisateur a demandé à quitter (attend confirmation)
    /// CONCEPT : Two-step quit pour éviter les sorties accidentelles
    /// - Première pression de Esc : confirm_quit = true
    /// - Deuxième pression de Esc : running = false (quit réel)
    /// - N'importe quelle autre touche : confirm_quit = false (annulation)
    pub confirm_quit: bool,

    /// Commandes envoyées au worker et pas encore terminées
    pub pending_commands: usize,
}

impl App {
    /// Crée une nouvelle instance de App avec un chat vide
    pub fn new() -> Self {
        Self {
            running: true,
            transcript: ChatLog::new(),
            input_buffer: String::new(),
            scroll_offset: 0,
            confirm_quit: false,
            pending_commands: 0,
        }
    }

    /// Quitte l'application
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Vérifie si l'application doit continuer
    pub fn is_running(&self) -> bool {
        self.running
    }

    // ========================================================================
    // Saisie
    // ========================================================================

    /// Ajoute un caractère au buffer d'input
    pub fn append_char(&mut self, c: char) {
        self.input_buffer.push(c);
    }

    /// Supprime le dernier caractère du buffer
    pub fn backspace(&mut self) {
        self.input_buffer.pop();
    }

    /// Récupère la ligne saisie et vide le buffer
    ///
    /// CONCEPT RUST : std::mem::take
    /// - Remplace le String par un String vide et retourne l'ancien
    /// - Pas de clone
    pub fn submit_input(&mut self) -> String {
        self.scroll_offset = 0;
        std::mem::take(&mut self.input_buffer)
    }

    // ========================================================================
    // Défilement
    // ========================================================================

    /// Remonte dans l'historique
    pub fn scroll_up(&mut self, lines: u16) {
        self.scroll_offset = self.scroll_offset.saturating_add(lines);
    }

    /// Redescend vers les derniers messages
    pub fn scroll_down(&mut self, lines: u16) {
        self.scroll_offset = self.scroll_offset.saturating_sub(lines);
    }

    // ========================================================================
    // Quit Confirmation
    // ========================================================================

    /// Demande la confirmation de quitter
    pub fn request_quit(&mut self) {
        self.confirm_quit = true;
    }

    /// Annule la demande de quit
    pub fn cancel_quit(&mut self) {
        self.confirm_quit = false;
    }

    /// Vérifie si on attend la confirmation de quit
    pub fn is_awaiting_quit_confirmation(&self) -> bool {
        self.confirm_quit
    }

    // ========================================================================
    // Worker
    // ========================================================================

    /// Une commande part au worker
    pub fn command_sent(&mut self) {
        self.pending_commands += 1;
    }

    /// Le worker a fini une commande
    pub fn command_done(&mut self) {
        self.pending_commands = self.pending_commands.saturating_sub(1);
    }

    /// Vrai tant que le worker a du travail en cours
    pub fn is_busy(&self) -> bool {
        self.pending_commands > 0
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// SharedChat : ChatOutput branché sur l'état partagé
// ============================================================================
// CONCEPT RUST : Newtype autour de Arc<Mutex<App>>
// - Le worker écrit les messages au fil de l'eau
// - Le lock est pris le temps d'un push, jamais pendant un await
// ============================================================================

/// Sortie du chat écrivant dans le transcript de l'App partagée
#[derive(Clone)]
pub struct SharedChat {
    app: Arc<Mutex<App>>,
}

impl SharedChat {
    pub fn new(app: Arc<Mutex<App>>) -> Self {
        Self { app }
    }

    /// Exécute `f` sur l'App partagée (lock le temps de l'appel)
    pub fn with_app<R>(&self, f: impl FnOnce(&mut App) -> R) -> R {
        let mut guard = self.lock();
        f(&mut *guard)
    }

    /// Lock tolérant : un panic dans un autre thread ne bloque pas le chat
    fn lock(&self) -> MutexGuard<'_, App> {
        self.app.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ChatOutput for SharedChat {
    fn post(&mut self, message: ChatMessage) -> MessageId {
        let mut app = self.lock();
        // Nouveau message : on revient en bas du chat
        app.scroll_offset = 0;
        app.transcript.post(message)
    }

    fn retract(&mut self, id: MessageId) {
        self.lock().transcript.retract(id);
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
