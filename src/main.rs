// ============================================================================
// Analito - Smart Portfolio Assistant
// ============================================================================
// Chat TUI pour suivre des wallets Ethereum
// Récupère tokens et stratégies depuis l'API de portfolio
//
// CONCEPTS RUST CLÉS :
// 1. Terminal raw mode : contrôle total du terminal
// 2. Event loop : boucle infinie qui gère événements et rendering
// 3. Worker thread : l'Assistant tourne dans son propre thread avec tokio
// 4. Arc<Mutex<App>> : le worker écrit les messages, l'UI les dessine
// ============================================================================

use std::io;
use std::sync::{mpsc, Arc, Mutex, MutexGuard};

use anyhow::{Context, Result};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{debug, error, info};

use analito::api::HttpPortfolioClient;
use analito::app::{App, SharedChat};
use analito::assistant::Assistant;
use analito::config::Config;
use analito::models::{ChatMessage, ChatOutput};
use analito::store::WalletStore;
use analito::ui::{events::EventHandler, render};

// ============================================================================
// AppCommand : Commandes pour le worker thread
// ============================================================================
// CONCEPT RUST : Command pattern avec channels
// - L'event loop envoie chaque ligne validée au worker
// - Le worker les traite une par une, dans l'ordre d'arrivée
// ============================================================================

/// Commandes envoyées au worker thread
#[derive(Debug, Clone)]
enum AppCommand {
    /// Ligne saisie par l'utilisateur
    Submit(String),
}

// ============================================================================
// Initialisation du logging
// ============================================================================
// CONCEPT : Logging dans une app TUI
// - Les println! ne fonctionnent pas une fois le TUI lancé
// - On log vers un fichier à la place, avec rotation quotidienne
// ============================================================================

/// Initialise le système de logging vers fichier
///
/// # Utilisation
/// ```bash
/// # Voir les logs en temps réel
/// tail -f ./logs/analito.log.*
///
/// # Contrôler le niveau de log
/// RUST_LOG=trace cargo run
/// ```
fn init_logging(config: &Config) -> Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let log_dir = config.log_dir.clone();

    // Crée le répertoire s'il n'existe pas
    std::fs::create_dir_all(&log_dir).context("Échec de la création du répertoire de logs")?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir.clone(), "analito.log");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender) // Écrit dans le fichier
                .with_ansi(false) // Pas de codes couleur dans le fichier
                .with_target(true)
                .with_thread_ids(true) // UI et worker sont sur deux threads
                .with_line_number(true),
        )
        .with(
            // Par défaut : debug pour analito, info pour les dépendances
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "analito=debug,info".into()),
        )
        .try_init()
        .context("Échec de l'initialisation du subscriber tracing")?;

    info!(?log_dir, "Logging initialisé");
    Ok(())
}

// ============================================================================
// Point d'entrée du programme
// ============================================================================

fn main() -> Result<()> {
    let config = Config::from_env();

    // Si init échoue, on affiche l'erreur et continue quand même
    init_logging(&config).unwrap_or_else(|e| {
        eprintln!("⚠️  Warning: Failed to initialize logging: {:#}", e);
        eprintln!("   Continuing without logging...");
    });

    info!(api_url = %config.api_url, data_dir = ?config.data_dir, "Analito starting up");

    // Wallets sauvegardés (fichier absent ou malformé -> liste vide)
    let store = WalletStore::load(config.wallets_path());
    let client = HttpPortfolioClient::new(config.api_url.clone())?;
    let assistant = Assistant::new(store, Arc::new(client));

    // Runtime tokio créé ici pour remonter l'erreur proprement,
    // puis déplacé dans le worker
    let runtime = tokio::runtime::Runtime::new().context("Échec de la création du runtime tokio")?;

    let app = Arc::new(Mutex::new(App::new()));
    let mut chat = SharedChat::new(app.clone());
    assistant.greet(&mut chat);

    let (command_tx, command_rx) = mpsc::channel::<AppCommand>();

    info!("Spawning assistant worker thread");
    spawn_assistant_worker(command_rx, assistant, runtime, chat);

    debug!("Setting up terminal");
    let mut terminal = setup_terminal()?;

    let events = EventHandler::new();

    info!("Starting event loop");
    let result = run(&mut terminal, app, &events, command_tx);

    // Restaure le terminal (même en cas d'erreur)
    debug!("Restoring terminal");
    restore_terminal(&mut terminal)?;

    match &result {
        Ok(_) => info!("Application exited normally"),
        Err(e) => error!(error = ?e, "Application exited with error"),
    }

    result
}

// ============================================================================
// Worker Thread
// ============================================================================
// CONCEPT RUST : Thread + async runtime
// - std::thread::spawn() : crée un thread OS
// - runtime.block_on() : bloque le worker (pas l'UI) pendant les fetch
// - Les commandes sont traitées strictement l'une après l'autre
// ============================================================================

/// Lance le thread qui exécute les commandes de l'Assistant
fn spawn_assistant_worker(
    command_rx: mpsc::Receiver<AppCommand>,
    mut assistant: Assistant,
    runtime: tokio::runtime::Runtime,
    mut chat: SharedChat,
) {
    std::thread::spawn(move || {
        // CONCEPT : recv() retourne Err quand l'UI a lâché le Sender
        while let Ok(command) = command_rx.recv() {
            debug!(?command, "Worker received command");

            match command {
                AppCommand::Submit(line) => {
                    runtime.block_on(assistant.handle_input(&line, &mut chat));
                }
            }

            chat.with_app(App::command_done);
        }

        info!("Worker thread exiting (channel closed)");
    });
}

// ============================================================================
// Event Loop Principal
// ============================================================================
// - À chaque itération :
//   1. Dessiner l'interface (render)
//   2. Traiter les événements (input)
// Les messages du worker apparaissent au prochain tick (250ms max)
// ============================================================================

/// Exécute la boucle principale de l'application
fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: Arc<Mutex<App>>,
    events: &EventHandler,
    command_tx: mpsc::Sender<AppCommand>,
) -> Result<()> {
    loop {
        if !lock(&app).is_running() {
            break;
        }

        // 1. RENDER
        terminal.draw(|frame| {
            let app_lock = lock(&app);
            render(frame, &app_lock);
        })?;

        // 2. INPUT
        match events.next() {
            Ok(event) => {
                let mut app_lock = lock(&app);
                handle_event(&mut app_lock, event, &command_tx);
            }
            Err(e) => {
                debug!(error = ?e, "Failed to read terminal event");
            }
        }
    }

    Ok(())
}

/// Lock tolérant au poison (un panic du worker ne gèle pas l'UI)
fn lock(app: &Arc<Mutex<App>>) -> MutexGuard<'_, App> {
    app.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ============================================================================
// Gestion des événements
// ============================================================================

/// Traite un événement et met à jour l'état de l'application
fn handle_event(app: &mut App, event: analito::ui::events::Event, command_tx: &mpsc::Sender<AppCommand>) {
    use analito::ui::events::{
        get_char_from_event, is_backspace_event, is_enter_event, is_escape_event, is_interrupt_event,
        is_scroll_down_event, is_scroll_up_event, scroll_amount, Event,
    };

    match event {
        Event::Key(_) if is_interrupt_event(&event) => {
            info!("User interrupted (Ctrl+C)");
            app.quit();
        }

        // Esc : quit confirmation two-step
        Event::Key(_) if is_escape_event(&event) => {
            if app.is_awaiting_quit_confirmation() {
                info!("User confirmed quit");
                app.quit();
            } else {
                info!("User requested quit (awaiting confirmation)");
                app.request_quit();
            }
        }

        // Enter : envoie la ligne au worker
        Event::Key(_) if is_enter_event(&event) => {
            app.cancel_quit();
            let line = app.submit_input();
            if line.trim().is_empty() {
                debug!("Empty input, ignoring");
                return;
            }

            app.command_sent();
            if let Err(e) = command_tx.send(AppCommand::Submit(line)) {
                error!(error = %e, "Assistant worker is gone");
                app.command_done();
                app.transcript.post(ChatMessage::bot("❌ Error: the assistant stopped, please restart."));
            }
        }

        Event::Key(_) if is_backspace_event(&event) => {
            app.cancel_quit();
            app.backspace();
        }

        Event::Key(_) if is_scroll_up_event(&event) => {
            app.scroll_up(scroll_amount(&event));
        }

        Event::Key(_) if is_scroll_down_event(&event) => {
            app.scroll_down(scroll_amount(&event));
        }

        Event::Key(_) => {
            // Toute autre touche : annule la confirmation, puis saisie
            app.cancel_quit();
            if let Some(c) = get_char_from_event(&event) {
                app.append_char(c);
            }
        }

        Event::Tick => {}
    }
}

// ============================================================================
// Setup et restauration du terminal
// ============================================================================
// IMPORTANT : Toujours restaurer le terminal avant de quitter !
// ============================================================================

/// Configure le terminal en mode TUI
fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(|e| e.into())
}

/// Restaure le terminal à son état normal
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;
    Ok(())
}
