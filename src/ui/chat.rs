// ============================================================================
// Chat - Rendu de l'interface principale
// ============================================================================
// Dessine le chat : header, transcript des messages, ligne de saisie
//
// CONCEPTS RATATUI :
// 1. Frame : surface de dessin
// 2. Layout : découpage de l'espace en zones
// 3. Paragraph + Wrap + scroll : texte long qui défile
// 4. Span / Line : texte enrichi (gras, italique, couleurs)
// ============================================================================

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, INPUT_PROMPT};
use crate::models::{ChatMessage, Fragment, LineStyle, MessageBody, RichLine, Sender};

/// Fond des cartes d'actions de stratégie
const CARD_BACKGROUND: Color = Color::Rgb(30, 40, 70);

/// Dessine l'interface complète
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = create_layout(frame.size());

    render_header(frame, chunks[0]);
    render_transcript(frame, app, chunks[1]);
    render_input(frame, app, chunks[2]);
}

/// Header (3 lignes), chat (reste), saisie (4 lignes)
fn create_layout(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(4),
        ])
        .split(area)
        .to_vec()
}

fn render_header(frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" 🤖 Analito ")
        .title_alignment(Alignment::Center);

    let text = Line::from(Span::styled(
        "Smart Portfolio Assistant",
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
    ));

    let paragraph = Paragraph::new(text).block(block).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

// ============================================================================
// Transcript
// ============================================================================

/// Dessine les messages, collés en bas sauf si l'utilisateur a remonté
fn render_transcript(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" 💬 Chat ");

    let lines: Vec<Line<'static>> = app.transcript.messages().flat_map(message_lines).collect();

    // CONCEPT : scroll vertical
    // - On estime la hauteur après retour à la ligne
    // - Le défilement part du bas (derniers messages visibles)
    let inner = block.inner(area);
    let total_rows = wrapped_rows(&lines, inner.width);
    let bottom = total_rows.saturating_sub(inner.height);
    let top = bottom.saturating_sub(app.scroll_offset);

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((top, 0));

    frame.render_widget(paragraph, area);
}

/// Nombre de lignes écran occupées après retour à la ligne (approximatif)
fn wrapped_rows(lines: &[Line], width: u16) -> u16 {
    let width = usize::from(width.max(1));
    let rows: usize = lines
        .iter()
        .map(|line| line.width().max(1).div_ceil(width))
        .sum();
    u16::try_from(rows).unwrap_or(u16::MAX)
}

/// Convertit un message en lignes ratatui (en-tête + corps + séparateur)
pub fn message_lines(message: &ChatMessage) -> Vec<Line<'static>> {
    let (author, color) = match message.sender {
        Sender::User => ("🧑 You", Color::Green),
        Sender::Bot => ("🤖 Analito", Color::Cyan),
    };

    let mut lines = vec![Line::from(vec![
        Span::styled(author, Style::default().fg(color).add_modifier(Modifier::BOLD)),
        Span::styled(
            format!("  {}", message.timestamp.format("%H:%M")),
            Style::default().fg(Color::DarkGray),
        ),
    ])];

    match &message.body {
        MessageBody::Plain(text) => {
            lines.extend(text.lines().map(|l| Line::from(l.to_string())));
        }
        MessageBody::Rich(rich) => {
            lines.extend(rich.iter().map(rich_line));
        }
        MessageBody::Loading => {
            lines.push(Line::from(Span::styled(
                "⏳ Fetching portfolios...",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::ITALIC),
            )));
        }
    }

    lines.push(Line::from(""));
    lines
}

/// Ligne enrichie -> Line stylée
fn rich_line(line: &RichLine) -> Line<'static> {
    let base = match line.style {
        LineStyle::Normal => Style::default(),
        LineStyle::Card => Style::default().bg(CARD_BACKGROUND),
    };

    let mut spans = Vec::with_capacity(line.fragments.len() + 1);
    if line.style == LineStyle::Card {
        spans.push(Span::styled("  ┃ ", base.fg(Color::LightBlue)));
    }

    spans.extend(line.fragments.iter().map(|fragment| match fragment {
        Fragment::Text(s) => Span::styled(s.clone(), base),
        Fragment::Strong(s) => Span::styled(s.clone(), base.add_modifier(Modifier::BOLD)),
        Fragment::Emphasis(s) => Span::styled(s.clone(), base.add_modifier(Modifier::ITALIC)),
    }));

    Line::from(spans)
}

// ============================================================================
// Input
// ============================================================================

/// Ligne de saisie + aide (ou confirmation de quit)
fn render_input(frame: &mut Frame, app: &App, area: Rect) {
    let border = if app.is_busy() { Color::Yellow } else { Color::Green };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border));

    let input_line = Line::from(vec![
        Span::styled(INPUT_PROMPT, Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        Span::styled(app.input_buffer.clone(), Style::default().fg(Color::White)),
        Span::styled("█", Style::default().fg(Color::White).add_modifier(Modifier::SLOW_BLINK)),
    ]);

    let help_line = if app.is_awaiting_quit_confirmation() {
        Line::from(vec![
            Span::styled("⚠  Appuyez sur ", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
            Span::styled(
                "[Esc]",
                Style::default()
                    .fg(Color::Red)
                    .add_modifier(Modifier::BOLD)
                    .add_modifier(Modifier::SLOW_BLINK),
            ),
            Span::styled(
                " à nouveau pour quitter, ou n'importe quelle autre touche pour annuler ⚠",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
        ])
    } else {
        let mut spans = vec![
            Span::styled("[Enter]", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
            Span::raw(" Send  "),
            Span::styled("[PgUp/PgDn]", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
            Span::raw(" Scroll  "),
            Span::styled("[Esc]", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
            Span::raw(" Quit"),
        ];
        if app.is_busy() {
            spans.push(Span::styled("   ⏳ Working...", Style::default().fg(Color::Yellow)));
        }
        Line::from(spans)
    };

    let paragraph = Paragraph::new(vec![input_line, help_line])
        .block(block)
        .alignment(Alignment::Left);

    frame.render_widget(paragraph, area);
}

// ============================================================================
// Tests
// ============================================================================
