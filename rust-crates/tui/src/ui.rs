use crate::page::PageSnapshot;
use color_eyre::eyre::Result;
use crossterm::{
    event::{
        self,
        Event,
        KeyCode,
        KeyEventKind,
        KeyModifiers,
    },
    terminal::{
        disable_raw_mode,
        enable_raw_mode,
    },
};
use ratatui::{
    prelude::*,
    widgets::*,
};
use std::{
    io::{
        Stdout,
        stdout,
    },
    time::Duration,
};
use tokio::sync::mpsc;

pub const GREETING: &str = "welcome home";
const INPUT_POLL_INTERVAL: Duration = Duration::from_millis(100);

pub enum UserEvent {
    Quit,
    Redraw,
}

#[derive(Default)]
pub struct UiState {
    terminal: Option<Terminal<CrosstermBackend<Stdout>>>,
}

pub type InputEventReceiver = mpsc::UnboundedReceiver<std::io::Result<Event>>;

pub fn terminal_enter(state: &mut UiState) -> Result<()> {
    enable_raw_mode()?;
    crossterm::execute!(stdout(), crossterm::terminal::EnterAlternateScreen)?;
    // one persistent Terminal so buffers survive between draws
    state.terminal = Some(Terminal::new(CrosstermBackend::new(stdout()))?);
    Ok(())
}

pub fn terminal_exit() -> Result<()> {
    disable_raw_mode()?;
    crossterm::execute!(stdout(), crossterm::terminal::LeaveAlternateScreen)?;
    Ok(())
}

pub fn draw(state: &mut UiState, snap: &PageSnapshot) -> Result<()> {
    if let Some(term) = state.terminal.as_mut() {
        term.draw(|f| render_page(f, snap))?;
    }
    Ok(())
}

/// Greeting plus every wager as the contract returned it. `snap.status` is
/// not read here.
pub fn render_page(f: &mut Frame, snap: &PageSnapshot) {
    f.render_widget(Clear, f.area());
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(3)])
        .split(f.area());

    let mut lines = vec![Line::from(GREETING)];
    lines.extend(snap.wagers.iter().map(|w| Line::from(w.to_string())));
    let page = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title("Cryptoshambo"));
    f.render_widget(page, chunks[0]);

    let help = Paragraph::new("q/Esc quit")
        .block(Block::default().borders(Borders::ALL).title("Help"));
    f.render_widget(help, chunks[1]);
}

/// Pumps crossterm events from a blocking task until the receiver is dropped.
pub fn input_event_stream() -> InputEventReceiver {
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::task::spawn_blocking(move || {
        while !tx.is_closed() {
            match event::poll(INPUT_POLL_INTERVAL) {
                Ok(false) => continue,
                Ok(true) => {
                    if tx.send(event::read()).is_err() {
                        break;
                    }
                }
                Err(err) => {
                    let _ = tx.send(Err(err));
                    break;
                }
            }
        }
    });
    rx
}

pub async fn next_raw_event(input_events: &mut InputEventReceiver) -> Result<Event> {
    match input_events.recv().await {
        Some(event) => Ok(event?),
        None => Err(color_eyre::eyre::eyre!("input event stream closed")),
    }
}

pub fn interpret_event(event: Event) -> Option<UserEvent> {
    match event {
        Event::Key(k) if k.kind == KeyEventKind::Press => match k.code {
            KeyCode::Char('q') | KeyCode::Esc => Some(UserEvent::Quit),
            KeyCode::Char('c') if k.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(UserEvent::Quit)
            }
            _ => None,
        },
        Event::Resize(_, _) => Some(UserEvent::Redraw),
        _ => None,
    }
}
