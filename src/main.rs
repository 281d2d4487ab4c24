pub mod app;
pub mod card;
pub mod config;
pub mod error;
pub mod logging;
pub mod menu;
pub mod money;
pub mod render;

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers,
        MouseButton, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, layout::Position, Terminal};
use tracing::{error, info, warn};

use app::{App, Focus};
use crate::error::Result;

#[derive(Parser, Debug)]
#[command(version, about = "Budget category cards in the terminal")]
struct Cli {
    /// Budget file holding `[[category]]` tables
    #[arg(short, long, default_value = "budget.toml")]
    file: PathBuf,

    /// Where log output goes
    #[arg(long, default_value = "budget-card.log")]
    log_file: PathBuf,

    /// Show the sample categories instead of reading the budget file
    #[arg(long)]
    demo: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(&cli.log_file)?;

    let categories = if cli.demo {
        config::demo_categories()
    } else {
        match config::load(&cli.file)? {
            Some(categories) => categories,
            None => {
                info!(path = %cli.file.display(), "no budget file, starting with sample categories");
                config::demo_categories()
            }
        }
    };

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(categories, cli.file);
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = &result {
        error!("{e}");
    }
    result
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| render::render(f, app))?;

        if !event::poll(Duration::from_millis(100))? {
            continue;
        }

        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                // Clear status message on any key
                app.status_msg.clear();

                let code = key.code;
                let mods = key.modifiers;

                // Global: Ctrl+C always quits
                if code == KeyCode::Char('c') && mods.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                let outcome = match app.focus {
                    Focus::Cards => match handle_cards_keys(app, code, mods) {
                        Ok(true) => return Ok(()),
                        Ok(false) => Ok(()),
                        Err(e) => Err(e),
                    },
                    Focus::Menu => handle_menu_keys(app, code),
                    Focus::Edit => handle_edit_keys(app, code),
                };
                report(app, outcome);
            }
            Event::Mouse(mouse) if mouse.kind == MouseEventKind::Down(MouseButton::Left) => {
                let outcome = app.handle_click(Position::new(mouse.column, mouse.row));
                report(app, outcome);
            }
            _ => {}
        }
    }
}

/// Surfaces a failed action on the status line.
fn report(app: &mut App, outcome: Result<()>) {
    if let Err(e) = outcome {
        warn!("{e}");
        app.status_msg = format!("Error: {e}");
    }
}

// ── Focus::Cards ───────────────────────────────────────────────────────────────

fn handle_cards_keys(app: &mut App, code: KeyCode, mods: KeyModifiers) -> Result<bool> {
    match code {
        KeyCode::Char('q') => return Ok(true),
        KeyCode::Char('s') if mods.contains(KeyModifiers::CONTROL) => {
            app.save()?;
            app.status_msg = format!("Saved {}", app.budget_path.display());
        }
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Char('m') | KeyCode::Enter => app.open_selected_menu(),
        KeyCode::Char('n') => app.begin_new_category(),
        _ => {}
    }
    Ok(false)
}

// ── Focus::Menu ────────────────────────────────────────────────────────────────

fn handle_menu_keys(app: &mut App, code: KeyCode) -> Result<()> {
    match code {
        KeyCode::Esc => app.dismiss_menu(),
        KeyCode::Up | KeyCode::Char('k') => app.menu_highlight_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.menu_highlight_next(),
        KeyCode::Enter => app.select_highlighted()?,
        KeyCode::Char(ch) => {
            if let Some(action) = menu::action_for_shortcut(ch) {
                app.select_action(action)?;
            }
        }
        _ => {}
    }
    Ok(())
}

// ── Focus::Edit ────────────────────────────────────────────────────────────────

fn handle_edit_keys(app: &mut App, code: KeyCode) -> Result<()> {
    match code {
        KeyCode::Esc => app.cancel_form(),
        KeyCode::Enter => app.submit_form()?,
        _ => {
            let Some(form) = app.form.as_mut() else {
                app.focus = Focus::Cards;
                return Ok(());
            };
            match code {
                KeyCode::Tab | KeyCode::Down => form.next_field(),
                KeyCode::BackTab | KeyCode::Up => form.prev_field(),
                KeyCode::Backspace => form.backspace(),
                KeyCode::Char(ch) => form.handle_char_input(ch),
                _ => {}
            }
        }
    }
    Ok(())
}
