use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use moodtrack_core::logging::{default_log_level, flush_logging, init_logging};
use moodtrack_core::storage::{Database, LoadReport, MoodStore, SqliteStore};
use moodtrack_tui::{App, EventHandler};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "moodtrack")]
#[command(about = "Record one mood a day and browse the history in the terminal")]
struct Cli {
    /// Path to the SQLite database
    #[arg(long, env = "MOODTRACK_DB")]
    db: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "MOODTRACK_LOG_LEVEL")]
    log_level: Option<String>,

    /// Directory for log files
    #[arg(long, env = "MOODTRACK_LOG_DIR")]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Print the mood history, newest first, without starting the TUI
    List,
    /// Copy the database file to PATH
    Backup {
        /// Destination file
        path: PathBuf,
    },
}

fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("moodtrack")
}

fn absolute(path: PathBuf) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path);
    }
    let cwd = std::env::current_dir().context("Failed to resolve the working directory")?;
    Ok(cwd.join(path))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let db_path = absolute(cli.db.unwrap_or_else(|| data_dir().join("moodtrack.db")))?;
    let log_dir = absolute(cli.log_dir.unwrap_or_else(|| data_dir().join("logs")))?;
    let level = cli
        .log_level
        .unwrap_or_else(|| default_log_level().to_string());

    // Logs go to files only; the terminal belongs to the UI
    init_logging(&level, &log_dir)?;
    let command = match &cli.command {
        Some(Command::List) => "list",
        Some(Command::Backup { .. }) => "backup",
        None => "tui",
    };
    log::info!(
        "event=startup module=cli db={} command={}",
        db_path.display(),
        command
    );

    let result = match cli.command {
        Some(Command::List) => list(&db_path),
        Some(Command::Backup { path }) => backup(&db_path, &path),
        None => run_tui(&db_path),
    };

    if let Err(err) = &result {
        log::error!("event=command_failed module=cli command={} error={:?}", command, err);
    }
    flush_logging();
    result
}

fn list(db_path: &Path) -> Result<()> {
    let backend = SqliteStore::open(&Database::new(db_path))?;
    let (store, report) = MoodStore::open(Box::new(backend))?;
    print_history(&store, &report, &mut io::stdout().lock(), &mut io::stderr().lock())?;
    Ok(())
}

/// Write the history to `out`; load problems go to `err`
fn print_history(
    store: &MoodStore,
    report: &LoadReport,
    out: &mut impl Write,
    err: &mut impl Write,
) -> io::Result<()> {
    if let LoadReport::Recovered { reason, backup } = report {
        match backup {
            Some(slot) => writeln!(
                err,
                "warning: saved moods were unreadable ({}); the raw data was kept in slot `{}`",
                reason, slot
            )?,
            None => writeln!(
                err,
                "warning: saved moods were unreadable ({}) and could not be backed up",
                reason
            )?,
        }
    }

    if store.is_empty() {
        writeln!(out, "No moods recorded yet")?;
        return Ok(());
    }

    for record in store.records() {
        writeln!(
            out,
            "{}  {} {:<9}  {}",
            record.date.format("%Y-%m-%d"),
            record.rating.glyph(),
            record.rating.label(),
            record.note
        )?;
        if !record.tags.is_empty() {
            let tags: Vec<String> = record.tags.iter().map(|t| format!("#{}", t)).collect();
            writeln!(out, "{:>14}{}", "", tags.join(" "))?;
        }
    }
    Ok(())
}

fn backup(db_path: &Path, destination: &Path) -> Result<()> {
    let db = Database::new(db_path);
    db.backup(destination)
        .with_context(|| format!("Failed to back up {}", db.path().display()))?;
    println!("Backed up {} to {}", db.path().display(), destination.display());
    Ok(())
}

fn run_tui(db_path: &Path) -> Result<()> {
    // Open storage before touching the terminal so errors print normally
    let mut app = App::new(db_path)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create event handler
    let event_handler = EventHandler::new(250); // 250ms tick rate

    // Main loop; its error is returned once the terminal is restored
    let result = run_app(&mut terminal, &mut app, || event_handler.next());

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableMouseCapture, LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    log::info!("event=shutdown module=cli moods={}", app.store.len());

    result
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    mut next_event: impl FnMut() -> Result<moodtrack_tui::Event>,
) -> Result<()> {
    loop {
        // Draw UI
        terminal.draw(|f| moodtrack_tui::ui::render(f, app))?;

        // Handle events
        let event = next_event()?;
        match event {
            moodtrack_tui::Event::Key(key) => {
                moodtrack_tui::event::handle_key_event(key, app);
            }
            moodtrack_tui::Event::Mouse(mouse) => {
                moodtrack_tui::event::handle_mouse_event(mouse, app);
            }
            moodtrack_tui::Event::Tick => {
                app.tick();
            }
        }

        // Check if we should quit
        if app.should_quit {
            break;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use moodtrack_core::models::{MoodDraft, MoodRating, TagSet};
    use moodtrack_core::storage::{MemoryStore, CORRUPT_KEY, MOODS_KEY};
    use moodtrack_tui::config::Config;
    use moodtrack_tui::Event;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::backend::TestBackend;

    fn test_app() -> App {
        let (store, report) = MoodStore::open(Box::new(MemoryStore::new())).unwrap();
        App::with_store(
            store,
            report,
            Config::default(),
            NaiveDate::from_ymd_opt(2024, 10, 7).unwrap(),
        )
    }

    fn render(backend: &MemoryStore) -> (String, String) {
        let (store, report) = MoodStore::open(Box::new(backend.clone())).unwrap();
        let mut out = Vec::new();
        let mut err = Vec::new();
        print_history(&store, &report, &mut out, &mut err).unwrap();
        (String::from_utf8(out).unwrap(), String::from_utf8(err).unwrap())
    }

    #[test]
    fn test_list_empty() {
        let (out, err) = render(&MemoryStore::new());
        assert_eq!(out, "No moods recorded yet\n");
        assert!(err.is_empty());
    }

    #[test]
    fn test_list_warns_on_unreadable_data() {
        let backend = MemoryStore::new();
        backend.seed(MOODS_KEY, "{oops");

        let (out, err) = render(&backend);
        assert!(err.starts_with("warning: saved moods were unreadable"));
        assert!(err.contains(CORRUPT_KEY));
        assert_eq!(out, "No moods recorded yet\n");
    }

    #[test]
    fn test_list_prints_records() {
        let backend = MemoryStore::new();
        {
            let (mut store, _) = MoodStore::open(Box::new(backend.clone())).unwrap();
            let tags: TagSet = ["work"].into_iter().collect();
            let draft = MoodDraft::new(MoodRating::Good, "good day", tags).unwrap();
            store.add(draft, NaiveDate::from_ymd_opt(2024, 10, 7).unwrap()).unwrap();
        }

        let (out, err) = render(&backend);
        assert!(err.is_empty());
        let mut lines = out.lines();
        let first = lines.next().unwrap();
        assert!(first.starts_with("2024-10-07"));
        assert!(first.contains("Good"));
        assert!(first.ends_with("good day"));
        assert_eq!(lines.next().unwrap().trim(), "#work");
    }

    #[test]
    fn test_main_loop_error_is_returned() {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        let mut app = test_app();

        let result = run_app(&mut terminal, &mut app, || {
            Err(anyhow::anyhow!("terminal went away"))
        });
        let err = result.unwrap_err();
        assert!(err.to_string().contains("terminal went away"));
    }

    #[test]
    fn test_main_loop_quits_on_key() {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        let mut app = test_app();
        let mut events = vec![
            Event::Key(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE)),
            Event::Tick,
        ];

        run_app(&mut terminal, &mut app, || {
            Ok(events.pop().unwrap_or(Event::Tick))
        })
        .unwrap();
        assert!(app.should_quit);
    }
}
