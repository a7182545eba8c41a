use crate::config::{load_config, Config};
use anyhow::Result;
use chrono::{Local, NaiveDate};
use moodtrack_core::{
    calendar::DateSelection,
    form::{MoodForm, TagOutcome},
    models::{MoodRating, MoodRecord},
    storage::{Database, LoadReport, MoodStore, SqliteStore},
    Error,
};
use ratatui::layout::Rect;
use std::path::{Path, PathBuf};

/// Panel (or form field) receiving key input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Calendar,
    Rating,
    Note,
    Tags,
    History,
}

impl Focus {
    const ORDER: [Focus; 5] = [
        Focus::Calendar,
        Focus::Rating,
        Focus::Note,
        Focus::Tags,
        Focus::History,
    ];

    fn position(self) -> usize {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ORDER[(self.position() + 1) % Self::ORDER.len()]
    }

    pub fn prev(self) -> Self {
        Self::ORDER[(self.position() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }

    /// True for fields that take free text
    pub fn is_text_input(self) -> bool {
        matches!(self, Focus::Note | Focus::Tags)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub level: StatusLevel,
}

/// Application state
pub struct App {
    pub should_quit: bool,
    pub store: MoodStore,
    pub config: Config,
    pub selection: DateSelection,
    pub form: MoodForm,
    pub focus: Focus,
    pub history_selected: usize,
    pub confirming_delete: bool,
    pub help_open: bool,
    pub status: Option<StatusMessage>,
    // Clickable calendar cells from the last render
    pub calendar_cells: Vec<(Rect, NaiveDate)>,
}

impl App {
    /// Open the database at `db_path` and the config file next to it
    pub fn new(db_path: &Path) -> Result<Self> {
        let db = Database::new(db_path);
        let backend = SqliteStore::open(&db)?;
        let (store, report) = MoodStore::open(Box::new(backend))?;

        let config_path = db_path
            .parent()
            .map(|p| p.join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"));
        let config = load_config(&config_path)?;

        Ok(Self::with_store(store, report, config, Local::now().date_naive()))
    }

    /// Build the app around an already opened store
    pub fn with_store(store: MoodStore, report: LoadReport, config: Config, today: NaiveDate) -> Self {
        let status = match report {
            LoadReport::Recovered { reason, backup } => Some(StatusMessage {
                text: match backup {
                    Some(slot) => format!(
                        "Saved moods were unreadable and have been set aside in `{}` ({})",
                        slot, reason
                    ),
                    None => format!("Saved moods were unreadable and could not be backed up ({})", reason),
                },
                level: StatusLevel::Warning,
            }),
            LoadReport::Empty | LoadReport::Loaded(_) => None,
        };

        Self {
            should_quit: false,
            store,
            config,
            selection: DateSelection::new(today),
            form: MoodForm::new(),
            focus: Focus::Calendar,
            history_selected: 0,
            confirming_delete: false,
            help_open: false,
            status,
            calendar_cells: Vec::new(),
        }
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Periodic update: follow the wall clock across midnight
    pub fn tick(&mut self) {
        self.set_today(Local::now().date_naive());
    }

    pub fn set_today(&mut self, today: NaiveDate) {
        self.selection.set_today(today);
    }

    fn info(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage { text: text.into(), level: StatusLevel::Info });
    }

    fn warn(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage { text: text.into(), level: StatusLevel::Warning });
    }

    fn error(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage { text: text.into(), level: StatusLevel::Error });
    }

    /// Surface a failed write after a store mutation
    fn report_flush(&mut self) {
        if let Some(err) = self.store.flush_error() {
            let text = format!("Could not save to disk: {}. Changes are kept for this session.", err);
            self.error(text);
        }
    }

    // =========================
    // Focus
    // =========================
    pub fn focus_next(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn focus_prev(&mut self) {
        self.focus = self.focus.prev();
    }

    pub fn set_focus(&mut self, focus: Focus) {
        self.focus = focus;
    }

    // =========================
    // Calendar helpers
    // =========================
    pub fn calendar_move_day(&mut self, delta: i64) {
        if !self.selection.move_by(delta) {
            self.warn("New moods can only be added for today and the two days before");
        }
    }

    pub fn calendar_move_week(&mut self, delta_weeks: i64) {
        self.calendar_move_day(delta_weeks * 7);
    }

    pub fn calendar_prev_month(&mut self) {
        self.selection.prev_month();
    }

    pub fn calendar_next_month(&mut self) {
        self.selection.next_month();
    }

    pub fn calendar_goto_today(&mut self) {
        self.selection.goto_today();
    }

    /// Select `date`; dates outside the entry window are ignored
    pub fn select_date(&mut self, date: NaiveDate) -> bool {
        let accepted = self.selection.select(date);
        if !accepted {
            self.warn(format!(
                "{} can't take a new mood",
                date.format("%B %-d, %Y")
            ));
        }
        accepted
    }

    /// Handle a click at terminal position (`column`, `row`)
    pub fn calendar_click(&mut self, column: u16, row: u16) -> bool {
        let hit = self.calendar_cells.iter().find(|(rect, _)| {
            column >= rect.x
                && column < rect.x + rect.width
                && row >= rect.y
                && row < rect.y + rect.height
        });

        match hit.map(|(_, date)| *date) {
            Some(date) => {
                self.focus = Focus::Calendar;
                self.select_date(date)
            }
            None => false,
        }
    }

    // =========================
    // Entry form
    // =========================
    pub fn set_rating(&mut self, rating: MoodRating) {
        self.form.set_rating(rating);
    }

    /// Type a character into the focused text field
    pub fn input_char(&mut self, c: char) {
        match self.focus {
            Focus::Note => self.form.push_note(c),
            Focus::Tags => self.form.push_tag_input(c),
            _ => {}
        }
    }

    /// Delete backwards in the focused text field. An empty tag input
    /// removes the last tag instead.
    pub fn backspace(&mut self) {
        match self.focus {
            Focus::Note => self.form.pop_note(),
            Focus::Tags => {
                if self.form.tag_input().is_empty() {
                    self.form.pop_tag();
                } else {
                    self.form.pop_tag_input();
                }
            }
            _ => {}
        }
    }

    pub fn confirm_tag(&mut self) {
        match self.form.confirm_tag() {
            TagOutcome::Added(_) | TagOutcome::Empty => {}
            TagOutcome::Duplicate(tag) => self.warn(format!("Tag \"{}\" is already added", tag)),
        }
    }

    /// Save the form as a mood for the selected date
    pub fn submit_form(&mut self) {
        let draft = match self.form.draft() {
            Ok(draft) => draft,
            Err(_) => {
                self.warn("Write a note before saving");
                self.focus = Focus::Note;
                return;
            }
        };

        let date = self.selection.selected();
        match self.store.add(draft, date) {
            Ok(record) => {
                self.form.reset();
                self.history_selected = 0;
                self.info(format!(
                    "Saved {} mood for {}",
                    record.rating.label(),
                    record.date.format("%B %-d, %Y")
                ));
                self.report_flush();
            }
            Err(Error::ConstraintViolation(_)) => {
                self.warn(format!(
                    "{} already has a mood. Delete it first to record a new one.",
                    date.format("%B %-d, %Y")
                ));
            }
            Err(e) => self.error(e.to_string()),
        }
    }

    // =========================
    // History
    // =========================
    pub fn selected_record(&self) -> Option<&MoodRecord> {
        self.store.records().get(self.history_selected)
    }

    pub fn history_up(&mut self) {
        self.history_selected = self.history_selected.saturating_sub(1);
    }

    pub fn history_down(&mut self) {
        if self.history_selected + 1 < self.store.len() {
            self.history_selected += 1;
        }
    }

    pub fn initiate_delete(&mut self) {
        if self.selected_record().is_some() {
            self.confirming_delete = true;
        }
    }

    pub fn confirm_delete(&mut self) {
        self.confirming_delete = false;
        let id = match self.selected_record() {
            Some(record) => record.id.clone(),
            None => return,
        };

        if self.store.remove(&id) {
            self.info("Mood deleted");
        }
        if self.history_selected >= self.store.len() {
            self.history_selected = self.store.len().saturating_sub(1);
        }
        self.report_flush();
    }

    pub fn cancel_delete(&mut self) {
        self.confirming_delete = false;
    }

    // =========================
    // Help
    // =========================
    pub fn toggle_help(&mut self) {
        self.help_open = !self.help_open;
    }

    pub fn close_help(&mut self) {
        self.help_open = false;
    }
}
