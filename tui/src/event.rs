use crate::app::{App, Focus};
use crate::config::key_matches;
use anyhow::Result;
use crossterm::event::{
    self, Event as CEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use moodtrack_core::models::MoodRating;
use std::time::Duration;

/// Terminal events
#[derive(Debug, Clone, Copy)]
pub enum Event {
    /// Key press event
    Key(KeyEvent),
    /// Terminal tick event
    Tick,
    /// Mouse event
    Mouse(MouseEvent),
}

/// Event handler for the terminal
pub struct EventHandler {
    /// Tick rate in milliseconds
    tick_rate: Duration,
}

impl EventHandler {
    /// Create a new event handler
    pub fn new(tick_rate_ms: u64) -> Self {
        Self {
            tick_rate: Duration::from_millis(tick_rate_ms),
        }
    }

    /// Poll for the next event
    pub fn next(&self) -> Result<Event> {
        if event::poll(self.tick_rate)? {
            match event::read()? {
                CEvent::Key(key) => return Ok(Event::Key(key)),
                CEvent::Mouse(m) => return Ok(Event::Mouse(m)),
                _ => {}
            }
        }
        Ok(Event::Tick)
    }
}

/// Handle key events for the application
pub fn handle_key_event(key: KeyEvent, app: &mut App) {
    // On Windows, crossterm reports both key press and release events.
    // We only want to handle press events to avoid duplicates.
    if key.kind != KeyEventKind::Press {
        return;
    }

    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.quit();
        return;
    }

    // Help screen takes precedence
    if app.help_open {
        if key.code == KeyCode::Esc || key_matches(&app.config.keymap.help, &key) {
            app.close_help();
        }
        return;
    }

    if app.confirming_delete {
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => app.confirm_delete(),
            KeyCode::Char('n') | KeyCode::Esc => app.cancel_delete(),
            _ => {}
        }
        return;
    }

    // --- Bindings available everywhere ---
    let keymap = app.config.keymap.clone();
    if key_matches(&keymap.next_focus, &key) {
        app.focus_next();
        return;
    }
    if key_matches(&keymap.prev_focus, &key) {
        app.focus_prev();
        return;
    }
    if key_matches(&keymap.save_entry, &key) {
        app.submit_form();
        return;
    }

    if app.focus.is_text_input() {
        handle_text_input(key, app);
        return;
    }

    // --- Bindings that would otherwise be typed text ---
    if key_matches(&keymap.quit, &key) {
        app.quit();
        return;
    }
    if key_matches(&keymap.help, &key) {
        app.toggle_help();
        return;
    }

    match app.focus {
        Focus::Calendar => handle_calendar_input(key, app),
        Focus::Rating => handle_rating_input(key, app),
        Focus::History => handle_history_input(key, app),
        Focus::Note | Focus::Tags => {}
    }
}

fn handle_calendar_input(key: KeyEvent, app: &mut App) {
    let keymap = app.config.keymap.clone();
    if key_matches(&keymap.prev_month, &key) {
        app.calendar_prev_month();
        return;
    }
    if key_matches(&keymap.next_month, &key) {
        app.calendar_next_month();
        return;
    }
    if key_matches(&keymap.goto_today, &key) {
        app.calendar_goto_today();
        return;
    }

    match key.code {
        KeyCode::Left => app.calendar_move_day(-1),
        KeyCode::Right => app.calendar_move_day(1),
        KeyCode::Up => app.calendar_move_week(-1),
        KeyCode::Down => app.calendar_move_week(1),
        KeyCode::Enter => app.set_focus(Focus::Rating),
        _ => {}
    }
}

fn handle_rating_input(key: KeyEvent, app: &mut App) {
    match key.code {
        KeyCode::Left | KeyCode::Down => app.form.rating_down(),
        KeyCode::Right | KeyCode::Up => app.form.rating_up(),
        KeyCode::Char(c) => {
            if let Some(rating) = c
                .to_digit(10)
                .and_then(|d| u8::try_from(d).ok())
                .and_then(|d| MoodRating::try_from(d).ok())
            {
                app.set_rating(rating);
            }
        }
        KeyCode::Enter => app.set_focus(Focus::Note),
        KeyCode::Esc => app.set_focus(Focus::Calendar),
        _ => {}
    }
}

fn handle_text_input(key: KeyEvent, app: &mut App) {
    match key.code {
        KeyCode::Esc => app.set_focus(Focus::Calendar),
        KeyCode::Backspace => app.backspace(),
        KeyCode::Enter => {
            if app.focus == Focus::Tags && !app.form.tag_input().trim().is_empty() {
                app.confirm_tag();
            } else {
                app.submit_form();
            }
        }
        KeyCode::Char(c) => {
            // Allow AltGr combinations (CONTROL+ALT) for special characters
            if !key.modifiers.contains(KeyModifiers::CONTROL)
                || key.modifiers.contains(KeyModifiers::ALT)
            {
                app.input_char(c);
            }
        }
        _ => {}
    }
}

fn handle_history_input(key: KeyEvent, app: &mut App) {
    if key_matches(&app.config.keymap.delete_entry, &key) {
        app.initiate_delete();
        return;
    }

    match key.code {
        KeyCode::Up => app.history_up(),
        KeyCode::Down => app.history_down(),
        KeyCode::Delete => app.initiate_delete(),
        KeyCode::Esc => app.set_focus(Focus::Calendar),
        _ => {}
    }
}

/// Handle mouse events: calendar clicks and history scrolling
pub fn handle_mouse_event(mouse: MouseEvent, app: &mut App) {
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            app.calendar_click(mouse.column, mouse.row);
        }
        MouseEventKind::ScrollUp => app.history_up(),
        MouseEventKind::ScrollDown => app.history_down(),
        _ => {}
    }
}
