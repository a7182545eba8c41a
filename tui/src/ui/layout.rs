use crate::app::App;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    Frame,
};

use super::{
    render_calendar, render_delete_confirmation, render_form, render_header, render_help_screen,
    render_history, render_status_bar,
};

/// Render the complete UI
pub fn render(frame: &mut Frame, app: &mut App) {
    app.calendar_cells.clear();
    let size = frame.size();

    // Create main layout: header, content, status bar
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Content
            Constraint::Length(1), // Status bar
        ])
        .split(size);

    render_header(frame, app, chunks[0]);
    render_content(frame, app, chunks[1]);
    render_status_bar(frame, app, chunks[2]);

    // Overlays (drawn last)
    if app.confirming_delete {
        render_delete_confirmation(frame, app, size);
    }
    if app.help_open {
        render_help_screen(frame, app, size);
    }
}

/// Calendar and form on the left, history on the right
fn render_content(frame: &mut Frame, app: &mut App, area: Rect) {
    let main_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(32), // Calendar + form
            Constraint::Min(0),     // History
        ])
        .split(area);

    let left_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(11), // Title, weekday row, up to 6 weeks, borders
            Constraint::Min(0),     // Form
        ])
        .split(main_chunks[0]);

    render_calendar(frame, app, left_chunks[0]);
    render_form(frame, app, left_chunks[1]);
    render_history(frame, app, main_chunks[1]);
}
