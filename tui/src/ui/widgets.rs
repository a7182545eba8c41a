use crate::app::{App, Focus, StatusLevel};
use chrono::Datelike;
use moodtrack_core::models::{MoodRating, MoodRecord};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

/// Width of one calendar cell: three columns for the day, one for the mood marker
const CELL_WIDTH: u16 = 4;

/// Colour for each mood level, worst to best: red, orange, yellow, blue, purple
pub fn rating_color(rating: MoodRating) -> Color {
    match rating {
        MoodRating::Terrible => Color::Red,
        MoodRating::Bad => Color::LightRed,
        MoodRating::Okay => Color::Yellow,
        MoodRating::Good => Color::Blue,
        MoodRating::Excellent => Color::Magenta,
    }
}

fn panel_block(title: String, focused: bool) -> Block<'static> {
    let border = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .title_alignment(Alignment::Left)
        .border_style(border)
}

/// Render the header with title and key hints
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let key_hints = match app.focus {
        Focus::Calendar => " [←/→/↑/↓:Day] [PgUp/PgDn:Month] [t:Today] [Enter:Form] ",
        Focus::Rating => " [←/→ or 1-5:Rating] [Enter:Note] [Esc:Calendar] ",
        Focus::Note => " [Type note] [Enter:Save] [Esc:Calendar] ",
        Focus::Tags => " [Type tag] [Enter:Add tag / Save] [Backspace:Remove] ",
        Focus::History => " [↑/↓:Select] [d:Delete] [Esc:Calendar] ",
    };

    let header_spans = vec![
        Span::styled(
            " Mood Tracker ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" | "),
        Span::styled(key_hints, Style::default().fg(Color::DarkGray)),
    ];

    let header = Paragraph::new(Line::from(header_spans))
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Left);

    frame.render_widget(header, area);
}

/// Render the month grid with today, selection and recorded moods highlighted
pub fn render_calendar(frame: &mut Frame, app: &mut App, area: Rect) {
    let block = panel_block(" Calendar ".to_string(), app.focus == Focus::Calendar);
    let inner = block.inner(area);
    let week_start = app.config.calendar.week_start;
    let selected = app.selection.selected();

    let mut lines: Vec<Line> = Vec::new();
    let mut cells: Vec<(Rect, chrono::NaiveDate)> = Vec::new();

    let title = format!("‹ {} ›", app.selection.month().format("%B %Y"));
    lines.push(Line::from(Span::styled(
        title,
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
    )));
    let labels: String = week_start
        .labels()
        .iter()
        .map(|label| format!("{:>3} ", label))
        .collect();
    lines.push(Line::from(Span::styled(labels, Style::default().fg(Color::DarkGray))));

    {
        let index = app.store.index();
        let grid = app.selection.grid(week_start, &index);

        for (row, week) in grid.weeks().enumerate() {
            let y = inner.y + 2 + row as u16;
            let mut row_spans: Vec<Span> = Vec::new();

            for (col, day) in week.iter().enumerate() {
                let marker = if day.mood.is_some() { "•" } else { " " };
                let text = format!("{:>3}{}", day.date.day(), marker);

                let mut style = if day.in_month {
                    Style::default().fg(Color::White)
                } else {
                    Style::default().fg(Color::DarkGray)
                };
                if !day.selectable {
                    style = style.add_modifier(Modifier::DIM);
                }
                if let Some(mood) = day.mood {
                    style = style.fg(rating_color(mood.rating));
                }
                if day.is_today {
                    style = style.add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
                }
                if day.date == selected {
                    style = style.bg(Color::Blue).fg(Color::Black);
                }
                row_spans.push(Span::styled(text, style));

                if y < inner.y + inner.height {
                    let x = inner.x + col as u16 * CELL_WIDTH;
                    cells.push((Rect::new(x, y, CELL_WIDTH, 1), day.date));
                }
            }
            lines.push(Line::from(row_spans));
        }
    }
    app.calendar_cells = cells;

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Render the entry form for the selected date
pub fn render_form(frame: &mut Frame, app: &App, area: Rect) {
    let focused = matches!(app.focus, Focus::Rating | Focus::Note | Focus::Tags);
    let title = format!(
        " Add Mood for {} ",
        app.selection.selected().format("%B %-d, %Y")
    );
    let block = panel_block(title, focused);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Rating
            Constraint::Length(5), // Note
            Constraint::Length(4), // Tags
            Constraint::Min(0),    // Hint
        ])
        .split(inner);

    let label_style = |field: Focus| {
        if app.focus == field {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Cyan)
        }
    };

    // Rating
    let current = app.form.rating();
    let options: Vec<Span> = MoodRating::ALL
        .iter()
        .map(|&rating| {
            let text = format!(" {}{} ", rating.glyph(), rating.value());
            if rating == current {
                Span::styled(
                    text,
                    Style::default()
                        .bg(rating_color(rating))
                        .fg(Color::Black)
                        .add_modifier(Modifier::BOLD),
                )
            } else {
                Span::styled(text, Style::default().fg(rating_color(rating)))
            }
        })
        .collect();
    let rating_lines = vec![
        Line::from(Span::styled("Mood", label_style(Focus::Rating))),
        Line::from(options),
        Line::from(Span::styled(
            current.label(),
            Style::default().fg(rating_color(current)),
        )),
    ];
    frame.render_widget(Paragraph::new(rating_lines), chunks[0]);

    // Note
    let note_text = if app.form.note().is_empty() && app.focus != Focus::Note {
        Span::styled("How are you feeling?", Style::default().fg(Color::DarkGray))
    } else {
        Span::raw(app.form.note().to_string())
    };
    let note_lines = vec![
        Line::from(Span::styled("Note", label_style(Focus::Note))),
        Line::from(note_text),
    ];
    frame.render_widget(
        Paragraph::new(note_lines).wrap(Wrap { trim: false }),
        chunks[1],
    );

    // Tags
    let chips: Vec<Span> = app
        .form
        .tags()
        .iter()
        .map(|tag| Span::styled(format!("#{} ", tag), Style::default().fg(Color::Cyan)))
        .collect();
    let tag_lines = vec![
        Line::from(Span::styled("Tags (Enter to add)", label_style(Focus::Tags))),
        Line::from(format!("> {}", app.form.tag_input())),
        Line::from(chips),
    ];
    frame.render_widget(
        Paragraph::new(tag_lines).wrap(Wrap { trim: true }),
        chunks[2],
    );

    let hint = Paragraph::new("[Ctrl+S] Save Mood")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(hint, chunks[3]);

    // Terminal cursor for the text field being edited
    match app.focus {
        Focus::Note => {
            if let Some((x, y)) = wrapped_cursor(chunks[1], app.form.note().width()) {
                frame.set_cursor(x, y);
            }
        }
        Focus::Tags => {
            let (x, y) = input_cursor(chunks[2], app.form.tag_input().width().saturating_add(2));
            frame.set_cursor(x, y);
        }
        _ => {}
    }
}

fn to_u16(value: usize) -> u16 {
    u16::try_from(value).unwrap_or(u16::MAX)
}

/// Cursor after `width` columns of text wrapped below the label row of `area`
fn wrapped_cursor(area: Rect, width: usize) -> Option<(u16, u16)> {
    if area.width == 0 || area.height == 0 {
        return None;
    }
    let columns = usize::from(area.width);
    let x = area.x.saturating_add(to_u16(width % columns));
    let last_row = area.y.saturating_add(area.height - 1);
    let y = area
        .y
        .saturating_add(1)
        .saturating_add(to_u16(width / columns))
        .min(last_row);
    Some((x, y))
}

/// Cursor after `width` columns on the single input row of `area`, clamped to its right edge
fn input_cursor(area: Rect, width: usize) -> (u16, u16) {
    let last_column = area.x.saturating_add(area.width.saturating_sub(1));
    let x = area.x.saturating_add(to_u16(width)).min(last_column);
    (x, area.y.saturating_add(1))
}

fn history_item(record: &MoodRecord) -> ListItem<'static> {
    let color = rating_color(record.rating);
    let mut lines = vec![
        Line::from(vec![
            Span::styled(
                format!("{} {}", record.rating.glyph(), record.rating.label()),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(
                record.date.format("%b %-d, %Y").to_string(),
                Style::default().fg(Color::DarkGray),
            ),
        ]),
        Line::from(format!("  {}", record.note)),
    ];
    if !record.tags.is_empty() {
        let tags: Vec<String> = record.tags.iter().map(|t| format!("#{}", t)).collect();
        lines.push(Line::from(Span::styled(
            format!("  {}", tags.join(" ")),
            Style::default().fg(Color::Cyan),
        )));
    }
    lines.push(Line::from(""));
    ListItem::new(lines)
}

/// Render the mood history, newest first
pub fn render_history(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus == Focus::History;
    let records = app.store.records();
    let block = panel_block(format!(" Mood History ({}) ", records.len()), focused);

    if records.is_empty() {
        let empty_message = Paragraph::new("No moods recorded yet")
            .block(block)
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty_message, area);
        return;
    }

    let items: Vec<ListItem> = records.iter().map(history_item).collect();

    let mut state = ListState::default();
    state.select(Some(app.history_selected.min(records.len() - 1)));

    let highlight = if focused {
        Style::default().bg(Color::DarkGray)
    } else {
        Style::default()
    };
    let list = List::new(items)
        .block(block)
        .highlight_style(highlight)
        .highlight_symbol("▌");

    frame.render_stateful_widget(list, area, &mut state);
}

/// Render the status bar: the latest message, or a summary
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let (text, style) = match &app.status {
        Some(status) => {
            let color = match status.level {
                StatusLevel::Info => Color::Green,
                StatusLevel::Warning => Color::Yellow,
                StatusLevel::Error => Color::Red,
            };
            (format!(" {} ", status.text), Style::default().fg(Color::Black).bg(color))
        }
        None => (
            format!(
                " {} moods | Selected: {} | [Tab:Focus] [Ctrl+S:Save] [?:Help] [q:Quit] ",
                app.store.len(),
                app.selection.selected().format("%Y-%m-%d")
            ),
            Style::default().fg(Color::White).bg(Color::DarkGray),
        ),
    };

    frame.render_widget(Paragraph::new(text).style(style), area);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width - width) / 2;
    let y = area.y + (area.height - height) / 2;
    Rect::new(x, y, width, height)
}

pub fn render_delete_confirmation(frame: &mut Frame, app: &App, area: Rect) {
    let popup_area = centered_rect(60, 6, area);

    let subject = app
        .selected_record()
        .map(|r| format!("{} \"{}\"", r.date.format("%b %-d, %Y"), r.note))
        .unwrap_or_default();
    let text = vec![
        Line::from("Delete this mood? (y/n)"),
        Line::from(""),
        Line::from(Span::styled(subject, Style::default().fg(Color::DarkGray))),
    ];
    let paragraph = Paragraph::new(text)
        .block(
            Block::default()
                .title("Confirm Deletion")
                .borders(Borders::ALL)
                .style(Style::default().fg(Color::Yellow)),
        )
        .style(Style::default().fg(Color::White))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    frame.render_widget(Clear, popup_area); // This clears the area behind the popup
    frame.render_widget(paragraph, popup_area);
}

pub fn render_help_screen(frame: &mut Frame, app: &App, area: Rect) {
    let popup_area = centered_rect(56, 20, area);
    let keymap = &app.config.keymap;

    let heading = |text: &'static str| {
        Line::from(Span::styled(
            text,
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ))
    };

    let lines = vec![
        heading("Everywhere"),
        Line::from(format!("{:<14} Next / previous panel", format!("{} / {}", keymap.next_focus, keymap.prev_focus))),
        Line::from(format!("{:<14} Save mood", keymap.save_entry)),
        Line::from(format!("{:<14} Quit (outside text fields)", keymap.quit)),
        Line::from(format!("{:<14} Toggle this help", keymap.help)),
        Line::from(""),
        heading("Calendar"),
        Line::from(format!("{:<14} Previous / next day", "←/→")),
        Line::from(format!("{:<14} Previous / next week", "↑/↓")),
        Line::from(format!("{:<14} Previous / next month", format!("{} / {}", keymap.prev_month, keymap.next_month))),
        Line::from(format!("{:<14} Jump to today", keymap.goto_today)),
        Line::from("Only today and the two days before take new moods"),
        Line::from(""),
        heading("Form"),
        Line::from(format!("{:<14} Pick rating", "1-5, ←/→")),
        Line::from(format!("{:<14} Add tag / save", "Enter")),
        Line::from(""),
        heading("History"),
        Line::from(format!("{:<14} Delete selected mood", keymap.delete_entry)),
    ];

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .title(" Help ")
            .borders(Borders::ALL)
            .style(Style::default().fg(Color::White)),
    );

    frame.render_widget(Clear, popup_area);
    frame.render_widget(paragraph, popup_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::ui::render;
    use chrono::NaiveDate;
    use moodtrack_core::storage::{MemoryStore, MoodStore};
    use ratatui::{backend::TestBackend, Terminal};

    fn app() -> App {
        let (store, report) = MoodStore::open(Box::new(MemoryStore::new())).unwrap();
        App::with_store(
            store,
            report,
            Config::default(),
            NaiveDate::from_ymd_opt(2024, 10, 7).unwrap(),
        )
    }

    fn screen(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer.get(x, y).symbol());
            }
            text.push('\n');
        }
        text
    }

    #[test]
    fn test_empty_history_message() {
        let mut app = app();
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| render(f, &mut app)).unwrap();

        let text = screen(&terminal);
        assert!(text.contains("No moods recorded yet"));
        assert!(text.contains("October 2024"));
    }

    #[test]
    fn test_history_card_and_calendar_cells() {
        let mut app = app();
        app.form.set_note("good day");
        app.form.set_tag_input("work");
        app.confirm_tag();
        app.submit_form();

        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| render(f, &mut app)).unwrap();

        let text = screen(&terminal);
        assert!(text.contains("good day"));
        assert!(text.contains("#work"));
        assert!(!text.contains("No moods recorded yet"));

        // October 2024 needs five Sunday-first weeks
        assert_eq!(app.calendar_cells.len(), 35);
        let (rect, date) = app.calendar_cells[8];
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 10, 7).unwrap());
        assert!(app.calendar_click(rect.x, rect.y));
    }

    #[test]
    fn test_rating_colors_distinct() {
        let colors: Vec<Color> = MoodRating::ALL.iter().map(|r| rating_color(*r)).collect();
        for (i, a) in colors.iter().enumerate() {
            for b in &colors[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_cursor_stays_inside_field() {
        let area = Rect::new(10, 20, 30, 5);
        assert_eq!(wrapped_cursor(area, 0), Some((10, 21)));
        assert_eq!(wrapped_cursor(area, 31), Some((11, 22)));
        // Text far longer than the field pins the cursor to its last row
        let (_, y) = wrapped_cursor(area, usize::MAX).unwrap();
        assert_eq!(y, 24);
        assert_eq!(wrapped_cursor(Rect::new(0, 0, 0, 5), 3), None);

        assert_eq!(input_cursor(area, 5), (15, 21));
        assert_eq!(input_cursor(area, 200_000), (39, 21));

        let edge = Rect::new(u16::MAX - 4, u16::MAX - 4, 4, 4);
        let (x, y) = input_cursor(edge, usize::MAX);
        assert!(x >= edge.x && y >= edge.y);
    }

    #[test]
    fn test_long_note_renders() {
        let mut app = app();
        app.set_focus(Focus::Note);
        app.form.set_note("x".repeat(70_000));
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| render(f, &mut app)).unwrap();
    }

    #[test]
    fn test_centered_rect_clamps() {
        let area = Rect::new(0, 0, 40, 10);
        let popup = centered_rect(60, 6, area);
        assert_eq!(popup.width, 40);
        assert_eq!(popup.y, 2);
    }
}
