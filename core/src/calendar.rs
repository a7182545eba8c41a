//! Month grid layout and the date-selection rules for new entries.

use crate::models::MoodRecord;
use chrono::{Datelike, Duration, Months, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Number of days before today that still accept a new entry
pub const SELECTABLE_DAYS_BACK: i64 = 2;

/// First column of the calendar grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    #[default]
    Sunday,
    Monday,
}

impl WeekStart {
    pub fn weekday(self) -> Weekday {
        match self {
            WeekStart::Sunday => Weekday::Sun,
            WeekStart::Monday => Weekday::Mon,
        }
    }

    /// Column headers in grid order
    pub fn labels(self) -> [&'static str; 7] {
        match self {
            WeekStart::Sunday => ["Su", "Mo", "Tu", "We", "Th", "Fr", "Sa"],
            WeekStart::Monday => ["Mo", "Tu", "We", "Th", "Fr", "Sa", "Su"],
        }
    }

    /// Column of `day` in a grid starting on this weekday
    fn column(self, day: Weekday) -> i64 {
        let offset = 7 + day.num_days_from_sunday() - self.weekday().num_days_from_sunday();
        i64::from(offset % 7)
    }
}

/// A date accepts a new entry iff it lies in `[today - 2, today]`
pub fn is_selectable(date: NaiveDate, today: NaiveDate) -> bool {
    date <= today && date >= today - Duration::days(SELECTABLE_DAYS_BACK)
}

/// First day of the month containing `date`
pub fn month_start(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date)
}

/// Last day of the month containing `date`
pub fn month_end(date: NaiveDate) -> NaiveDate {
    let start = month_start(date);
    start
        .checked_add_months(Months::new(1))
        .map(|next| next - Duration::days(1))
        .unwrap_or(start)
}

/// Shift a month by `delta` months, keeping it on the first day
pub fn shift_month(month: NaiveDate, delta: i32) -> NaiveDate {
    let start = month_start(month);
    let shifted = if delta >= 0 {
        start.checked_add_months(Months::new(delta.unsigned_abs()))
    } else {
        start.checked_sub_months(Months::new(delta.unsigned_abs()))
    };
    shifted.unwrap_or(start)
}

/// Records keyed by calendar day. When several records share a day the
/// first one in collection order wins.
#[derive(Debug, Default)]
pub struct MoodIndex<'a> {
    by_day: HashMap<NaiveDate, &'a MoodRecord>,
}

impl<'a> MoodIndex<'a> {
    pub fn build(records: &'a [MoodRecord]) -> Self {
        let mut by_day = HashMap::new();
        for record in records {
            by_day.entry(record.date).or_insert(record);
        }
        Self { by_day }
    }

    pub fn get(&self, date: NaiveDate) -> Option<&'a MoodRecord> {
        self.by_day.get(&date).copied()
    }
}

/// One cell of the month grid
#[derive(Debug, Clone)]
pub struct CalendarDay<'a> {
    pub date: NaiveDate,
    pub in_month: bool,
    pub is_today: bool,
    pub selectable: bool,
    pub mood: Option<&'a MoodRecord>,
}

/// Complete weeks covering one month
#[derive(Debug, Clone)]
pub struct MonthGrid<'a> {
    pub month: NaiveDate,
    pub days: Vec<CalendarDay<'a>>,
}

impl<'a> MonthGrid<'a> {
    /// Rows of seven days
    pub fn weeks(&self) -> impl Iterator<Item = &[CalendarDay<'a>]> {
        self.days.chunks(7)
    }

    pub fn day(&self, date: NaiveDate) -> Option<&CalendarDay<'a>> {
        self.days.iter().find(|d| d.date == date)
    }
}

/// Lay out the month containing `reference`, padded to whole weeks
pub fn month_grid<'a>(
    reference: NaiveDate,
    week_start: WeekStart,
    today: NaiveDate,
    index: &MoodIndex<'a>,
) -> MonthGrid<'a> {
    let first = month_start(reference);
    let last = month_end(reference);

    let grid_start = first - Duration::days(week_start.column(first.weekday()));
    let grid_end = last + Duration::days(6 - week_start.column(last.weekday()));

    let mut days = Vec::with_capacity(42);
    let mut date = grid_start;
    while date <= grid_end {
        days.push(CalendarDay {
            date,
            in_month: date.year() == first.year() && date.month() == first.month(),
            is_today: date == today,
            selectable: is_selectable(date, today),
            mood: index.get(date),
        });
        date += Duration::days(1);
    }

    MonthGrid { month: first, days }
}

/// The selected date plus the month currently on screen
#[derive(Debug, Clone, PartialEq)]
pub struct DateSelection {
    selected: NaiveDate,
    month: NaiveDate,
    today: NaiveDate,
}

impl DateSelection {
    /// Start on today
    pub fn new(today: NaiveDate) -> Self {
        Self {
            selected: today,
            month: month_start(today),
            today,
        }
    }

    pub fn selected(&self) -> NaiveDate {
        self.selected
    }

    /// First day of the displayed month
    pub fn month(&self) -> NaiveDate {
        self.month
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Select `date` if it accepts a new entry. A rejected request leaves
    /// the selection untouched and returns false.
    pub fn select(&mut self, date: NaiveDate) -> bool {
        if !is_selectable(date, self.today) {
            log::debug!(
                "event=select_rejected module=calendar date={}",
                date.format("%Y-%m-%d")
            );
            return false;
        }
        self.selected = date;
        self.month = month_start(date);
        true
    }

    /// Select the day `days` away from the current selection
    pub fn move_by(&mut self, days: i64) -> bool {
        self.select(self.selected + Duration::days(days))
    }

    pub fn next_month(&mut self) {
        self.month = shift_month(self.month, 1);
    }

    pub fn prev_month(&mut self) {
        self.month = shift_month(self.month, -1);
    }

    pub fn goto_today(&mut self) {
        self.selected = self.today;
        self.month = month_start(self.today);
    }

    /// Advance the clock. A selection that fell out of the window snaps back to today.
    pub fn set_today(&mut self, today: NaiveDate) {
        if today == self.today {
            return;
        }
        self.today = today;
        if !is_selectable(self.selected, today) {
            self.goto_today();
        }
    }

    /// Grid for the displayed month
    pub fn grid<'a>(&self, week_start: WeekStart, index: &MoodIndex<'a>) -> MonthGrid<'a> {
        month_grid(self.month, week_start, self.today, index)
    }
}
