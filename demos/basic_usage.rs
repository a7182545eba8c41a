// Example: Basic usage of the moodtrack-core library
use std::fs;

use chrono::{Duration, Local};
use moodtrack_core::calendar::{DateSelection, WeekStart};
use moodtrack_core::form::MoodForm;
use moodtrack_core::models::{MoodDraft, MoodRating, TagSet};
use moodtrack_core::storage::{Database, MoodStore, SqliteStore};

fn main() -> anyhow::Result<()> {
    let db_path = "basic_usage_moodtrack.db";
    fs::remove_file(db_path).ok(); // Clean up previous run

    println!("--- Basic Usage of moodtrack-core ---");

    // ========== Open Storage ==========
    println!("\n1. Opening storage...");
    let db = Database::new(db_path);
    let backend = SqliteStore::open(&db)?;
    println!(
        "   ✓ Database ready with schema version {}",
        db.get_schema_version(backend.connection())?
    );
    let (mut store, report) = MoodStore::open(Box::new(backend))?;
    println!("   ✓ Loaded: {:?}", report);

    // ========== Pick Dates ==========
    println!("\n2. Selecting dates...");
    let today = Local::now().date_naive();
    let mut selection = DateSelection::new(today);
    let too_old = today - Duration::days(5);
    println!(
        "   ✓ {} selectable: {}",
        too_old,
        selection.select(too_old)
    );
    println!("   ✓ Selected: {}", selection.selected());

    // ========== Fill In The Form ==========
    println!("\n3. Recording moods...");
    let mut form = MoodForm::new();
    form.set_rating(MoodRating::Good);
    form.set_note("good day");
    form.set_tag_input("work");
    form.confirm_tag();
    form.set_tag_input("work");
    println!("   ✓ Second 'work' tag: {:?}", form.confirm_tag());
    let today_mood = store.add(form.submit()?, selection.selected())?;
    println!("   ✓ Recorded {} for {}", today_mood.rating.label(), today_mood.date);

    selection.move_by(-1);
    form.set_rating(MoodRating::Bad);
    form.set_note("long commute");
    let yesterday_mood = store.add(form.submit()?, selection.selected())?;
    println!("   ✓ Recorded {} for {}", yesterday_mood.rating.label(), yesterday_mood.date);

    let again = MoodDraft::new(MoodRating::Okay, "again", TagSet::new())?;
    match store.add(again, selection.selected()) {
        Ok(_) => println!("   ✗ Same-day entry was accepted"),
        Err(e) => println!("   ✓ Same-day entry rejected: {}", e),
    }

    // ========== Calendar ==========
    println!("\n4. Calendar for {}...", selection.month().format("%B %Y"));
    let index = store.index();
    let grid = selection.grid(WeekStart::Sunday, &index);
    println!("   {}", WeekStart::Sunday.labels().join(" "));
    for week in grid.weeks() {
        let cells: Vec<String> = week
            .iter()
            .map(|day| match day.mood {
                Some(mood) => format!("{:>2}", mood.rating.glyph()),
                None if day.in_month => format!("{:>2}", day.date.format("%-d")),
                None => "  ".to_string(),
            })
            .collect();
        println!("   {}", cells.join(" "));
    }

    // ========== History ==========
    println!("\n5. History (newest first)...");
    for record in store.records() {
        let tags: Vec<&str> = record.tags.iter().collect();
        println!("   {} {} {} {:?}", record.date, record.rating.label(), record.note, tags);
    }

    // ========== Delete ==========
    println!("\n6. Deleting...");
    store.remove(&today_mood.id);
    store.remove(&yesterday_mood.id);
    if store.is_empty() {
        println!("   ✓ No moods recorded yet");
    }

    fs::remove_file(db_path).ok();
    println!("\n--- Done ---");
    Ok(())
}
