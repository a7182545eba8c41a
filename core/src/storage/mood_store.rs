use super::codec::{decode_records, encode_records};
use super::KeyValueStore;
use crate::calendar::MoodIndex;
use crate::models::{MoodDraft, MoodRecord};
use crate::{Error, Result};
use chrono::{NaiveDate, Utc};

/// Slot holding the serialized collection
pub const MOODS_KEY: &str = "moods";

/// Slot receiving an unreadable collection before it gets overwritten.
/// A different unreadable document found later goes to a timestamped
/// sibling (`moods.corrupt.<utc>`) so earlier backups survive.
pub const CORRUPT_KEY: &str = "moods.corrupt";

/// What `load` found in the durable mirror
#[derive(Debug, Clone, PartialEq)]
pub enum LoadReport {
    /// Nothing stored yet
    Empty,
    /// The stored collection was read in full
    Loaded(usize),
    /// The stored collection could not be read and was replaced by an empty
    /// one. `backup` names the slot holding the raw text, `None` if that
    /// copy could not be written.
    Recovered {
        reason: String,
        backup: Option<String>,
    },
}

/// Owns the mood collection (newest first) and writes it through to a
/// `KeyValueStore` after every change.
pub struct MoodStore {
    backend: Box<dyn KeyValueStore>,
    records: Vec<MoodRecord>,
    flush_error: Option<String>,
}

impl MoodStore {
    /// Wrap a backend and load whatever it holds
    pub fn open(backend: Box<dyn KeyValueStore>) -> Result<(Self, LoadReport)> {
        let mut store = Self {
            backend,
            records: Vec::new(),
            flush_error: None,
        };
        let report = store.load()?;
        Ok((store, report))
    }

    /// Replace the in-memory collection with the durable mirror.
    ///
    /// Only a failure to read the backend is an error. An unreadable
    /// document leaves the collection empty and is copied to a backup slot
    /// so the next flush does not destroy it.
    pub fn load(&mut self) -> Result<LoadReport> {
        let text = match self.backend.get(MOODS_KEY)? {
            Some(text) => text,
            None => {
                self.records.clear();
                log::info!("event=store_loaded module=storage records=0 status=empty");
                return Ok(LoadReport::Empty);
            }
        };

        match decode_records(&text) {
            Ok(records) => {
                let count = records.len();
                self.records = records;
                log::info!("event=store_loaded module=storage records={} status=ok", count);
                Ok(LoadReport::Loaded(count))
            }
            Err(err) => {
                self.records.clear();
                let reason = err.to_string();
                log::warn!(
                    "event=store_recovered module=storage status=corrupt reason={}",
                    reason
                );
                let backup_key = self.backup_key(&text);
                let backup = match self.backend.set(&backup_key, &text) {
                    Ok(()) => Some(backup_key),
                    Err(backup_err) => {
                        log::error!(
                            "event=corrupt_backup_failed module=storage slot={} error={}",
                            backup_key,
                            backup_err
                        );
                        None
                    }
                };
                Ok(LoadReport::Recovered { reason, backup })
            }
        }
    }

    /// Slot for a backup of `text`: [`CORRUPT_KEY`] unless it already holds
    /// something else
    fn backup_key(&self, text: &str) -> String {
        match self.backend.get(CORRUPT_KEY) {
            Ok(None) => CORRUPT_KEY.to_string(),
            Ok(Some(existing)) if existing == text => CORRUPT_KEY.to_string(),
            _ => format!("{}.{}", CORRUPT_KEY, Utc::now().format("%Y%m%dT%H%M%S%.3fZ")),
        }
    }

    /// Record a mood for `date`, newest first.
    ///
    /// Fails with `InvalidInput` for a blank note and with
    /// `ConstraintViolation` when `date` already has a record. A failed
    /// write does not fail the call; see [`MoodStore::flush_error`].
    pub fn add(&mut self, draft: MoodDraft, date: NaiveDate) -> Result<MoodRecord> {
        draft.validate()?;

        if self.mood_on(date).is_some() {
            return Err(Error::ConstraintViolation(format!(
                "a mood is already recorded for {}",
                date.format("%Y-%m-%d")
            )));
        }

        let record = MoodRecord::new(draft, date);
        self.records.insert(0, record.clone());
        log::info!(
            "event=mood_added module=storage id={} date={} rating={}",
            record.id,
            record.date_string(),
            record.rating.value()
        );

        self.flush_reporting();
        Ok(record)
    }

    /// Delete the record with `id`. Returns whether a record was removed;
    /// an unknown id is a no-op.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.records.len();
        self.records.retain(|r| r.id != id);
        let removed = self.records.len() != before;

        if removed {
            log::info!("event=mood_removed module=storage id={}", id);
        } else {
            log::debug!("event=mood_remove_noop module=storage id={}", id);
        }

        self.flush_reporting();
        removed
    }

    /// Write the whole collection to the durable mirror
    pub fn flush(&mut self) -> Result<()> {
        let text = encode_records(&self.records)?;
        self.backend.set(MOODS_KEY, &text)?;
        self.flush_error = None;
        Ok(())
    }

    fn flush_reporting(&mut self) {
        if let Err(err) = self.flush() {
            log::error!(
                "event=flush_failed module=storage records={} error={}",
                self.records.len(),
                err
            );
            self.flush_error = Some(err.to_string());
        }
    }

    /// Message of the last failed write, cleared by the next successful one
    pub fn flush_error(&self) -> Option<&str> {
        self.flush_error.as_deref()
    }

    pub fn records(&self) -> &[MoodRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&MoodRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// First record dated `date`
    pub fn mood_on(&self, date: NaiveDate) -> Option<&MoodRecord> {
        self.records.iter().find(|r| r.date == date)
    }

    /// Day-keyed lookup for calendar rendering
    pub fn index(&self) -> MoodIndex<'_> {
        MoodIndex::build(&self.records)
    }
}
