use super::{MoodRating, TagSet};
use crate::storage::codec::calendar_date;
use crate::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single persisted mood entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MoodRecord {
    pub id: String,
    #[serde(with = "calendar_date")]
    pub date: NaiveDate,
    pub rating: MoodRating,
    pub note: String,
    pub tags: TagSet,
}

/// Form payload: everything a record needs except its id and date
#[derive(Debug, Clone, PartialEq)]
pub struct MoodDraft {
    pub rating: MoodRating,
    pub note: String,
    pub tags: TagSet,
}

impl MoodDraft {
    /// Build a draft, rejecting a blank note
    pub fn new(rating: MoodRating, note: impl Into<String>, tags: TagSet) -> Result<Self> {
        let draft = Self {
            rating,
            note: note.into(),
            tags,
        };
        draft.validate()?;
        Ok(draft)
    }

    pub fn validate(&self) -> Result<()> {
        if self.note.trim().is_empty() {
            return Err(Error::InvalidInput("note must not be empty".to_string()));
        }
        Ok(())
    }
}

impl MoodRecord {
    /// Create a record for `date` with a generated UUID
    pub fn new(draft: MoodDraft, date: NaiveDate) -> Self {
        Self::with_id(uuid::Uuid::new_v4().to_string(), draft, date)
    }

    /// Create a record with a specific ID (for testing or import)
    pub fn with_id(id: String, draft: MoodDraft, date: NaiveDate) -> Self {
        Self {
            id,
            date,
            rating: draft.rating,
            note: draft.note,
            tags: draft.tags,
        }
    }

    /// Format the date as YYYY-MM-DD
    pub fn date_string(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(note: &str) -> MoodDraft {
        MoodDraft::new(MoodRating::Good, note, TagSet::from(vec!["work".to_string()])).unwrap()
    }

    #[test]
    fn test_record_creation() {
        let date = NaiveDate::from_ymd_opt(2024, 10, 7).unwrap();
        let record = MoodRecord::new(draft("good day"), date);
        assert!(!record.id.is_empty());
        assert_eq!(record.note, "good day");
        assert_eq!(record.date_string(), "2024-10-07");
    }

    #[test]
    fn test_ids_are_unique() {
        let date = NaiveDate::from_ymd_opt(2024, 10, 7).unwrap();
        let a = MoodRecord::new(draft("a"), date);
        let b = MoodRecord::new(draft("b"), date);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_blank_note_rejected() {
        assert!(matches!(
            MoodDraft::new(MoodRating::Okay, "   ", TagSet::new()),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_json_shape() {
        let date = NaiveDate::from_ymd_opt(2024, 10, 7).unwrap();
        let record = MoodRecord::with_id("m-1".to_string(), draft("fine"), date);
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["date"], "2024-10-07");
        assert_eq!(value["rating"], 4);
        assert_eq!(value["tags"][0], "work");
    }
}
