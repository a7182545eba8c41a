//! Text encoding of the mood collection as stored in its slot.
//!
//! The collection is a JSON array of records. Dates are written as
//! `YYYY-MM-DD`; readers also accept full RFC 3339 timestamps and naive
//! `YYYY-MM-DDTHH:MM:SS` strings, which are reduced to a calendar day.

use crate::models::MoodRecord;
use crate::{Error, Result};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use std::collections::HashSet;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a stored date string into a calendar day
pub fn parse_calendar_date(text: &str) -> Result<NaiveDate> {
    let text = text.trim();

    if let Ok(date) = NaiveDate::parse_from_str(text, DATE_FORMAT) {
        return Ok(date);
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(text) {
        return Ok(timestamp.with_timezone(&Local).date_naive());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(naive.date());
    }

    Err(Error::InvalidInput(format!("unrecognized date: {:?}", text)))
}

/// Serialize the whole collection
pub fn encode_records(records: &[MoodRecord]) -> Result<String> {
    Ok(serde_json::to_string(records)?)
}

/// Parse a stored collection.
///
/// Any structural problem (bad JSON, missing field, rating out of range,
/// unparseable date, blank note) fails the whole document. Records that
/// repeat an earlier id are dropped.
pub fn decode_records(text: &str) -> Result<Vec<MoodRecord>> {
    let records: Vec<MoodRecord> = serde_json::from_str(text)?;

    let mut seen = HashSet::new();
    let mut unique = Vec::with_capacity(records.len());
    for record in records {
        if record.note.trim().is_empty() {
            return Err(Error::InvalidInput(format!(
                "record {} has an empty note",
                record.id
            )));
        }
        if !seen.insert(record.id.clone()) {
            log::warn!(
                "event=duplicate_id_dropped module=storage id={}",
                record.id
            );
            continue;
        }
        unique.push(record);
    }

    Ok(unique)
}

/// Serde adapter for `NaiveDate` fields using the lenient reader above
pub mod calendar_date {
    use super::{parse_calendar_date, DATE_FORMAT};
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date.format(DATE_FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        parse_calendar_date(&text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MoodDraft, MoodRating, TagSet};

    fn record(id: &str, day: u32, rating: MoodRating, note: &str, tags: &[&str]) -> MoodRecord {
        let draft = MoodDraft::new(rating, note, tags.iter().copied().collect::<TagSet>()).unwrap();
        MoodRecord::with_id(
            id.to_string(),
            draft,
            NaiveDate::from_ymd_opt(2024, 10, day).unwrap(),
        )
    }

    #[test]
    fn test_parse_plain_date() {
        assert_eq!(
            parse_calendar_date("2024-02-29").unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
    }

    #[test]
    fn test_parse_timestamps() {
        // Noon UTC lands on the same day in almost every timezone
        assert_eq!(
            parse_calendar_date("2024-10-07T12:00:00.000Z").unwrap(),
            NaiveDate::from_ymd_opt(2024, 10, 7).unwrap()
        );
        assert_eq!(
            parse_calendar_date("2024-10-07T23:59:59").unwrap(),
            NaiveDate::from_ymd_opt(2024, 10, 7).unwrap()
        );
    }

    #[test]
    fn test_parse_garbage() {
        assert!(parse_calendar_date("yesterday").is_err());
        assert!(parse_calendar_date("2024-13-01").is_err());
    }

    #[test]
    fn test_collection_roundtrip() {
        let records = vec![
            record("c", 9, MoodRating::Excellent, "great", &["family", "sun"]),
            record("b", 8, MoodRating::Terrible, "rough", &[]),
            record("a", 7, MoodRating::Okay, "meh", &["work"]),
        ];

        let text = encode_records(&records).unwrap();
        let decoded = decode_records(&text).unwrap();

        assert_eq!(decoded, records);
    }

    #[test]
    fn test_decode_timestamp_dated_records() {
        let text = r#"[{"id":"x","date":"2024-10-07T12:00:00.000Z","rating":4,"note":"good day","tags":["work"]}]"#;
        let decoded = decode_records(text).unwrap();
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0].date, NaiveDate::from_ymd_opt(2024, 10, 7).unwrap());
        assert_eq!(decoded[0].rating, MoodRating::Good);
    }

    #[test]
    fn test_decode_rejects_bad_documents() {
        assert!(decode_records("not json").is_err());
        assert!(decode_records(r#"[{"id":"x","date":"2024-10-07","rating":4,"tags":[]}]"#).is_err());
        assert!(decode_records(r#"[{"id":"x","date":"2024-10-07","rating":0,"note":"n","tags":[]}]"#).is_err());
        assert!(decode_records(r#"[{"id":"x","date":"2024-10-07","rating":3,"note":" ","tags":[]}]"#).is_err());
    }

    #[test]
    fn test_decode_drops_repeated_ids() {
        let text = r#"[
            {"id":"x","date":"2024-10-08","rating":5,"note":"first","tags":[]},
            {"id":"x","date":"2024-10-07","rating":1,"note":"second","tags":[]}
        ]"#;
        let decoded = decode_records(text).unwrap();
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0].note, "first");
    }
}
