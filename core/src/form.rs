use crate::models::{MoodDraft, MoodRating, TagSet};
use crate::Result;

/// Result of confirming the tag input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagOutcome {
    Added(String),
    Duplicate(String),
    Empty,
}

/// Input buffers for a new mood entry
#[derive(Debug, Clone, Default)]
pub struct MoodForm {
    rating: MoodRating,
    note: String,
    tag_input: String,
    tags: TagSet,
}

impl MoodForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rating(&self) -> MoodRating {
        self.rating
    }

    pub fn note(&self) -> &str {
        &self.note
    }

    pub fn tag_input(&self) -> &str {
        &self.tag_input
    }

    pub fn tags(&self) -> &TagSet {
        &self.tags
    }

    pub fn set_rating(&mut self, rating: MoodRating) {
        self.rating = rating;
    }

    pub fn rating_up(&mut self) {
        self.rating = self.rating.up();
    }

    pub fn rating_down(&mut self) {
        self.rating = self.rating.down();
    }

    pub fn push_note(&mut self, c: char) {
        self.note.push(c);
    }

    pub fn pop_note(&mut self) {
        self.note.pop();
    }

    pub fn set_note(&mut self, note: impl Into<String>) {
        self.note = note.into();
    }

    pub fn push_tag_input(&mut self, c: char) {
        self.tag_input.push(c);
    }

    pub fn pop_tag_input(&mut self) {
        self.tag_input.pop();
    }

    pub fn set_tag_input(&mut self, input: impl Into<String>) {
        self.tag_input = input.into();
    }

    /// Move the trimmed tag input into the tag set. The input is cleared
    /// unless it was blank.
    pub fn confirm_tag(&mut self) -> TagOutcome {
        let tag = self.tag_input.trim().to_string();
        if tag.is_empty() {
            return TagOutcome::Empty;
        }
        self.tag_input.clear();
        if self.tags.insert(tag.clone()) {
            TagOutcome::Added(tag)
        } else {
            TagOutcome::Duplicate(tag)
        }
    }

    pub fn remove_tag(&mut self, tag: &str) -> bool {
        self.tags.remove(tag)
    }

    /// Drop the most recently added tag
    pub fn pop_tag(&mut self) -> Option<String> {
        self.tags.pop()
    }

    /// Build a draft from the buffers without clearing them
    pub fn draft(&self) -> Result<MoodDraft> {
        MoodDraft::new(self.rating, self.note.trim(), self.tags.clone())
    }

    /// Clear note, tag input and tags. The rating is kept.
    pub fn reset(&mut self) {
        self.note.clear();
        self.tag_input.clear();
        self.tags.clear();
    }

    /// Produce a draft and reset the buffers. A blank note fails and leaves
    /// every buffer as it was.
    pub fn submit(&mut self) -> Result<MoodDraft> {
        let draft = self.draft()?;
        self.reset();
        Ok(draft)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    fn type_note(form: &mut MoodForm, text: &str) {
        for c in text.chars() {
            form.push_note(c);
        }
    }

    fn add_tag(form: &mut MoodForm, text: &str) -> TagOutcome {
        form.set_tag_input(text);
        form.confirm_tag()
    }

    #[test]
    fn test_default_rating_is_valid() {
        let form = MoodForm::new();
        assert_eq!(form.rating(), MoodRating::Okay);
    }

    #[test]
    fn test_duplicate_tag_kept_once() {
        let mut form = MoodForm::new();
        type_note(&mut form, "fine");

        assert_eq!(add_tag(&mut form, "happy"), TagOutcome::Added("happy".to_string()));
        assert_eq!(add_tag(&mut form, "happy"), TagOutcome::Duplicate("happy".to_string()));
        assert_eq!(form.tag_input(), "");

        let draft = form.submit().unwrap();
        assert_eq!(draft.tags.iter().collect::<Vec<_>>(), vec!["happy"]);
    }

    #[test]
    fn test_tag_input_trimmed() {
        let mut form = MoodForm::new();
        assert_eq!(add_tag(&mut form, "   "), TagOutcome::Empty);
        assert_eq!(add_tag(&mut form, "  gym "), TagOutcome::Added("gym".to_string()));
        assert!(form.tags().contains("gym"));
    }

    #[test]
    fn test_empty_note_blocks_submit() {
        let mut form = MoodForm::new();
        add_tag(&mut form, "work");

        assert!(matches!(form.submit(), Err(Error::InvalidInput(_))));
        // Buffers survive a rejected submission
        assert_eq!(form.tags().len(), 1);
    }

    #[test]
    fn test_submit_resets_buffers() {
        let mut form = MoodForm::new();
        form.set_rating(MoodRating::Excellent);
        type_note(&mut form, "good day");
        add_tag(&mut form, "work");
        form.set_tag_input("half-typed");

        let draft = form.submit().unwrap();
        assert_eq!(draft.rating, MoodRating::Excellent);
        assert_eq!(draft.note, "good day");

        assert_eq!(form.note(), "");
        assert_eq!(form.tag_input(), "");
        assert!(form.tags().is_empty());
        assert_eq!(form.rating(), MoodRating::Excellent);
    }

    #[test]
    fn test_editing_buffers() {
        let mut form = MoodForm::new();
        type_note(&mut form, "abc");
        form.pop_note();
        assert_eq!(form.note(), "ab");

        form.rating_up();
        form.rating_up();
        form.rating_up();
        assert_eq!(form.rating(), MoodRating::Excellent);
        form.rating_down();
        assert_eq!(form.rating(), MoodRating::Good);

        add_tag(&mut form, "a");
        add_tag(&mut form, "b");
        assert_eq!(form.pop_tag(), Some("b".to_string()));
        assert!(form.remove_tag("a"));
        assert!(form.tags().is_empty());
    }
}
