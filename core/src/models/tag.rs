use serde::{Deserialize, Serialize};

/// Insertion-ordered set of tag labels. Duplicates are rejected by exact,
/// case-sensitive comparison.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct TagSet(Vec<String>);

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tag; returns false if an equal tag is already present
    pub fn insert(&mut self, tag: impl Into<String>) -> bool {
        let tag = tag.into();
        if self.contains(&tag) {
            return false;
        }
        self.0.push(tag);
        true
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.0.iter().any(|t| t == tag)
    }

    /// Remove a tag; returns false if it was not present
    pub fn remove(&mut self, tag: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|t| t != tag);
        self.0.len() != before
    }

    /// Remove the most recently added tag
    pub fn pop(&mut self) -> Option<String> {
        self.0.pop()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

impl From<Vec<String>> for TagSet {
    fn from(tags: Vec<String>) -> Self {
        tags.into_iter().collect()
    }
}

impl From<TagSet> for Vec<String> {
    fn from(tags: TagSet) -> Self {
        tags.0
    }
}

impl<S: Into<String>> FromIterator<S> for TagSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = TagSet::new();
        for tag in iter {
            set.insert(tag);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_rejects_duplicates() {
        let mut tags = TagSet::new();
        assert!(tags.insert("happy"));
        assert!(!tags.insert("happy"));
        assert_eq!(tags.len(), 1);
    }

    #[test]
    fn test_case_sensitive() {
        let mut tags = TagSet::new();
        tags.insert("Work");
        assert!(tags.insert("work"));
        assert_eq!(tags.len(), 2);
    }

    #[test]
    fn test_preserves_insertion_order() {
        let tags: TagSet = vec!["b", "a", "b", "c"].into_iter().collect();
        assert_eq!(tags.iter().collect::<Vec<_>>(), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_deserialize_dedupes() {
        let tags: TagSet = serde_json::from_str(r#"["x","y","x"]"#).unwrap();
        assert_eq!(tags.len(), 2);
        assert_eq!(serde_json::to_string(&tags).unwrap(), r#"["x","y"]"#);
    }

    #[test]
    fn test_remove() {
        let mut tags: TagSet = vec!["work", "gym"].into_iter().collect();
        assert!(tags.remove("work"));
        assert!(!tags.remove("work"));
        assert_eq!(tags.pop(), Some("gym".to_string()));
        assert!(tags.is_empty());
    }
}
