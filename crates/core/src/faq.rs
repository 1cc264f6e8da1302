use crate::knowledge::{FaqAnswer, KnowledgeBase, KnowledgeError};

/// Ordered keyword lookup over the rendered FAQ table.
///
/// The first entry whose keyword is a substring of the normalized text wins. There is no
/// scoring or longest-match preference, so table order is behaviour.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FaqMatcher {
    entries: Vec<FaqAnswer>,
}

impl FaqMatcher {
    pub fn new(entries: Vec<FaqAnswer>) -> Self {
        Self { entries }
    }

    pub fn from_knowledge(knowledge: &KnowledgeBase) -> Result<Self, KnowledgeError> {
        Ok(Self::new(knowledge.render_entries()?))
    }

    /// `normalized_text` must already be lower-cased with punctuation stripped.
    pub fn find(&self, normalized_text: &str) -> Option<&FaqAnswer> {
        if normalized_text.is_empty() {
            return None;
        }
        self.entries.iter().find(|entry| normalized_text.contains(entry.keyword.as_str()))
    }

    pub fn keywords(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.keyword.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
