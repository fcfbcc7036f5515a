/// Category labels and the user's configured category set
use serde::{Deserialize, Serialize};

/// Label given to anything that cannot be categorized
pub const FALLBACK_LABEL: &str = "Misc";

/// Built-in categories, used when none are configured and on reset
pub const DEFAULT_CATEGORIES: &[&str] = &[
    "Development",
    "Social",
    "Entertainment",
    "News",
    "Shopping",
    "Education",
    "Finance",
    "Travel",
    "Work",
];

/// Capitalize the first character and lowercase the rest
pub fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Ordered set of category labels, unique ignoring case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct CategorySet {
    labels: Vec<String>,
}

impl CategorySet {
    /// Build a set from raw labels, trimming them and dropping blanks and
    /// case-insensitive duplicates (first spelling wins)
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = CategorySet { labels: Vec::new() };
        for label in labels {
            set.add(label.as_ref());
        }
        set
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Canonical spelling of `label` if the set contains it, ignoring case
    pub fn find(&self, label: &str) -> Option<&str> {
        let wanted = label.trim().to_lowercase();
        self.labels
            .iter()
            .find(|known| known.to_lowercase() == wanted)
            .map(String::as_str)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.find(label).is_some()
    }

    /// Returns false when the label is blank or already present
    pub fn add(&mut self, label: &str) -> bool {
        let label = label.trim();
        if label.is_empty() || self.contains(label) {
            return false;
        }
        self.labels.push(label.to_string());
        true
    }

    pub fn remove(&mut self, label: &str) -> bool {
        let wanted = label.trim().to_lowercase();
        let original_len = self.labels.len();
        self.labels.retain(|known| known.to_lowercase() != wanted);
        self.labels.len() < original_len
    }

    pub fn reset(&mut self) {
        *self = CategorySet::default();
    }
}

impl Default for CategorySet {
    fn default() -> Self {
        CategorySet::new(DEFAULT_CATEGORIES)
    }
}

impl From<Vec<String>> for CategorySet {
    fn from(labels: Vec<String>) -> Self {
        CategorySet::new(labels)
    }
}

impl From<CategorySet> for Vec<String> {
    fn from(set: CategorySet) -> Vec<String> {
        set.labels
    }
}
