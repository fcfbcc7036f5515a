/// AI categorization gateway: page excerpt in, category label out, never failing
use std::sync::LazyLock;
use std::time::Duration;

use log::{debug, warn};
use regex::Regex;

use crate::backend::ModelBackend;
use crate::category::{CategorySet, title_case};
use crate::classifier::classify;
use crate::error::BackendError;
use crate::timer::{Timer, with_deadline};

/// Longest excerpt sent to a model, in characters
pub const MAX_EXCERPT_CHARS: usize = 750;

/// Excerpts shorter than this are classified offline
const MIN_EXCERPT_CHARS: usize = 10;

/// Marker the content extractor returns when a page cannot be read
pub const EXCERPT_UNAVAILABLE: &str = "[content unavailable]";

static QUOTES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"["'`\u{201C}\u{201D}\u{2018}\u{2019}]"#).expect("valid regex"));

/// Label chosen for an excerpt, with the reason when the keyword fallback
/// was used instead of the model
#[derive(Debug, Clone, PartialEq)]
pub struct Categorization {
    pub label: String,
    pub fallback: Option<String>,
}

impl Categorization {
    fn from_model(label: String) -> Self {
        Categorization { label, fallback: None }
    }

    fn offline(excerpt: &str, reason: String) -> Self {
        Categorization {
            label: classify(excerpt),
            fallback: Some(reason),
        }
    }
}

/// One categorization call's inputs that stay fixed across a run
pub struct Gateway<'a> {
    pub backend: &'a dyn ModelBackend,
    pub timer: &'a dyn Timer,
    pub categories: &'a CategorySet,
    pub custom_prompt: &'a str,
    pub timeout: Duration,
}

impl Gateway<'_> {
    /// One model call bounded by `timeout`; any failure falls back to the
    /// keyword classifier
    pub async fn categorize(&self, excerpt: &str) -> Categorization {
        let excerpt = truncate_chars(excerpt, MAX_EXCERPT_CHARS);

        if let Some(reason) = unusable_excerpt(excerpt) {
            debug!("skipping model call: {}", reason);
            return Categorization::offline(excerpt, reason.to_string());
        }

        let prompt = build_prompt(self.custom_prompt, excerpt, self.categories);
        let answer = with_deadline(self.timer, self.timeout, self.backend.infer(&prompt))
            .await
            .unwrap_or(Err(BackendError::Timeout(self.timeout)));

        match answer.and_then(|raw| match_label(&raw, self.categories)) {
            Ok(label) => Categorization::from_model(label),
            Err(e) => {
                warn!("{} failed, using keyword fallback: {}", self.backend.name(), e);
                Categorization::offline(excerpt, e.to_string())
            }
        }
    }
}

fn unusable_excerpt(excerpt: &str) -> Option<&'static str> {
    let trimmed = excerpt.trim();
    if trimmed.is_empty() {
        Some("empty excerpt")
    } else if trimmed.starts_with(EXCERPT_UNAVAILABLE) {
        Some("content extraction failed")
    } else if trimmed.chars().count() < MIN_EXCERPT_CHARS {
        Some("excerpt too short")
    } else {
        None
    }
}

pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

pub fn build_prompt(custom_prompt: &str, excerpt: &str, categories: &CategorySet) -> String {
    let mut prompt = String::new();
    if !custom_prompt.trim().is_empty() {
        prompt.push_str(custom_prompt.trim());
        prompt.push_str("\n\n");
    }
    prompt.push_str("Categorize this web page:\n");
    prompt.push_str(excerpt);
    prompt.push_str("\n\n");
    if !categories.is_empty() {
        prompt.push_str("Choose one of these categories if possible: ");
        prompt.push_str(&categories.labels().join(", "));
        prompt.push_str(".\n");
    }
    prompt.push_str("Answer with the category name only, in 1-2 words.");
    prompt
}

/// Strip quotes, keep the first two words and title-case them
pub fn normalize_label(raw: &str) -> String {
    let unquoted = QUOTES.replace_all(raw, "");
    unquoted
        .split_whitespace()
        .take(2)
        .map(title_case)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Normalize a model answer and prefer the configured spelling
pub fn match_label(raw: &str, categories: &CategorySet) -> Result<String, BackendError> {
    let normalized = normalize_label(raw);
    if normalized.is_empty() {
        return Err(BackendError::Malformed(format!("no label in answer {:?}", raw)));
    }
    Ok(categories
        .find(&normalized)
        .map(str::to_string)
        .unwrap_or(normalized))
}
