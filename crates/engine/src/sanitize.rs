//! Cleaning of field text and assembled scripts.
//!
//! Strict cleaning is applied to storyboard field text and narrated scenes;
//! it also drops fragments that are known leftovers of pronoun substitution
//! (see [`crate::person`]). Basic cleaning only normalizes whitespace.

use serde::{Deserialize, Serialize};

const MIN_LEN: usize = 2;

const DEFAULT_DENY: &[&str] = &["ti", "t i", "tmy", "ti a story", "tmy is"];
const DEFAULT_ALLOW: &[&str] = &["this", "that", "these", "those", "their", "there"];

/// Exact-match table of substitution artifacts. Entries are compared
/// case-insensitively against the whole cleaned fragment; the allow list wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactFilter {
    pub deny: Vec<String>,
    pub allow: Vec<String>,
}

impl Default for ArtifactFilter {
    fn default() -> Self {
        ArtifactFilter {
            deny: DEFAULT_DENY.iter().map(|s| s.to_string()).collect(),
            allow: DEFAULT_ALLOW.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl ArtifactFilter {
    pub fn with_deny(mut self, entry: impl Into<String>) -> Self {
        self.deny.push(entry.into().to_lowercase());
        self
    }

    pub fn with_allow(mut self, entry: impl Into<String>) -> Self {
        self.allow.push(entry.into().to_lowercase());
        self
    }

    pub fn is_artifact(&self, text: &str) -> bool {
        let key = text.trim().to_lowercase();
        if self.allow.iter().any(|a| *a == key) {
            return false;
        }
        self.deny.iter().any(|d| *d == key)
    }

    /// Strict cleaning against this table. Returns an empty string when the
    /// fragment should be dropped.
    pub fn clean(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        for ch in text.chars() {
            match ch {
                '*' | '_' | '`' | '#' | '~' => {}
                '"' | '“' | '”' | '„' | '‘' | '’' | '«' | '»' => {}
                '[' | ']' | '(' | ')' | '{' | '}' | '<' | '>' => {}
                '•' | '·' | '◦' | '▪' => {}
                '-' | '–' | '—' | '―' | '‒' => out.push(' '),
                c if c.is_alphanumeric() || c.is_whitespace() => out.push(c),
                '\'' | '.' | ',' | '!' | '?' => out.push(ch),
                _ => out.push(' '),
            }
        }

        let cleaned = collapse_whitespace(&out);
        if cleaned.chars().count() < MIN_LEN || self.is_artifact(&cleaned) {
            return String::new();
        }
        cleaned
    }
}

/// Strict cleaning with the default artifact table.
pub fn clean_strict(text: &str) -> String {
    ArtifactFilter::default().clean(text)
}

/// Whitespace normalization only. Empty when fewer than two characters remain.
pub fn clean_basic(text: &str) -> String {
    let cleaned = collapse_whitespace(text);
    if cleaned.chars().count() < MIN_LEN {
        return String::new();
    }
    cleaned
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
