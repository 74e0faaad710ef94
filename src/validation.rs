//! Hashtag and description validation.
//!
//! Both rules are pure functions of the raw field text. [`FormValidator`]
//! runs them together and collects a message per failing field.

use std::collections::{BTreeMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;

use crate::config::{Messages, ValidationLimits};
use crate::constants::{MAX_COMMENT_LENGTH, MAX_HASHTAG_COUNT, MAX_HASHTAG_LENGTH};
use crate::form::Field;

/// `#` followed by Latin or Cyrillic letters. Length is checked separately.
static HASHTAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#[a-zA-Zа-яА-ЯёЁ]+$").unwrap());

/// Limits for the hashtag field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashtagRule {
    /// Longest token, counting the `#`.
    pub max_length: usize,
    /// Most tokens allowed.
    pub max_count: usize,
}

impl Default for HashtagRule {
    fn default() -> Self {
        Self {
            max_length: MAX_HASHTAG_LENGTH,
            max_count: MAX_HASHTAG_COUNT,
        }
    }
}

impl HashtagRule {
    /// Check a raw hashtag field.
    ///
    /// A blank field is valid: hashtags are optional. Otherwise the text is
    /// split on single spaces, so doubled or trailing spaces produce an empty
    /// token and fail the whole field.
    pub fn check(&self, raw: &str) -> bool {
        if raw.trim().is_empty() {
            return true;
        }

        let tags: Vec<String> = raw.split(' ').map(str::to_lowercase).collect();
        if tags.len() > self.max_count {
            return false;
        }
        if !tags.iter().all(|tag| self.is_well_formed(tag)) {
            return false;
        }

        let unique: HashSet<&str> = tags.iter().map(String::as_str).collect();
        unique.len() == tags.len()
    }

    fn is_well_formed(&self, tag: &str) -> bool {
        tag.chars().count() <= self.max_length && HASHTAG_RE.is_match(tag)
    }
}

/// True if `raw` is an acceptable hashtag field under the default limits.
pub fn is_valid_hashtags(raw: &str) -> bool {
    HashtagRule::default().check(raw)
}

/// True if `raw` is at most 140 characters long.
pub fn is_valid_comment(raw: &str) -> bool {
    comment_within(raw, MAX_COMMENT_LENGTH)
}

fn comment_within(raw: &str, max_length: usize) -> bool {
    raw.chars().count() <= max_length
}

/// Outcome of validating the whole form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    errors: BTreeMap<Field, String>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Error text for a field, if it failed.
    pub fn error(&self, field: Field) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    /// Fields that failed, in display order.
    pub fn failed_fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.errors.keys().copied()
    }

    fn reject(&mut self, field: Field, message: &str) {
        self.errors.insert(field, message.to_string());
    }
}

/// Runs both field rules and attaches the configured messages.
#[derive(Debug, Clone)]
pub struct FormValidator {
    hashtags: HashtagRule,
    max_comment_length: usize,
    bad_hashtag: String,
    bad_comment: String,
}

impl FormValidator {
    pub fn new(limits: &ValidationLimits, messages: &Messages) -> Self {
        Self {
            hashtags: HashtagRule {
                max_length: limits.max_hashtag_length,
                max_count: limits.max_hashtag_count,
            },
            max_comment_length: limits.max_comment_length,
            bad_hashtag: messages.bad_hashtag.clone(),
            bad_comment: messages.bad_comment.clone(),
        }
    }

    pub fn validate(&self, hashtags: &str, comment: &str) -> ValidationResult {
        let mut result = ValidationResult::default();
        if !self.hashtags.check(hashtags) {
            result.reject(Field::Hashtags, &self.bad_hashtag);
        }
        if !comment_within(comment, self.max_comment_length) {
            result.reject(Field::Comment, &self.bad_comment);
        }
        result
    }
}

impl Default for FormValidator {
    fn default() -> Self {
        Self::new(&ValidationLimits::default(), &Messages::default())
    }
}
