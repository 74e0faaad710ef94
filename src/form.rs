//! Form data model: fields, lifecycle state and the submission payload.

/// Text fields that are validated before submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Hashtags,
    Comment,
}

impl Field {
    pub const ALL: [Field; 2] = [Field::Hashtags, Field::Comment];

    /// Name of the field in the submitted form.
    pub fn name(&self) -> &'static str {
        match self {
            Field::Hashtags => "hashtags",
            Field::Comment => "description",
        }
    }
}

/// Lifecycle of the upload overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormState {
    /// Overlay hidden, no listeners beyond the upload input.
    #[default]
    Closed,
    /// Overlay visible and editable.
    Open,
    /// Overlay visible, submission in flight.
    Submitting,
}

impl FormState {
    /// True while the overlay is on screen.
    pub fn is_visible(&self) -> bool {
        !matches!(self, FormState::Closed)
    }
}

/// The file picked in the upload input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub mime: String,
    pub size: u64,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            size,
        }
    }

    /// Lower-cased extension after the last dot, if any.
    pub fn extension(&self) -> Option<String> {
        let (stem, ext) = self.name.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            return None;
        }
        Some(ext.to_lowercase())
    }

    /// Check the extension against an allow-list (case-insensitive).
    pub fn has_extension_in(&self, accepted: &[String]) -> bool {
        match self.extension() {
            Some(ext) => accepted.iter().any(|a| a.eq_ignore_ascii_case(&ext)),
            None => false,
        }
    }
}

/// Snapshot of the form handed to the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct FormData {
    pub file: SelectedFile,
    /// Preview zoom, e.g. `"75%"`.
    pub scale: String,
    /// Effect name, `"none"` when no filter is applied.
    pub effect: String,
    /// Effect intensity as shown in the hidden level input; empty for none.
    pub effect_level: String,
    pub hashtags: String,
    pub description: String,
}

impl FormData {
    /// Name/value pairs in form order, as a multipart body would carry them.
    pub fn text_fields(&self) -> [(&'static str, &str); 5] {
        [
            ("scale", self.scale.as_str()),
            ("effect", self.effect.as_str()),
            ("effect-level", self.effect_level.as_str()),
            (Field::Hashtags.name(), self.hashtags.as_str()),
            (Field::Comment.name(), self.description.as_str()),
        ]
    }
}

/// Visible state of the submit control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitButton {
    pub disabled: bool,
    pub label: String,
}

impl SubmitButton {
    pub fn idle(label: &str) -> Self {
        Self {
            disabled: false,
            label: label.to_string(),
        }
    }

    pub fn sending(label: &str) -> Self {
        Self {
            disabled: true,
            label: label.to_string(),
        }
    }
}
