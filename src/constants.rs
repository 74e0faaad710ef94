//! Global constants for the upload form

/// Longest hashtag including the leading `#`.
pub const MAX_HASHTAG_LENGTH: usize = 20;

/// Most hashtags allowed on one post.
pub const MAX_HASHTAG_COUNT: usize = 5;

/// Longest description, in characters.
pub const MAX_COMMENT_LENGTH: usize = 140;

/// Preview zoom, in percent.
pub mod scale {
    pub const MIN: u32 = 25;
    pub const MAX: u32 = 100;
    pub const STEP: u32 = 25;
    pub const DEFAULT: u32 = 100;
}

/// Default user-facing strings.
pub mod text {
    pub const BAD_HASHTAG: &str =
        "Уникальные хештеги, каждый не более 20 символов, должны быть разделены пробелом";
    pub const BAD_COMMENT: &str = "Комментарий не более 140 символов";
    pub const SUBMIT_IDLE: &str = "Опубликовать";
    pub const SUBMIT_SENDING: &str = "Сохраняю...";
}

/// File extensions the upload input accepts.
pub const IMAGE_EXTENSIONS: &[&str] = &["gif", "jpg", "jpeg", "png", "webp"];

/// Number of effect thumbnails that mirror the preview image.
pub const EFFECT_THUMBNAIL_COUNT: usize = 6;

/// Default submission endpoint, relative to the page.
pub const DEFAULT_ENDPOINT: &str = "/upload";
