//! Presentational host the form drives.
//!
//! The controller never touches the DOM directly; it asks a [`Surface`] to
//! show the overlay, write the submit label and so on. The browser build
//! implements it over `web_sys`, tests and headless hosts use
//! [`MemorySurface`].

use std::collections::BTreeMap;

use crate::constants::{EFFECT_THUMBNAIL_COUNT, text};
use crate::effects::{Effect, SliderRange};
use crate::form::{Field, SelectedFile, SubmitButton};

pub trait Surface {
    /// File currently chosen in the upload input.
    fn selected_file(&self) -> Option<SelectedFile>;

    /// Local URL the preview can load the chosen file from. Empty if no
    /// file is chosen.
    fn object_url(&mut self) -> String;

    /// Show `url` in the main preview and every effect thumbnail.
    fn set_preview(&mut self, url: &str);

    fn set_overlay_visible(&mut self, visible: bool);

    /// Lock or release page scrolling behind the overlay.
    fn set_scroll_locked(&mut self, locked: bool);

    fn field_value(&self, field: Field) -> String;

    /// Show or clear the inline error next to a field.
    fn set_field_error(&mut self, field: Field, message: Option<&str>);

    /// Restore every form control to its initial value.
    fn reset_fields(&mut self);

    fn set_submit_button(&mut self, button: &SubmitButton);

    /// Write the zoom value and apply it to the preview.
    fn set_scale(&mut self, percent: u32);

    /// Show the intensity slider with a range, or hide it.
    fn set_effect_slider(&mut self, range: Option<SliderRange>, value: f32);

    /// Write the hidden effect level input.
    fn set_effect_level(&mut self, level: &str);

    /// Apply a CSS filter to the preview, or clear it.
    fn set_preview_filter(&mut self, filter: Option<&str>);

    /// Mark the effect as the checked choice in the effects list.
    fn set_effect_choice(&mut self, effect: Effect);
}

/// Deterministic in-memory surface.
///
/// Records everything the controller writes and lets a driver type into
/// fields and choose files the way a user would.
#[derive(Debug, Clone)]
pub struct MemorySurface {
    file: Option<SelectedFile>,
    urls_issued: usize,
    preview: Option<String>,
    thumbnails: Vec<Option<String>>,
    overlay_visible: bool,
    scroll_locked: bool,
    values: BTreeMap<Field, String>,
    errors: BTreeMap<Field, String>,
    submit: SubmitButton,
    scale_percent: u32,
    slider: Option<SliderRange>,
    slider_value: f32,
    effect_level: String,
    filter: Option<String>,
    effect_choice: Effect,
}

impl Default for MemorySurface {
    fn default() -> Self {
        Self {
            file: None,
            urls_issued: 0,
            preview: None,
            thumbnails: vec![None; EFFECT_THUMBNAIL_COUNT],
            overlay_visible: false,
            scroll_locked: false,
            values: BTreeMap::new(),
            errors: BTreeMap::new(),
            submit: SubmitButton::idle(text::SUBMIT_IDLE),
            scale_percent: crate::constants::scale::DEFAULT,
            slider: None,
            slider_value: 0.0,
            effect_level: String::new(),
            filter: None,
            effect_choice: Effect::None,
        }
    }
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pick a file in the upload input.
    pub fn choose_file(&mut self, file: SelectedFile) {
        self.file = Some(file);
    }

    /// Replace the text of a field.
    pub fn type_into(&mut self, field: Field, text: &str) {
        self.values.insert(field, text.to_string());
    }

    pub fn preview(&self) -> Option<&str> {
        self.preview.as_deref()
    }

    pub fn thumbnails(&self) -> &[Option<String>] {
        &self.thumbnails
    }

    pub fn overlay_visible(&self) -> bool {
        self.overlay_visible
    }

    pub fn scroll_locked(&self) -> bool {
        self.scroll_locked
    }

    pub fn field_error(&self, field: Field) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    pub fn submit_button(&self) -> &SubmitButton {
        &self.submit
    }

    pub fn scale_percent(&self) -> u32 {
        self.scale_percent
    }

    /// The zoom input as the page shows it, e.g. `"75%"`.
    pub fn scale_text(&self) -> String {
        format!("{}%", self.scale_percent)
    }

    /// The preview transform, e.g. `"scale(0.75)"`.
    pub fn preview_transform(&self) -> String {
        format!("scale({})", self.scale_percent as f32 / 100.0)
    }

    pub fn effect_slider(&self) -> Option<SliderRange> {
        self.slider
    }

    pub fn slider_value(&self) -> f32 {
        self.slider_value
    }

    pub fn effect_level(&self) -> &str {
        &self.effect_level
    }

    pub fn preview_filter(&self) -> Option<&str> {
        self.filter.as_deref()
    }

    /// Effect whose radio button is checked.
    pub fn effect_choice(&self) -> Effect {
        self.effect_choice
    }
}

impl Surface for MemorySurface {
    fn selected_file(&self) -> Option<SelectedFile> {
        self.file.clone()
    }

    fn object_url(&mut self) -> String {
        let Some(file) = &self.file else {
            return String::new();
        };
        self.urls_issued += 1;
        format!("blob:memory/{}/{}", self.urls_issued, file.name)
    }

    fn set_preview(&mut self, url: &str) {
        self.preview = Some(url.to_string());
        for thumbnail in &mut self.thumbnails {
            *thumbnail = Some(url.to_string());
        }
    }

    fn set_overlay_visible(&mut self, visible: bool) {
        self.overlay_visible = visible;
    }

    fn set_scroll_locked(&mut self, locked: bool) {
        self.scroll_locked = locked;
    }

    fn field_value(&self, field: Field) -> String {
        self.values.get(&field).cloned().unwrap_or_default()
    }

    fn set_field_error(&mut self, field: Field, message: Option<&str>) {
        match message {
            Some(message) => {
                self.errors.insert(field, message.to_string());
            }
            None => {
                self.errors.remove(&field);
            }
        }
    }

    fn reset_fields(&mut self) {
        self.values.clear();
        self.file = None;
        self.scale_percent = crate::constants::scale::DEFAULT;
        self.effect_level.clear();
        self.effect_choice = Effect::None;
    }

    fn set_submit_button(&mut self, button: &SubmitButton) {
        self.submit = button.clone();
    }

    fn set_scale(&mut self, percent: u32) {
        self.scale_percent = percent;
    }

    fn set_effect_slider(&mut self, range: Option<SliderRange>, value: f32) {
        self.slider = range;
        self.slider_value = value;
    }

    fn set_effect_level(&mut self, level: &str) {
        self.effect_level = level.to_string();
    }

    fn set_preview_filter(&mut self, filter: Option<&str>) {
        self.filter = filter.map(str::to_string);
    }

    fn set_effect_choice(&mut self, effect: Effect) {
        self.effect_choice = effect;
    }
}
