//! Preview filter effects and their intensity slider.
//!
//! Each named effect maps to one CSS filter function with its own slider
//! range. Picking an effect resets the slider to the strongest setting.

use std::fmt;

use imgpost_ui::EventKind;

use crate::node::{FormListeners, FormScope, Handler, Node};
use crate::surface::Surface;

/// Slider bounds and granularity for one effect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliderRange {
    pub min: f32,
    pub max: f32,
    pub step: f32,
}

impl SliderRange {
    pub const fn new(min: f32, max: f32, step: f32) -> Self {
        Self { min, max, step }
    }

    /// Clamp into the range and snap to the nearest step.
    pub fn snap(&self, value: f32) -> f32 {
        let clamped = if value.is_nan() {
            self.max
        } else {
            value.clamp(self.min, self.max)
        };
        if self.step <= 0.0 {
            return clamped;
        }
        let steps = ((clamped - self.min) / self.step).round();
        // Round away float noise so 0.1 * 3 prints as 0.3
        let snapped = ((self.min + steps * self.step) * 1000.0).round() / 1000.0;
        snapped.min(self.max)
    }
}

/// Format a slider value the way the level input shows it:
/// whole numbers without decimals, everything else with one.
pub fn format_level(value: f32) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.1}", value)
    }
}

/// Visual filters offered by the effects list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Effect {
    #[default]
    None,
    Chrome,
    Sepia,
    Marvin,
    Phobos,
    Heat,
}

impl Effect {
    pub const ALL: [Effect; 6] = [
        Effect::None,
        Effect::Chrome,
        Effect::Sepia,
        Effect::Marvin,
        Effect::Phobos,
        Effect::Heat,
    ];

    /// Value of the effect's radio button.
    pub fn name(&self) -> &'static str {
        match self {
            Effect::None => "none",
            Effect::Chrome => "chrome",
            Effect::Sepia => "sepia",
            Effect::Marvin => "marvin",
            Effect::Phobos => "phobos",
            Effect::Heat => "heat",
        }
    }

    pub fn from_name(name: &str) -> Option<Effect> {
        Effect::ALL.into_iter().find(|effect| effect.name() == name)
    }

    /// CSS filter function, or None for the unfiltered image.
    pub fn filter_function(&self) -> Option<&'static str> {
        match self {
            Effect::None => None,
            Effect::Chrome => Some("grayscale"),
            Effect::Sepia => Some("sepia"),
            Effect::Marvin => Some("invert"),
            Effect::Phobos => Some("blur"),
            Effect::Heat => Some("brightness"),
        }
    }

    pub fn range(&self) -> Option<SliderRange> {
        match self {
            Effect::None => None,
            Effect::Chrome | Effect::Sepia => Some(SliderRange::new(0.0, 1.0, 0.1)),
            Effect::Marvin => Some(SliderRange::new(0.0, 100.0, 1.0)),
            Effect::Phobos => Some(SliderRange::new(0.0, 3.0, 0.1)),
            Effect::Heat => Some(SliderRange::new(1.0, 3.0, 0.1)),
        }
    }

    fn unit(&self) -> &'static str {
        match self {
            Effect::Marvin => "%",
            Effect::Phobos => "px",
            _ => "",
        }
    }

    /// CSS filter value at the given level, e.g. `blur(1.5px)`.
    pub fn css(&self, level: f32) -> Option<String> {
        let function = self.filter_function()?;
        Some(format!("{}({}{})", function, format_level(level), self.unit()))
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Effects panel collaborator of the upload form.
pub trait EffectsPanel {
    /// Start at the unfiltered image and attach the slider listener.
    fn activate(&mut self, listeners: &FormListeners, surface: &mut dyn Surface);

    /// Restore the unfiltered image and detach the slider listener.
    fn reset(&mut self, surface: &mut dyn Surface);

    /// Switch to the effect with this radio value. Returns false for
    /// unknown names.
    fn select(&mut self, name: &str, surface: &mut dyn Surface) -> bool;

    /// Move the slider. Ignored while no effect is selected.
    fn set_level(&mut self, level: f32, surface: &mut dyn Surface);

    /// Radio value of the current effect.
    fn effect_name(&self) -> &'static str;

    /// Level as written to the hidden input; empty without an effect.
    fn level_text(&self) -> String;
}

/// CSS-filter based effects panel.
#[derive(Debug, Default)]
pub struct FilterEffects {
    effect: Effect,
    level: Option<f32>,
    scope: Option<FormScope>,
}

impl FilterEffects {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn effect(&self) -> Effect {
        self.effect
    }

    pub fn level(&self) -> Option<f32> {
        self.level
    }

    fn apply(&mut self, effect: Effect, surface: &mut dyn Surface) {
        self.effect = effect;
        surface.set_effect_choice(effect);
        match effect.range() {
            Some(range) => {
                let level = range.max;
                self.level = Some(level);
                surface.set_effect_slider(Some(range), level);
                surface.set_effect_level(&format_level(level));
                surface.set_preview_filter(effect.css(level).as_deref());
            }
            None => {
                self.level = None;
                surface.set_effect_slider(None, 0.0);
                surface.set_effect_level("");
                surface.set_preview_filter(None);
            }
        }
    }
}

impl EffectsPanel for FilterEffects {
    fn activate(&mut self, listeners: &FormListeners, surface: &mut dyn Surface) {
        self.scope = None;

        let mut scope = listeners.scope();
        scope.listen(Node::EffectLevel, EventKind::Input, Handler::EffectLevelInput);
        self.scope = Some(scope);

        self.apply(Effect::None, surface);
    }

    fn reset(&mut self, surface: &mut dyn Surface) {
        self.scope = None;
        self.apply(Effect::None, surface);
    }

    fn select(&mut self, name: &str, surface: &mut dyn Surface) -> bool {
        match Effect::from_name(name) {
            Some(effect) => {
                log::debug!("Effect selected: {}", effect);
                self.apply(effect, surface);
                true
            }
            None => {
                log::warn!("Unknown effect '{}'", name);
                false
            }
        }
    }

    fn set_level(&mut self, level: f32, surface: &mut dyn Surface) {
        let Some(range) = self.effect.range() else {
            return;
        };
        let level = range.snap(level);
        self.level = Some(level);
        surface.set_effect_level(&format_level(level));
        surface.set_preview_filter(self.effect.css(level).as_deref());
    }

    fn effect_name(&self) -> &'static str {
        self.effect.name()
    }

    fn level_text(&self) -> String {
        self.level.map(format_level).unwrap_or_default()
    }
}
