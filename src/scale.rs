//! Preview zoom control.

use imgpost_ui::EventKind;

use crate::config::ScaleConfig;
use crate::node::{FormListeners, FormScope, Handler, Node};
use crate::surface::Surface;

/// Direction of one zoom step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleStep {
    Smaller,
    Bigger,
}

/// Zoom panel collaborator of the upload form.
pub trait ScalePanel {
    /// Attach the panel's own controls and start at the default zoom.
    fn activate(&mut self, listeners: &FormListeners, surface: &mut dyn Surface);

    /// Detach the controls and reset the zoom.
    fn deactivate(&mut self, surface: &mut dyn Surface);

    /// Move one step. Returns false if the step would leave the range.
    fn step(&mut self, step: ScaleStep, surface: &mut dyn Surface) -> bool;

    /// Current zoom in percent.
    fn percent(&self) -> u32;
}

/// Stepwise zoom between `min` and `max` percent.
#[derive(Debug)]
pub struct ZoomScale {
    config: ScaleConfig,
    percent: u32,
    scope: Option<FormScope>,
}

impl ZoomScale {
    pub fn new(config: ScaleConfig) -> Self {
        Self {
            config,
            percent: config.default,
            scope: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.scope.is_some()
    }

    /// Value after one step, or None if it falls outside the range.
    fn stepped(&self, step: ScaleStep) -> Option<u32> {
        let next = match step {
            ScaleStep::Smaller => self.percent.checked_sub(self.config.step)?,
            ScaleStep::Bigger => self.percent.checked_add(self.config.step)?,
        };
        (self.config.min..=self.config.max)
            .contains(&next)
            .then_some(next)
    }

    fn apply(&mut self, percent: u32, surface: &mut dyn Surface) {
        self.percent = percent;
        surface.set_scale(percent);
    }
}

impl Default for ZoomScale {
    fn default() -> Self {
        Self::new(ScaleConfig::default())
    }
}

impl ScalePanel for ZoomScale {
    fn activate(&mut self, listeners: &FormListeners, surface: &mut dyn Surface) {
        // Re-activation replaces the old scope, detaching its listeners first
        self.scope = None;

        let mut scope = listeners.scope();
        scope.listen(Node::ScaleSmaller, EventKind::Click, Handler::ScaleSmaller);
        scope.listen(Node::ScaleBigger, EventKind::Click, Handler::ScaleBigger);
        self.scope = Some(scope);

        self.apply(self.config.default, surface);
    }

    fn deactivate(&mut self, surface: &mut dyn Surface) {
        self.scope = None;
        self.apply(self.config.default, surface);
    }

    fn step(&mut self, step: ScaleStep, surface: &mut dyn Surface) -> bool {
        match self.stepped(step) {
            Some(next) => {
                log::debug!("Scale {:?}: {}% -> {}%", step, self.percent, next);
                self.apply(next, surface);
                true
            }
            None => false,
        }
    }

    fn percent(&self) -> u32 {
        self.percent
    }
}
