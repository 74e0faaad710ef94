//! imgpost - image upload form
//!
//! The upload overlay of a photo-sharing page: hashtag and comment
//! validation, the open / submit / close lifecycle with its submit-button
//! states, and the zoom and filter panels shown next to the preview.
//!
//! The controller drives a [`Surface`] and is fed routed [`Event`]s, so the
//! same code runs against the browser DOM (`wasm32` builds) and against
//! [`MemorySurface`] in tests.
//!
//! [`Event`]: imgpost_ui::Event

pub mod config;
pub mod constants;
pub mod controller;
pub mod effects;
pub mod form;
pub mod node;
pub mod notify;
pub mod scale;
pub mod surface;
pub mod transport;
pub mod validation;

pub use config::{ConfigError, FormConfig};
pub use controller::{
    Collaborators, OpenError, PendingSubmission, Settled, SubmitOutcome, UploadForm,
};
pub use effects::{Effect, EffectsPanel, FilterEffects};
pub use form::{Field, FormData, FormState, SelectedFile, SubmitButton};
pub use node::{Handler, Node};
pub use notify::{LogNotifier, Notifier};
pub use scale::{ScalePanel, ScaleStep, ZoomScale};
pub use surface::{MemorySurface, Surface};
pub use transport::{SendFuture, Transport, TransportError};
pub use validation::{is_valid_comment, is_valid_hashtags, FormValidator, ValidationResult};

// WASM entry point
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::*;
