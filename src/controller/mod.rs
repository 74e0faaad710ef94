//! Upload form lifecycle: open, validate, submit, close.
//!
//! [`UploadForm`] owns the overlay state and reacts to routed events. Every
//! listener it attaches when opening lives in the session's scope, so
//! closing (by cancel, escape or a settled submission) drops the scope and
//! detaches exactly what was attached.
//!
//! Submission is split in two so the host stays responsive while the
//! transport runs: [`UploadForm::submit`] validates and hands back a
//! [`PendingSubmission`]; the host awaits it and passes the [`Settled`]
//! result to [`UploadForm::settle`].

use std::fmt;
use std::rc::Rc;

use imgpost_ui::{Event, EventKind};
use thiserror::Error;

use crate::config::{FormConfig, Messages};
use crate::effects::{EffectsPanel, FilterEffects};
use crate::form::{Field, FormData, FormState, SelectedFile, SubmitButton};
use crate::node::{FormListeners, FormScope, Handler, Node};
use crate::notify::Notifier;
use crate::scale::{ScalePanel, ScaleStep, ZoomScale};
use crate::surface::Surface;
use crate::transport::{SendFuture, Transport, TransportError};
use crate::validation::{FormValidator, ValidationResult};

#[cfg(test)]
mod tests;

/// Collaborators injected into the form.
pub struct Collaborators {
    pub scale: Box<dyn ScalePanel>,
    pub effects: Box<dyn EffectsPanel>,
    pub transport: Rc<dyn Transport>,
    pub notifier: Box<dyn Notifier>,
}

impl Collaborators {
    /// Stock zoom and filter panels with the given transport and notifier.
    pub fn new(
        config: &FormConfig,
        transport: Rc<dyn Transport>,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        Self {
            scale: Box::new(ZoomScale::new(config.scale)),
            effects: Box::new(FilterEffects::new()),
            transport,
            notifier,
        }
    }
}

/// Why a chosen file did not open the form.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OpenError {
    #[error("No file selected")]
    NoFile,

    #[error("Unsupported file type: {name}")]
    UnsupportedFile { name: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SubmissionId {
    session: u64,
    serial: u64,
}

/// A submission whose transport call has not finished.
pub struct PendingSubmission {
    id: SubmissionId,
    future: SendFuture,
}

impl PendingSubmission {
    /// Wait for the transport. The result must be passed to
    /// [`UploadForm::settle`].
    pub async fn outcome(self) -> Settled {
        let result = self.future.await;
        Settled {
            id: self.id,
            result,
        }
    }
}

impl fmt::Debug for PendingSubmission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingSubmission")
            .field("id", &self.id)
            .finish()
    }
}

/// Transport result for one submission.
#[derive(Debug)]
pub struct Settled {
    id: SubmissionId,
    result: Result<(), TransportError>,
}

impl Settled {
    pub fn result(&self) -> &Result<(), TransportError> {
        &self.result
    }
}

/// What a submit request led to.
#[derive(Debug)]
pub enum SubmitOutcome {
    /// The form is closed or a submission is already in flight.
    Ignored,
    /// Validation failed; errors are shown and the form stays open.
    Invalid(ValidationResult),
    /// The transport was called.
    Sending(PendingSubmission),
}

struct Session {
    id: u64,
    file: SelectedFile,
    _listeners: FormScope,
}

/// The upload overlay controller.
pub struct UploadForm<S: Surface> {
    surface: S,
    validator: FormValidator,
    messages: Messages,
    accepted_extensions: Vec<String>,
    listeners: FormListeners,
    scale: Box<dyn ScalePanel>,
    effects: Box<dyn EffectsPanel>,
    transport: Rc<dyn Transport>,
    notifier: Box<dyn Notifier>,
    state: FormState,
    session: Option<Session>,
    in_flight: Option<SubmissionId>,
    sessions_opened: u64,
    submissions_sent: u64,
    _mount: FormScope,
}

impl<S: Surface> UploadForm<S> {
    /// Mount the form: listen for file selection and put the effects panel
    /// in its default state.
    pub fn new(surface: S, config: &FormConfig, collaborators: Collaborators) -> Self {
        let listeners = FormListeners::new();
        let mut mount = listeners.scope();
        mount.listen(Node::UploadInput, EventKind::Change, Handler::UploadChange);

        let Collaborators {
            scale,
            effects,
            transport,
            notifier,
        } = collaborators;

        let mut form = Self {
            surface,
            validator: FormValidator::new(&config.limits, &config.messages),
            messages: config.messages.clone(),
            accepted_extensions: config.accepted_extensions.clone(),
            listeners,
            scale,
            effects,
            transport,
            notifier,
            state: FormState::Closed,
            session: None,
            in_flight: None,
            sessions_opened: 0,
            submissions_sent: 0,
            _mount: mount,
        };
        form.effects.reset(&mut form.surface);
        let idle = form.idle_button();
        form.surface.set_submit_button(&idle);
        form
    }

    pub fn state(&self) -> FormState {
        self.state
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn listeners(&self) -> &FormListeners {
        &self.listeners
    }

    /// True while a transport call has not been settled.
    pub fn has_submission_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Route an event to the listeners currently attached.
    ///
    /// Returns the pending submission if the event submitted the form.
    pub fn dispatch(&mut self, event: &mut Event<Node>) -> Option<PendingSubmission> {
        let route = self.listeners.route(event);
        let mut pending = None;
        let mut stopped_at: Option<Node> = None;

        for (node, id, handler) in route {
            if stopped_at.is_some_and(|stop| stop != node) {
                break;
            }
            // An earlier handler may have closed the form
            if !self.listeners.is_attached(id) {
                continue;
            }
            if let Some(submission) = self.run(handler, event) {
                pending = Some(submission);
            }
            if stopped_at.is_none() && event.is_propagation_stopped() {
                stopped_at = Some(node);
            }
        }
        pending
    }

    fn run(&mut self, handler: Handler, event: &mut Event<Node>) -> Option<PendingSubmission> {
        match handler {
            Handler::UploadChange => {
                if let Err(e) = self.open() {
                    log::warn!("Upload ignored: {}", e);
                }
            }
            Handler::FormSubmit => {
                event.prevent_default();
                if let SubmitOutcome::Sending(pending) = self.submit() {
                    return Some(pending);
                }
            }
            Handler::CancelClick => self.cancel(),
            Handler::EscapeKeydown => {
                if event.is_escape() {
                    self.cancel();
                }
            }
            Handler::HashtagsKeydown | Handler::CommentKeydown => {
                if event.is_escape() {
                    event.stop_propagation();
                }
            }
            Handler::EffectChange => match event.value() {
                Some(name) => {
                    self.effects.select(name, &mut self.surface);
                }
                None => log::warn!("Effect change without a value"),
            },
            Handler::EffectLevelInput => {
                match event.value().and_then(|v| v.trim().parse::<f32>().ok()) {
                    Some(level) => self.effects.set_level(level, &mut self.surface),
                    None => log::warn!("Unreadable effect level {:?}", event.value()),
                }
            }
            Handler::ScaleSmaller => {
                self.scale.step(ScaleStep::Smaller, &mut self.surface);
            }
            Handler::ScaleBigger => {
                self.scale.step(ScaleStep::Bigger, &mut self.surface);
            }
        }
        None
    }

    /// Open the overlay for the file in the upload input.
    ///
    /// Choosing another file while open only swaps the preview.
    pub fn open(&mut self) -> Result<(), OpenError> {
        if self.state == FormState::Submitting {
            log::debug!("File change ignored while submitting");
            return Ok(());
        }

        let file = self.surface.selected_file().ok_or(OpenError::NoFile)?;
        if !file.has_extension_in(&self.accepted_extensions) {
            return Err(OpenError::UnsupportedFile { name: file.name });
        }

        let url = self.surface.object_url();
        self.surface.set_preview(&url);

        if let Some(session) = &mut self.session {
            log::debug!("Preview replaced with {}", file.name);
            session.file = file;
            return Ok(());
        }

        self.surface.set_overlay_visible(true);
        self.surface.set_scroll_locked(true);

        let mut scope = self.listeners.scope();
        scope.listen(Node::Form, EventKind::Submit, Handler::FormSubmit);
        scope.listen(Node::CancelButton, EventKind::Click, Handler::CancelClick);
        scope.listen(Node::Document, EventKind::KeyDown, Handler::EscapeKeydown);
        scope.listen(Node::HashtagInput, EventKind::KeyDown, Handler::HashtagsKeydown);
        scope.listen(Node::CommentInput, EventKind::KeyDown, Handler::CommentKeydown);
        scope.listen(Node::EffectsList, EventKind::Change, Handler::EffectChange);
        self.scale.activate(&self.listeners, &mut self.surface);
        self.effects.activate(&self.listeners, &mut self.surface);

        // The previous session's submission still holds the lock
        if self.in_flight.is_some() {
            let sending = self.sending_button();
            self.surface.set_submit_button(&sending);
        }

        self.sessions_opened += 1;
        log::debug!("Form opened for {} (session {})", file.name, self.sessions_opened);
        self.session = Some(Session {
            id: self.sessions_opened,
            file,
            _listeners: scope,
        });
        self.state = FormState::Open;
        Ok(())
    }

    /// Validate and, if valid, start the transport call.
    pub fn submit(&mut self) -> SubmitOutcome {
        let Some(session) = &self.session else {
            return SubmitOutcome::Ignored;
        };
        if self.state != FormState::Open || self.in_flight.is_some() {
            log::debug!("Submit ignored: submission already in flight");
            return SubmitOutcome::Ignored;
        }
        let session_id = session.id;
        let file = session.file.clone();

        let hashtags = self.surface.field_value(Field::Hashtags);
        let description = self.surface.field_value(Field::Comment);
        let result = self.validator.validate(&hashtags, &description);
        for field in Field::ALL {
            self.surface.set_field_error(field, result.error(field));
        }
        if !result.is_valid() {
            log::debug!(
                "Submit blocked by invalid fields: {:?}",
                result.failed_fields().collect::<Vec<_>>()
            );
            return SubmitOutcome::Invalid(result);
        }

        let data = FormData {
            file,
            scale: format!("{}%", self.scale.percent()),
            effect: self.effects.effect_name().to_string(),
            effect_level: self.effects.level_text(),
            hashtags,
            description,
        };

        self.submissions_sent += 1;
        let id = SubmissionId {
            session: session_id,
            serial: self.submissions_sent,
        };
        self.in_flight = Some(id);
        self.state = FormState::Submitting;
        let sending = self.sending_button();
        self.surface.set_submit_button(&sending);
        log::info!("Submitting {} (submission {})", data.file.name, id.serial);

        SubmitOutcome::Sending(PendingSubmission {
            id,
            future: self.transport.send(data),
        })
    }

    /// Finish a submission: notify, release the submit control and close.
    ///
    /// If the form was closed while the call was running, only the
    /// notification and the lock release happen; a newer session is left
    /// untouched.
    pub fn settle(&mut self, settled: Settled) {
        let Settled { id, result } = settled;
        if self.in_flight != Some(id) {
            log::warn!("Ignoring settlement of unknown submission {}", id.serial);
            return;
        }
        self.in_flight = None;

        let current = self
            .session
            .as_ref()
            .is_some_and(|session| session.id == id.session);

        match &result {
            Ok(()) => {
                log::info!("Submission {} published", id.serial);
                self.notifier.show_success();
                if current {
                    self.surface.reset_fields();
                }
            }
            Err(error) => {
                log::warn!("Submission {} failed: {}", id.serial, error);
                self.notifier.show_error(error);
            }
        }

        let idle = self.idle_button();
        self.surface.set_submit_button(&idle);
        if current {
            self.close();
        } else {
            log::debug!("Submission {} settled after its form closed", id.serial);
        }
    }

    /// Reset every field, then close. Used by the cancel button and escape.
    pub fn cancel(&mut self) {
        if self.session.is_none() {
            return;
        }
        self.surface.reset_fields();
        self.close();
    }

    /// Hide the overlay and detach everything attached on open.
    /// Closing a closed form does nothing.
    pub fn close(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };
        self.surface.set_overlay_visible(false);
        self.surface.set_scroll_locked(false);
        drop(session);

        self.scale.deactivate(&mut self.surface);
        self.effects.reset(&mut self.surface);
        for field in Field::ALL {
            self.surface.set_field_error(field, None);
        }
        let idle = self.idle_button();
        self.surface.set_submit_button(&idle);
        self.state = FormState::Closed;
        log::debug!(
            "Form closed, {} listener(s) remain",
            self.listeners.active_count()
        );
    }

    fn idle_button(&self) -> SubmitButton {
        SubmitButton::idle(&self.messages.submit_idle)
    }

    fn sending_button(&self) -> SubmitButton {
        SubmitButton::sending(&self.messages.submit_sending)
    }
}
