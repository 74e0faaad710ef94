use std::cell::RefCell;
use std::rc::Rc;

use imgpost_ui::{Event, Key};

use super::*;
use crate::constants::text;
use crate::effects::Effect;
use crate::surface::MemorySurface;

// ============================================================================
// Test doubles
// ============================================================================

struct FakeTransport {
    sent: Rc<RefCell<Vec<FormData>>>,
    reply: Result<(), TransportError>,
}

impl Transport for FakeTransport {
    fn send(&self, data: FormData) -> SendFuture {
        self.sent.borrow_mut().push(data);
        let reply = self.reply.clone();
        Box::pin(async move { reply })
    }
}

#[derive(Debug, Default)]
struct Notes {
    successes: usize,
    errors: Vec<TransportError>,
}

struct RecordingNotifier(Rc<RefCell<Notes>>);

impl Notifier for RecordingNotifier {
    fn show_success(&mut self) {
        self.0.borrow_mut().successes += 1;
    }

    fn show_error(&mut self, error: &TransportError) {
        self.0.borrow_mut().errors.push(error.clone());
    }
}

struct Harness {
    form: UploadForm<MemorySurface>,
    sent: Rc<RefCell<Vec<FormData>>>,
    notes: Rc<RefCell<Notes>>,
}

/// Listeners attached while the form is closed (the upload input).
const MOUNTED: usize = 1;
/// Listeners attached while open: six form handlers, two scale buttons,
/// one effect slider.
const OPEN: usize = MOUNTED + 6 + 2 + 1;

fn harness(reply: Result<(), TransportError>) -> Harness {
    let config = FormConfig::default();
    let sent = Rc::new(RefCell::new(Vec::new()));
    let notes = Rc::new(RefCell::new(Notes::default()));
    let collaborators = Collaborators::new(
        &config,
        Rc::new(FakeTransport {
            sent: Rc::clone(&sent),
            reply,
        }),
        Box::new(RecordingNotifier(Rc::clone(&notes))),
    );
    Harness {
        form: UploadForm::new(MemorySurface::new(), &config, collaborators),
        sent,
        notes,
    }
}

impl Harness {
    fn fire(&mut self, mut event: Event<Node>) -> (Event<Node>, Option<PendingSubmission>) {
        let pending = self.form.dispatch(&mut event);
        (event, pending)
    }

    fn choose(&mut self, name: &str) {
        self.form
            .surface_mut()
            .choose_file(SelectedFile::new(name, "image/png", 2048));
        self.fire(Event::change(Node::UploadInput));
    }

    fn type_into(&mut self, field: Field, text: &str) {
        self.form.surface_mut().type_into(field, text);
    }

    fn press_escape_in(&mut self, node: Node) {
        self.fire(Event::key_down(node, Key::Escape));
    }

    /// Submit through the form and return the pending call, if any.
    fn submit(&mut self) -> Option<PendingSubmission> {
        let (event, pending) = self.fire(Event::submit(Node::Form));
        assert!(event.is_default_prevented());
        pending
    }

    fn submit_and_settle(&mut self) {
        let pending = self.submit().expect("submission should start");
        let settled = pollster::block_on(pending.outcome());
        self.form.settle(settled);
    }

    fn surface(&self) -> &MemorySurface {
        self.form.surface()
    }

    fn active_listeners(&self) -> usize {
        self.form.listeners().active_count()
    }
}

fn assert_closed_and_idle(h: &Harness) {
    assert_eq!(h.form.state(), FormState::Closed);
    assert!(!h.surface().overlay_visible());
    assert!(!h.surface().scroll_locked());
    assert_eq!(h.surface().submit_button(), &SubmitButton::idle(text::SUBMIT_IDLE));
    assert_eq!(h.active_listeners(), MOUNTED);
}

// ============================================================================
// Opening
// ============================================================================

#[test]
fn test_mounted_form_is_closed() {
    let h = harness(Ok(()));
    assert_eq!(h.form.state(), FormState::Closed);
    assert_eq!(h.active_listeners(), MOUNTED);
    assert_eq!(h.form.listeners().count_on(Node::UploadInput), 1);
    assert!(!h.surface().overlay_visible());
}

#[test]
fn test_file_selection_opens_form() {
    let mut h = harness(Ok(()));
    h.choose("sunset.png");

    assert_eq!(h.form.state(), FormState::Open);
    assert!(h.surface().overlay_visible());
    assert!(h.surface().scroll_locked());

    let preview = h.surface().preview().expect("preview set");
    assert!(preview.ends_with("sunset.png"));
    assert!(h
        .surface()
        .thumbnails()
        .iter()
        .all(|thumb| thumb.as_deref() == Some(preview)));

    assert_eq!(h.surface().scale_text(), "100%");
    assert_eq!(h.surface().preview_filter(), None);
    assert_eq!(h.active_listeners(), OPEN);
}

#[test]
fn test_change_without_file_stays_closed() {
    let mut h = harness(Ok(()));
    h.fire(Event::change(Node::UploadInput));

    assert_eq!(h.form.state(), FormState::Closed);
    assert_eq!(h.form.open(), Err(OpenError::NoFile));
    assert_eq!(h.active_listeners(), MOUNTED);
}

#[test]
fn test_non_image_file_rejected() {
    let mut h = harness(Ok(()));
    h.choose("notes.txt");

    assert_eq!(h.form.state(), FormState::Closed);
    assert!(h.surface().preview().is_none());
    assert_eq!(
        h.form.open(),
        Err(OpenError::UnsupportedFile {
            name: "notes.txt".to_string()
        })
    );
}

#[test]
fn test_second_file_while_open_swaps_preview_only() {
    let mut h = harness(Ok(()));
    h.choose("first.png");
    h.choose("second.JPG");

    assert_eq!(h.form.state(), FormState::Open);
    assert!(h.surface().preview().unwrap().ends_with("second.JPG"));
    assert_eq!(h.active_listeners(), OPEN);

    h.submit_and_settle();
    assert_eq!(h.sent.borrow()[0].file.name, "second.JPG");
}

// ============================================================================
// Validation
// ============================================================================

#[test]
fn test_invalid_hashtags_keep_form_open() {
    let mut h = harness(Ok(()));
    h.choose("cat.png");
    h.type_into(Field::Hashtags, "#cat #Cat");
    h.type_into(Field::Comment, "fine");

    assert!(h.submit().is_none());

    assert_eq!(h.form.state(), FormState::Open);
    assert!(h.sent.borrow().is_empty());
    assert_eq!(
        h.surface().field_error(Field::Hashtags),
        Some(text::BAD_HASHTAG)
    );
    assert_eq!(h.surface().field_error(Field::Comment), None);
    assert!(!h.surface().submit_button().disabled);
    assert_eq!(h.active_listeners(), OPEN);
}

#[test]
fn test_invalid_comment_only_flags_comment() {
    let mut h = harness(Ok(()));
    h.choose("cat.png");
    h.type_into(Field::Comment, &"x".repeat(141));

    match h.form.submit() {
        SubmitOutcome::Invalid(result) => {
            assert_eq!(result.failed_fields().collect::<Vec<_>>(), vec![Field::Comment]);
        }
        other => panic!("expected Invalid, got {:?}", other),
    }
    assert_eq!(h.surface().field_error(Field::Hashtags), None);
    assert_eq!(h.surface().field_error(Field::Comment), Some(text::BAD_COMMENT));
}

#[test]
fn test_fixing_fields_clears_errors() {
    let mut h = harness(Ok(()));
    h.choose("cat.png");
    h.type_into(Field::Hashtags, "cat");
    h.type_into(Field::Comment, &"x".repeat(200));
    assert!(h.submit().is_none());
    assert!(h.surface().field_error(Field::Hashtags).is_some());
    assert!(h.surface().field_error(Field::Comment).is_some());

    h.type_into(Field::Hashtags, "#cat");
    h.type_into(Field::Comment, "short");
    let pending = h.submit();
    assert!(pending.is_some());
    assert_eq!(h.surface().field_error(Field::Hashtags), None);
    assert_eq!(h.surface().field_error(Field::Comment), None);
}

// ============================================================================
// Submission
// ============================================================================

#[test]
fn test_successful_submission() {
    let mut h = harness(Ok(()));
    h.choose("cat.png");
    h.fire(Event::click(Node::ScaleSmaller));
    h.fire(Event::change(Node::EffectsList).with_value("chrome"));
    h.fire(Event::input(Node::EffectLevel, "0.4"));
    h.type_into(Field::Hashtags, "#cat #Кот");
    h.type_into(Field::Comment, "my cat");

    let pending = h.submit().expect("valid form submits");
    assert_eq!(h.form.state(), FormState::Submitting);
    assert!(h.form.has_submission_in_flight());
    assert_eq!(
        h.surface().submit_button(),
        &SubmitButton::sending(text::SUBMIT_SENDING)
    );

    {
        let sent = h.sent.borrow();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].scale, "75%");
        assert_eq!(sent[0].effect, "chrome");
        assert_eq!(sent[0].effect_level, "0.4");
        assert_eq!(sent[0].hashtags, "#cat #Кот");
        assert_eq!(sent[0].description, "my cat");
    }

    let settled = pollster::block_on(pending.outcome());
    assert!(settled.result().is_ok());
    h.form.settle(settled);

    assert_eq!(h.notes.borrow().successes, 1);
    assert!(h.notes.borrow().errors.is_empty());
    assert_eq!(h.surface().field_value(Field::Hashtags), "");
    assert_eq!(h.surface().field_value(Field::Comment), "");
    assert_eq!(h.surface().preview_transform(), "scale(1)");
    assert_eq!(h.surface().preview_filter(), None);
    assert!(!h.form.has_submission_in_flight());
    assert_closed_and_idle(&h);
}

#[test]
fn test_failed_submission_keeps_fields() {
    let failure = TransportError::Status { status: 500 };
    let mut h = harness(Err(failure.clone()));
    h.choose("cat.png");
    h.type_into(Field::Hashtags, "#cat");
    h.type_into(Field::Comment, "my cat");

    h.submit_and_settle();

    assert_eq!(h.notes.borrow().successes, 0);
    assert_eq!(h.notes.borrow().errors, vec![failure]);
    assert_eq!(h.surface().field_value(Field::Hashtags), "#cat");
    assert_eq!(h.surface().field_value(Field::Comment), "my cat");
    assert_closed_and_idle(&h);
}

#[test]
fn test_failed_submission_unchecks_effect() {
    let mut h = harness(Err(TransportError::Status { status: 502 }));
    h.choose("cat.png");
    h.fire(Event::change(Node::EffectsList).with_value("chrome"));
    assert_eq!(h.surface().effect_choice(), Effect::Chrome);

    h.submit_and_settle();

    // Fields survive a failure, but the effects list goes back to none
    assert_eq!(h.surface().effect_choice(), Effect::None);
    assert_eq!(h.surface().preview_filter(), None);

    h.choose("cat.png");
    h.fire(Event::change(Node::EffectsList).with_value("chrome"));
    assert_eq!(h.surface().effect_choice(), Effect::Chrome);
    assert_eq!(h.surface().preview_filter(), Some("grayscale(1)"));
}

#[test]
fn test_empty_optional_fields_submit() {
    let mut h = harness(Ok(()));
    h.choose("cat.png");
    h.submit_and_settle();

    assert_eq!(h.notes.borrow().successes, 1);
    let sent = h.sent.borrow();
    assert_eq!(sent[0].effect, "none");
    assert_eq!(sent[0].effect_level, "");
    assert_eq!(sent[0].scale, "100%");
}

#[test]
fn test_second_submit_while_sending_is_ignored() {
    let mut h = harness(Ok(()));
    h.choose("cat.png");

    let first = h.submit().expect("first submit starts");
    assert!(h.submit().is_none());
    assert!(matches!(h.form.submit(), SubmitOutcome::Ignored));
    assert_eq!(h.sent.borrow().len(), 1);

    h.form.settle(pollster::block_on(first.outcome()));
    assert_eq!(h.notes.borrow().successes, 1);
}

#[test]
fn test_submit_when_closed_does_nothing() {
    let mut h = harness(Ok(()));
    let (event, pending) = h.fire(Event::submit(Node::Form));

    assert!(pending.is_none());
    // No listener, so nothing prevents the default either
    assert!(!event.is_default_prevented());
    assert!(matches!(h.form.submit(), SubmitOutcome::Ignored));
    assert!(h.sent.borrow().is_empty());
}

// ============================================================================
// Closing
// ============================================================================

#[test]
fn test_cancel_resets_and_closes() {
    let mut h = harness(Ok(()));
    h.choose("cat.png");
    h.type_into(Field::Hashtags, "#cat");
    h.fire(Event::click(Node::ScaleSmaller));

    h.fire(Event::click(Node::CancelButton));

    assert_eq!(h.surface().field_value(Field::Hashtags), "");
    assert_eq!(h.surface().scale_text(), "100%");
    assert_closed_and_idle(&h);
}

#[test]
fn test_escape_in_text_fields_does_not_close() {
    let mut h = harness(Ok(()));
    h.choose("cat.png");
    h.type_into(Field::Hashtags, "#cat");

    h.press_escape_in(Node::HashtagInput);
    assert_eq!(h.form.state(), FormState::Open);

    h.press_escape_in(Node::CommentInput);
    assert_eq!(h.form.state(), FormState::Open);
    assert_eq!(h.surface().field_value(Field::Hashtags), "#cat");
}

#[test]
fn test_escape_elsewhere_closes_and_resets() {
    let mut h = harness(Ok(()));
    h.choose("cat.png");
    h.type_into(Field::Hashtags, "#cat");

    // Focus on a button still bubbles to the document
    h.press_escape_in(Node::ScaleBigger);

    assert_eq!(h.surface().field_value(Field::Hashtags), "");
    assert_closed_and_idle(&h);
}

#[test]
fn test_other_keys_do_not_close() {
    let mut h = harness(Ok(()));
    h.choose("cat.png");

    h.fire(Event::key_down(Node::Document, Key::Enter));
    h.fire(Event::key_down(Node::HashtagInput, Key::Char('#')));

    assert_eq!(h.form.state(), FormState::Open);
}

#[test]
fn test_text_field_keys_still_bubble() {
    let mut h = harness(Ok(()));
    h.choose("cat.png");

    let (event, _) = h.fire(Event::key_down(Node::HashtagInput, Key::Char('a')));
    assert!(!event.is_propagation_stopped());

    let (event, _) = h.fire(Event::key_down(Node::CommentInput, Key::Escape));
    assert!(event.is_propagation_stopped());
}

#[test]
fn test_close_is_idempotent() {
    let mut h = harness(Ok(()));
    h.choose("cat.png");

    h.form.close();
    h.form.close();
    h.form.cancel();

    assert_closed_and_idle(&h);
}

#[test]
fn test_repeated_cycles_do_not_leak_listeners() {
    let mut h = harness(Ok(()));
    for round in 0..25 {
        h.choose("cat.png");
        assert_eq!(h.active_listeners(), OPEN);
        assert_eq!(h.form.listeners().count_on(Node::Document), 1);

        match round % 3 {
            0 => {
                h.fire(Event::click(Node::CancelButton));
            }
            1 => h.press_escape_in(Node::Document),
            _ => h.submit_and_settle(),
        }
        assert_eq!(h.active_listeners(), MOUNTED);
    }
    assert_eq!(h.form.listeners().count_on(Node::Form), 0);
    assert_eq!(h.form.listeners().count_on(Node::ScaleSmaller), 0);
    assert_eq!(h.form.listeners().count_on(Node::EffectLevel), 0);
}

#[test]
fn test_controls_inert_after_close() {
    let mut h = harness(Ok(()));
    h.choose("cat.png");
    h.fire(Event::click(Node::CancelButton));

    h.fire(Event::click(Node::ScaleSmaller));
    h.fire(Event::change(Node::EffectsList).with_value("sepia"));

    assert_eq!(h.surface().scale_text(), "100%");
    assert_eq!(h.surface().preview_filter(), None);
}

// ============================================================================
// Closing while a submission is in flight
// ============================================================================

#[test]
fn test_cancel_while_submitting_then_settle() {
    let mut h = harness(Ok(()));
    h.choose("cat.png");
    h.type_into(Field::Hashtags, "#cat");

    let pending = h.submit().expect("submission starts");
    h.fire(Event::click(Node::CancelButton));
    assert_closed_and_idle(&h);
    assert!(h.form.has_submission_in_flight());

    h.form.settle(pollster::block_on(pending.outcome()));

    assert_eq!(h.notes.borrow().successes, 1);
    assert!(!h.form.has_submission_in_flight());
    assert_closed_and_idle(&h);
}

#[test]
fn test_late_settlement_leaves_new_session_open() {
    let mut h = harness(Err(TransportError::network("offline")));
    h.choose("first.png");

    let pending = h.submit().expect("submission starts");
    h.press_escape_in(Node::Document);

    // Reopen before the first call settles
    h.choose("second.png");
    h.type_into(Field::Hashtags, "#draft");
    assert_eq!(h.form.state(), FormState::Open);
    assert!(h.surface().submit_button().disabled);
    assert!(h.submit().is_none());

    h.form.settle(pollster::block_on(pending.outcome()));

    assert_eq!(
        h.notes.borrow().errors,
        vec![TransportError::network("offline")]
    );
    assert_eq!(h.form.state(), FormState::Open);
    assert_eq!(h.surface().field_value(Field::Hashtags), "#draft");
    assert_eq!(
        h.surface().submit_button(),
        &SubmitButton::idle(text::SUBMIT_IDLE)
    );
    assert_eq!(h.active_listeners(), OPEN);
}

// ============================================================================
// Panels through routing
// ============================================================================

#[test]
fn test_scale_buttons_route_to_panel() {
    let mut h = harness(Ok(()));
    h.choose("cat.png");

    h.fire(Event::click(Node::ScaleBigger));
    assert_eq!(h.surface().scale_text(), "100%");

    h.fire(Event::click(Node::ScaleSmaller));
    h.fire(Event::click(Node::ScaleSmaller));
    assert_eq!(h.surface().scale_text(), "50%");
    assert_eq!(h.surface().preview_transform(), "scale(0.5)");
}

#[test]
fn test_effects_route_to_panel() {
    let mut h = harness(Ok(()));
    h.choose("cat.png");

    h.fire(Event::change(Node::EffectsList).with_value("marvin"));
    assert_eq!(h.surface().preview_filter(), Some("invert(100%)"));

    h.fire(Event::input(Node::EffectLevel, "30"));
    assert_eq!(h.surface().preview_filter(), Some("invert(30%)"));
    assert_eq!(h.surface().effect_level(), "30");

    h.fire(Event::input(Node::EffectLevel, "not a number"));
    assert_eq!(h.surface().effect_level(), "30");

    h.fire(Event::change(Node::EffectsList).with_value("none"));
    assert_eq!(h.surface().preview_filter(), None);
    assert_eq!(h.surface().effect_slider(), None);
}
