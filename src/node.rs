//! Elements of the upload page that take part in event routing.

use imgpost_ui::{ListenerScope, Listeners, Target};

/// An element events are dispatched to.
///
/// Every control sits inside the upload form, and the form sits in the
/// document, so key presses in a text field bubble through the form before
/// reaching document-level listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Node {
    Document,
    Form,
    UploadInput,
    CancelButton,
    SubmitButton,
    HashtagInput,
    CommentInput,
    EffectsList,
    EffectLevel,
    ScaleSmaller,
    ScaleBigger,
}

impl Target for Node {
    fn parent(&self) -> Option<Self> {
        match self {
            Node::Document => None,
            Node::Form => Some(Node::Document),
            _ => Some(Node::Form),
        }
    }
}

/// What a listener does when its event arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handler {
    /// A file was chosen; open the overlay.
    UploadChange,
    FormSubmit,
    CancelClick,
    /// Document-level escape closes the overlay.
    EscapeKeydown,
    /// Keeps escape inside the hashtag field.
    HashtagsKeydown,
    /// Keeps escape inside the comment field.
    CommentKeydown,
    EffectChange,
    EffectLevelInput,
    ScaleSmaller,
    ScaleBigger,
}

pub type FormListeners = Listeners<Node, Handler>;
pub type FormScope = ListenerScope<Node, Handler>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields_bubble_through_form() {
        assert_eq!(
            Node::HashtagInput.bubble_path(),
            vec![Node::HashtagInput, Node::Form, Node::Document]
        );
        assert_eq!(Node::Form.bubble_path(), vec![Node::Form, Node::Document]);
        assert_eq!(Node::Document.bubble_path(), vec![Node::Document]);
    }
}
