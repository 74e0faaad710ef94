//! Submission transport.

use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

use crate::form::FormData;

/// Errors a transport reports for a failed submission.
///
/// The value is handed to the error notification unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The request never got a response
    #[error("Network error: {0}")]
    Network(String),

    /// The server answered with a non-success status
    #[error("Server responded with status {status}")]
    Status {
        /// HTTP status code
        status: u16,
    },

    /// The host refused to send the request
    #[error("Submission rejected: {0}")]
    Rejected(String),
}

impl TransportError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected(message.into())
    }
}

/// Future returned by [`Transport::send`]. Not `Send`: the form lives on the
/// page's single thread.
pub type SendFuture = Pin<Box<dyn Future<Output = Result<(), TransportError>>>>;

/// Performs the network call for one submission.
///
/// No timeout is applied by the caller; a transport that can hang should
/// enforce its own.
pub trait Transport {
    fn send(&self, data: FormData) -> SendFuture;
}
