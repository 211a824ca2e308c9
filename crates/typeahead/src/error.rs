//! Error types surfaced by the typeahead control.
//!
//! Fetch failures never escape the control as events; they are handed to a
//! [`FetchErrorSink`](crate::FetchErrorSink) and otherwise swallowed. The
//! only error a caller sees directly is a construction-time configuration
//! mistake.

use thiserror::Error;

/// Failure reported by a [`SuggestionSource`](crate::SuggestionSource).
#[derive(Debug, Error)]
pub enum SuggestionError {
    /// The backing store could not be reached (for example, it is still loading).
    #[error("suggestion source unavailable: {0}")]
    Unavailable(String),
    /// Any other failure raised by the source implementation.
    #[error(transparent)]
    Source(#[from] anyhow::Error),
}

/// Errors raised while assembling a [`Typeahead`](crate::Typeahead).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeaheadError {
    /// Free-text mode was requested but the control has no way to turn typed
    /// text into a model value.
    #[error("free-text mode requires a text conversion for the model type")]
    FreeTextUnsupported,
}
