//! Capabilities injected by the host form.
//!
//! A typeahead never knows where its candidates come from. The host supplies
//! a [`SuggestionSource`] that produces candidates for typed text, a
//! [`FormatFn`] that renders a candidate (or the empty selection) as a label,
//! and optionally a [`FetchErrorSink`] that receives lookup failures.

use std::{fmt, future::Future, marker::PhantomData, sync::Arc};

use async_trait::async_trait;
use tracing::warn;

use crate::error::SuggestionError;

/// Renders a model value (or `None`) into the label shown in the text field
/// and the suggestion list. Must be total and deterministic.
pub type FormatFn<T> = Arc<dyn Fn(Option<&T>) -> String + Send + Sync>;

/// Wrap a plain closure into a [`FormatFn`].
pub fn format_with<T, F>(format: F) -> FormatFn<T>
where
    F: Fn(Option<&T>) -> String + Send + Sync + 'static,
{
    Arc::new(format)
}

/// Asynchronous producer of candidates for a piece of typed text.
///
/// Implementations are shared between the control and the tasks it spawns,
/// so they must not rely on being called in order or exactly once per
/// keystroke. A source may return an error; the control reports it and keeps
/// its previous candidates.
#[async_trait]
pub trait SuggestionSource<T>: Send + Sync {
    /// Produce the candidates for `text`.
    async fn suggestions_for(&self, text: &str) -> Result<Vec<T>, SuggestionError>;
}

/// Adapter turning an async closure into a [`SuggestionSource`].
///
/// ```rust
/// use paddock_typeahead::{FnSource, SuggestionError};
///
/// let source: FnSource<_, String> = FnSource::new(|text: String| async move {
///     Ok::<_, SuggestionError>(vec![format!("{text}-1"), format!("{text}-2")])
/// });
/// # let _ = source;
/// ```
pub struct FnSource<F, T> {
    lookup: F,
    _marker: PhantomData<fn() -> T>,
}

impl<F, T> FnSource<F, T> {
    pub fn new(lookup: F) -> Self {
        Self {
            lookup,
            _marker: PhantomData,
        }
    }
}

impl<F, T> fmt::Debug for FnSource<F, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnSource").finish_non_exhaustive()
    }
}

#[async_trait]
impl<F, Fut, T> SuggestionSource<T> for FnSource<F, T>
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Vec<T>, SuggestionError>> + Send,
    T: Send,
{
    async fn suggestions_for(&self, text: &str) -> Result<Vec<T>, SuggestionError> {
        (self.lookup)(text.to_string()).await
    }
}

/// Destination for lookup failures.
pub trait FetchErrorSink: Send + Sync {
    /// Record that the lookup for `query` failed.
    fn report(&self, field: &str, query: &str, error: &SuggestionError);
}

/// Default sink: logs failures through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingErrorSink;

impl FetchErrorSink for TracingErrorSink {
    fn report(&self, field: &str, query: &str, error: &SuggestionError) {
        warn!(
            field = %field,
            query = %query,
            error = %error,
            "error when getting autocompletion list"
        );
    }
}
