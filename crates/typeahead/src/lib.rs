//! # Paddock Typeahead
//!
//! A reusable, generically typed typeahead form field. Free-text keystrokes
//! are turned into validated selections from a caller-supplied,
//! asynchronously fetched candidate set.
//!
//! ## Key Features
//!
//! - **Debounced lookups**: one fetch per pause in typing, for the latest text
//! - **Last-issued wins**: out-of-order completions never clobber newer results
//! - **Instant validation**: every keystroke resolves against the current candidates
//! - **Bindable**: hosts drive it through the [`BindableField`] contract
//!
//! ## Architecture
//!
//! - **`pipeline`**: debounce timer, fetch sequencing, outcome channel
//! - **`candidates`**: label-to-value store of the latest accepted fetch
//! - **`field`**: bound value, display text, touched/disabled flags, callbacks
//! - **`control`**: the [`Typeahead`] wiring the three together
//! - **`source`**: injected capabilities (suggestions, formatting, error sink)

mod candidates;
mod config;
mod control;
mod error;
mod field;
mod identifier;
mod pipeline;
mod source;

pub use candidates::CandidateStore;
pub use config::{DEFAULT_DEBOUNCE_INTERVAL, TypeaheadConfig};
pub use control::{OutcomeDisposition, Typeahead, TypeaheadBuilder};
pub use error::{SuggestionError, TypeaheadError};
pub use field::{BindableField, ChangeCallback, FieldState, TouchedCallback};
pub use identifier::{IdGenerator, SequentialIds, candidate_list_id};
pub use pipeline::{PipelinePhase, SuggestionOutcome};
pub use source::{FetchErrorSink, FnSource, FormatFn, SuggestionSource, TracingErrorSink, format_with};
