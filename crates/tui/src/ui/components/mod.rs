//! Reusable widgets.

pub mod text_input;
pub mod typeahead_input;
