//! Owner and horse records for the paddock host form.
//!
//! The registry loads a stable (owners plus horses) from JSON, or falls back
//! to a small embedded sample, and exposes the suggestion sources and label
//! formatters the form's typeahead fields are built from.

mod error;
mod format;
mod models;
mod sources;

pub use error::RegistryError;
pub use format::{description_formatter, format_owner_name, format_parent_name, owner_formatter, parent_formatter};
pub use models::{DEFAULT_SUGGESTION_LIMIT, StableRegistry};
pub use sources::{DescriptionSource, LookupOptions, OwnerSource, ParentSource};
