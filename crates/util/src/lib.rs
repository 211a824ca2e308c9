//! Shared helpers for the Paddock binaries: persisted settings and path
//! handling.

pub mod path_processing;
pub mod settings;

pub use path_processing::*;
pub use settings::*;
