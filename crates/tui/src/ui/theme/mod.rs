//! Theme styling for the TUI: semantic roles, the Nord palette, and helper
//! builders for Ratatui widgets.

pub mod nord;
pub mod roles;
pub mod theme_helpers;

pub use nord::NordTheme;
pub use roles::Theme;
