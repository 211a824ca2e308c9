//! Labels shown for registry records in typeahead fields.

use paddock_typeahead::{FormatFn, format_with};
use paddock_types::{Horse, Owner};

/// `"first last"`, or empty for no owner.
pub fn format_owner_name(owner: Option<&Owner>) -> String {
    owner.map(Owner::full_name).unwrap_or_default()
}

/// The horse's name, or empty for no horse.
pub fn format_parent_name(horse: Option<&Horse>) -> String {
    horse.map(|horse| horse.name.clone()).unwrap_or_default()
}

pub fn owner_formatter() -> FormatFn<Owner> {
    format_with(format_owner_name)
}

pub fn parent_formatter() -> FormatFn<Horse> {
    format_with(format_parent_name)
}

/// Free text is its own label.
pub fn description_formatter() -> FormatFn<String> {
    format_with(|text: Option<&String>| text.cloned().unwrap_or_default())
}
