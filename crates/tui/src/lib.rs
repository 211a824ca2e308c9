//! # Paddock TUI
//!
//! Terminal host for the typeahead fields: a horse form with owner, mother
//! and father pickers plus a free-text description, and a live summary of
//! what the fields have reported.
//!
//! ## Architecture
//!
//! - **`form`**: the fields and the draft they write into via callbacks
//! - **`app`**: key routing and chrome state
//! - **`ui::runtime`**: terminal lifecycle and the `select!` event loop
//! - **`ui::components`**: text buffer and the typeahead widget

mod app;
mod form;
mod ui;

use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result, bail};
use paddock_registry::{LookupOptions, StableRegistry};

pub use app::App;
pub use form::{FormField, FormOptions, HorseDraft, HorseForm};

/// Inputs for a TUI session.
#[derive(Debug, Clone)]
pub struct TuiOptions {
    pub registry: Arc<StableRegistry>,
    pub debounce_interval: Duration,
    pub lookup: LookupOptions,
    /// Horse to open for editing instead of an empty form.
    pub edit_horse: Option<i64>,
}

/// Runs the TUI until the user quits.
///
/// # Errors
///
/// Terminal setup or teardown failures, and an `edit_horse` id that is not
/// in the registry.
pub async fn run(options: TuiOptions) -> Result<()> {
    let form_options = FormOptions {
        debounce_interval: options.debounce_interval,
        lookup: options.lookup,
    };
    let mut app = App::new(options.registry, form_options).context("build horse form")?;
    if let Some(id) = options.edit_horse
        && !app.edit_horse(id)
    {
        bail!("no horse with id {id}");
    }
    ui::runtime::run_app(app).await
}
