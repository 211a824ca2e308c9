//! Application state for the paddock TUI.
//!
//! `App` owns the horse form and the bits of chrome around it (theme,
//! throbber, status line). Key routing lives here; the runtime only decides
//! when to call it.

use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use paddock_registry::StableRegistry;
use paddock_typeahead::TypeaheadError;
use tracing::debug;

use crate::{
    form::{FieldOutcome, FormOptions, HorseForm},
    ui::{
        components::typeahead_input::KeyOutcome,
        theme::{NordTheme, Theme},
    },
};

/// What the runtime should do after a key was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Exit,
}

pub struct App {
    pub form: HorseForm,
    pub theme: Box<dyn Theme>,
    /// Index into the throbber frames while any field is loading.
    pub throbber_idx: usize,
    registry: Arc<StableRegistry>,
}

impl App {
    pub fn new(registry: Arc<StableRegistry>, options: FormOptions) -> Result<Self, TypeaheadError> {
        Ok(Self {
            form: HorseForm::new(Arc::clone(&registry), options)?,
            theme: Box::new(NordTheme::new()),
            throbber_idx: 0,
            registry,
        })
    }

    pub fn registry(&self) -> &StableRegistry {
        &self.registry
    }

    /// Open an existing horse for editing. Returns `false` for unknown ids.
    pub fn edit_horse(&mut self, id: i64) -> bool {
        let Some(horse) = self.registry.horse(id).cloned() else {
            return false;
        };
        self.form.load_horse(&self.registry, &horse);
        true
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Control {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('c') | KeyCode::Char('q') => return Control::Exit,
                KeyCode::Char('r') => self.form.reset(),
                KeyCode::Char('l') => self.form.set_locked(!self.form.locked()),
                _ => debug!(?key, "unbound control key"),
            }
            return Control::Continue;
        }

        if self.form.handle_key(key) == KeyOutcome::Consumed {
            return Control::Continue;
        }
        match key.code {
            KeyCode::Tab | KeyCode::Enter => self.form.focus_next(),
            KeyCode::BackTab => self.form.focus_prev(),
            _ => {}
        }
        Control::Continue
    }

    pub fn apply_outcome(&mut self, outcome: FieldOutcome) {
        self.form.apply(outcome);
    }

    /// Advance the throbber. Returns `true` when a redraw is needed.
    pub fn tick(&mut self) -> bool {
        if self.form.is_loading() {
            self.throbber_idx = self.throbber_idx.wrapping_add(1);
            true
        } else {
            self.throbber_idx = 0;
            false
        }
    }
}
