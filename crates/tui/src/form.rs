//! The horse form: four typeahead fields bound to a shared draft.
//!
//! Owner, mother and father only accept existing records; the description
//! field takes free text and merely offers existing descriptions. The form
//! never reads field values directly. Everything it knows about the edited
//! horse arrives through the change and touched callbacks, which write into
//! a [`HorseDraft`] shared with the summary panel.

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use crossterm::event::KeyEvent;
use paddock_registry::{
    DescriptionSource, LookupOptions, OwnerSource, ParentSource, StableRegistry, description_formatter, owner_formatter,
    parent_formatter,
};
use paddock_typeahead::{BindableField, SuggestionOutcome, SuggestionSource, Typeahead, TypeaheadError};
use paddock_types::{Horse, Owner, ParentRole};
use tracing::{debug, info};

use crate::ui::components::typeahead_input::{KeyOutcome, TypeaheadInput};

/// Which input of the form has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FormField {
    Owner,
    Mother,
    Father,
    Description,
}

impl FormField {
    pub const ALL: [FormField; 4] = [FormField::Owner, FormField::Mother, FormField::Father, FormField::Description];

    pub fn label(self) -> &'static str {
        match self {
            FormField::Owner => "Owner",
            FormField::Mother => "Mother",
            FormField::Father => "Father",
            FormField::Description => "Description",
        }
    }

    pub fn next(self) -> Self {
        let index = Self::ALL.iter().position(|field| *field == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        let index = Self::ALL.iter().position(|field| *field == self).unwrap_or(0);
        Self::ALL[(index + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Values reported by the form's fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HorseDraft {
    pub owner: Option<Owner>,
    pub mother: Option<Horse>,
    pub father: Option<Horse>,
    pub description: Option<String>,
    /// Fields the user has interacted with, in first-touch order.
    pub touched: Vec<FormField>,
    /// Number of change notifications received.
    pub changes: usize,
}

impl HorseDraft {
    fn touch(&mut self, field: FormField) {
        if !self.touched.contains(&field) {
            self.touched.push(field);
        }
    }
}

pub type SharedDraft = Arc<Mutex<HorseDraft>>;

fn lock_draft(draft: &Mutex<HorseDraft>) -> MutexGuard<'_, HorseDraft> {
    draft.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Settings the form's fields are built with.
#[derive(Debug, Clone, Copy)]
pub struct FormOptions {
    pub debounce_interval: Duration,
    pub lookup: LookupOptions,
}

/// A fetch completion tagged with the field it belongs to.
#[derive(Debug)]
pub enum FieldOutcome {
    Owner(SuggestionOutcome<Owner>),
    Mother(SuggestionOutcome<Horse>),
    Father(SuggestionOutcome<Horse>),
    Description(SuggestionOutcome<String>),
}

pub struct HorseForm {
    owner: TypeaheadInput<Owner>,
    mother: TypeaheadInput<Horse>,
    father: TypeaheadInput<Horse>,
    description: TypeaheadInput<String>,
    focus: FormField,
    locked: bool,
    draft: SharedDraft,
}

impl HorseForm {
    pub fn new(registry: Arc<StableRegistry>, options: FormOptions) -> Result<Self, TypeaheadError> {
        let owner_source: Arc<dyn SuggestionSource<Owner>> = Arc::new(OwnerSource::new(Arc::clone(&registry), options.lookup));
        let mother_source: Arc<dyn SuggestionSource<Horse>> =
            Arc::new(ParentSource::new(Arc::clone(&registry), ParentRole::Mother, options.lookup));
        let father_source: Arc<dyn SuggestionSource<Horse>> =
            Arc::new(ParentSource::new(Arc::clone(&registry), ParentRole::Father, options.lookup));
        let description_source: Arc<dyn SuggestionSource<String>> = Arc::new(DescriptionSource::new(registry, options.lookup));

        let owner = Typeahead::builder(owner_source, owner_formatter())
            .debounce_interval(options.debounce_interval)
            .build()?;
        let mother = Typeahead::builder(mother_source, parent_formatter())
            .debounce_interval(options.debounce_interval)
            .build()?;
        let father = Typeahead::builder(father_source, parent_formatter())
            .debounce_interval(options.debounce_interval)
            .build()?;
        let description = Typeahead::builder(description_source, description_formatter())
            .debounce_interval(options.debounce_interval)
            .free_text()
            .build()?;

        let mut form = Self {
            owner: TypeaheadInput::new(FormField::Owner.label(), owner),
            mother: TypeaheadInput::new(FormField::Mother.label(), mother),
            father: TypeaheadInput::new(FormField::Father.label(), father),
            description: TypeaheadInput::new(FormField::Description.label(), description),
            focus: FormField::Owner,
            locked: false,
            draft: SharedDraft::default(),
        };
        form.bind();
        Ok(form)
    }

    fn bind(&mut self) {
        bind_field(&mut self.owner, &self.draft, FormField::Owner, |draft, value| draft.owner = value.cloned());
        bind_field(&mut self.mother, &self.draft, FormField::Mother, |draft, value| draft.mother = value.cloned());
        bind_field(&mut self.father, &self.draft, FormField::Father, |draft, value| draft.father = value.cloned());
        bind_field(&mut self.description, &self.draft, FormField::Description, |draft, value| {
            draft.description = value.cloned()
        });
    }

    /// Snapshot of what the fields have reported so far.
    pub fn draft(&self) -> HorseDraft {
        lock_draft(&self.draft).clone()
    }

    pub fn focus(&self) -> FormField {
        self.focus
    }

    pub fn locked(&self) -> bool {
        self.locked
    }

    pub fn owner(&self) -> &TypeaheadInput<Owner> {
        &self.owner
    }

    pub fn mother(&self) -> &TypeaheadInput<Horse> {
        &self.mother
    }

    pub fn father(&self) -> &TypeaheadInput<Horse> {
        &self.father
    }

    pub fn description(&self) -> &TypeaheadInput<String> {
        &self.description
    }

    pub fn set_focus(&mut self, field: FormField) {
        if field == self.focus {
            return;
        }
        self.blur_focused();
        debug!(from = ?self.focus, to = ?field, "form focus moved");
        self.focus = field;
    }

    pub fn focus_next(&mut self) {
        self.set_focus(self.focus.next());
    }

    pub fn focus_prev(&mut self) {
        self.set_focus(self.focus.prev());
    }

    fn blur_focused(&mut self) {
        match self.focus {
            FormField::Owner => self.owner.blur(),
            FormField::Mother => self.mother.blur(),
            FormField::Father => self.father.blur(),
            FormField::Description => self.description.blur(),
        }
    }

    /// Forward a key to the focused field.
    pub fn handle_key(&mut self, key: KeyEvent) -> KeyOutcome {
        match self.focus {
            FormField::Owner => self.owner.handle_key(key),
            FormField::Mother => self.mother.handle_key(key),
            FormField::Father => self.father.handle_key(key),
            FormField::Description => self.description.handle_key(key),
        }
    }

    /// Fill the form from an existing horse, as when editing a record.
    /// Programmatic writes neither notify nor touch, so the draft is seeded
    /// directly.
    pub fn load_horse(&mut self, registry: &StableRegistry, horse: &Horse) {
        let owner = horse.owner_id.and_then(|id| registry.owner(id)).cloned();
        let mother = horse.mother_id.and_then(|id| registry.horse(id)).cloned();
        let father = horse.father_id.and_then(|id| registry.horse(id)).cloned();

        self.owner.write_value(owner.clone());
        self.mother.write_value(mother.clone());
        self.father.write_value(father.clone());
        self.description.write_value(horse.description.clone());

        let mut draft = lock_draft(&self.draft);
        draft.owner = owner;
        draft.mother = mother;
        draft.father = father;
        draft.description = horse.description.clone();
        info!(horse = horse.id, name = %horse.name, "form loaded for editing");
    }

    /// Clear every field and forget interactions.
    pub fn reset(&mut self) {
        self.owner.write_value(None);
        self.mother.write_value(None);
        self.father.write_value(None);
        self.description.write_value(None);
        self.owner.control_mut().reset_touched();
        self.mother.control_mut().reset_touched();
        self.father.control_mut().reset_touched();
        self.description.control_mut().reset_touched();
        *lock_draft(&self.draft) = HorseDraft::default();
        debug!("form reset");
    }

    /// Toggle the disabled flag on every field.
    pub fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
        self.owner.set_disabled(locked);
        self.mother.set_disabled(locked);
        self.father.set_disabled(locked);
        self.description.set_disabled(locked);
        info!(locked, "form lock changed");
    }

    /// `true` when every strict field shows exactly its bound value.
    pub fn is_valid(&self) -> bool {
        self.owner.control().is_valid_selection()
            && self.mother.control().is_valid_selection()
            && self.father.control().is_valid_selection()
    }

    pub fn is_loading(&self) -> bool {
        self.owner.control().is_loading()
            || self.mother.control().is_loading()
            || self.father.control().is_loading()
            || self.description.control().is_loading()
    }

    /// Wait for the next fetch completion from any field.
    pub async fn next_outcome(&mut self) -> FieldOutcome {
        tokio::select! {
            Some(outcome) = self.owner.control_mut().next_outcome() => FieldOutcome::Owner(outcome),
            Some(outcome) = self.mother.control_mut().next_outcome() => FieldOutcome::Mother(outcome),
            Some(outcome) = self.father.control_mut().next_outcome() => FieldOutcome::Father(outcome),
            Some(outcome) = self.description.control_mut().next_outcome() => FieldOutcome::Description(outcome),
            else => std::future::pending().await,
        }
    }

    pub fn apply(&mut self, outcome: FieldOutcome) {
        let disposition = match outcome {
            FieldOutcome::Owner(outcome) => self.owner.apply_outcome(outcome),
            FieldOutcome::Mother(outcome) => self.mother.apply_outcome(outcome),
            FieldOutcome::Father(outcome) => self.father.apply_outcome(outcome),
            FieldOutcome::Description(outcome) => self.description.apply_outcome(outcome),
        };
        debug!(?disposition, "field outcome applied");
    }
}

fn bind_field<T, F>(input: &mut TypeaheadInput<T>, draft: &SharedDraft, field: FormField, store: F)
where
    T: Clone + Send + 'static,
    F: Fn(&mut HorseDraft, Option<&T>) + Send + 'static,
{
    let on_change = Arc::clone(draft);
    input.on_change_subscribe(Box::new(move |value: Option<&T>| {
        let mut draft = lock_draft(&on_change);
        store(&mut draft, value);
        draft.changes += 1;
    }));
    let on_touched = Arc::clone(draft);
    input.on_touched_subscribe(Box::new(move || lock_draft(&on_touched).touch(field)));
}
