//! Suggestion sources backed by a [`StableRegistry`].
//!
//! Each source answers one kind of field. Lookups run against shared,
//! immutable registry data and may be delayed by a configurable latency so the
//! debounce and last-issued-wins behaviour of the fields is observable.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use paddock_typeahead::{SuggestionError, SuggestionSource};
use paddock_types::{Horse, Owner, ParentRole};
use tracing::debug;

use crate::models::{DEFAULT_SUGGESTION_LIMIT, StableRegistry};

/// Knobs shared by every registry source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupOptions {
    pub limit: usize,
    pub latency: Duration,
}

impl Default for LookupOptions {
    fn default() -> Self {
        Self {
            limit: DEFAULT_SUGGESTION_LIMIT,
            latency: Duration::ZERO,
        }
    }
}

impl LookupOptions {
    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

/// Owners by name, for the owner field.
#[derive(Debug, Clone)]
pub struct OwnerSource {
    registry: Arc<StableRegistry>,
    options: LookupOptions,
}

impl OwnerSource {
    pub fn new(registry: Arc<StableRegistry>, options: LookupOptions) -> Self {
        Self { registry, options }
    }
}

#[async_trait]
impl SuggestionSource<Owner> for OwnerSource {
    async fn suggestions_for(&self, text: &str) -> Result<Vec<Owner>, SuggestionError> {
        if text.is_empty() {
            return Ok(Vec::new());
        }
        self.options.simulate_latency().await;
        let owners = self.registry.search_by_name(text, self.options.limit);
        debug!(query = %text, item_count = owners.len(), "owner lookup");
        Ok(owners)
    }
}

/// Horses eligible as mother or father.
#[derive(Debug, Clone)]
pub struct ParentSource {
    registry: Arc<StableRegistry>,
    role: ParentRole,
    options: LookupOptions,
}

impl ParentSource {
    pub fn new(registry: Arc<StableRegistry>, role: ParentRole, options: LookupOptions) -> Self {
        Self { registry, role, options }
    }

    pub fn role(&self) -> ParentRole {
        self.role
    }
}

#[async_trait]
impl SuggestionSource<Horse> for ParentSource {
    async fn suggestions_for(&self, text: &str) -> Result<Vec<Horse>, SuggestionError> {
        if text.is_empty() {
            return Ok(Vec::new());
        }
        self.options.simulate_latency().await;
        let horses = self.registry.parent_suggestions(text, self.role, self.options.limit);
        debug!(query = %text, role = ?self.role, item_count = horses.len(), "parent lookup");
        Ok(horses)
    }
}

/// Existing descriptions, offered as completions for a free-text field.
#[derive(Debug, Clone)]
pub struct DescriptionSource {
    registry: Arc<StableRegistry>,
    options: LookupOptions,
}

impl DescriptionSource {
    pub fn new(registry: Arc<StableRegistry>, options: LookupOptions) -> Self {
        Self { registry, options }
    }
}

#[async_trait]
impl SuggestionSource<String> for DescriptionSource {
    async fn suggestions_for(&self, text: &str) -> Result<Vec<String>, SuggestionError> {
        self.options.simulate_latency().await;
        Ok(self.registry.description_suggestions(text, self.options.limit))
    }
}
