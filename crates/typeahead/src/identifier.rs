//! Identifier generation for rendered candidate lists.
//!
//! Each control needs a unique element identifier for its suggestion list.
//! Generators are injected so tests and embedders can scope uniqueness; the
//! process-wide generator is the default.

use std::sync::atomic::{AtomicU64, Ordering};

const CANDIDATE_LIST_PREFIX: &str = "typeahead-candidates";

static PROCESS_IDS: SequentialIds = SequentialIds::new();

/// Source of identifiers unique within the generator's lifetime.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> u64;
}

/// Monotonic counter starting at zero.
#[derive(Debug, Default)]
pub struct SequentialIds {
    next: AtomicU64,
}

impl SequentialIds {
    pub const fn new() -> Self {
        Self { next: AtomicU64::new(0) }
    }

    /// The generator shared by every control in this process.
    pub fn process() -> &'static SequentialIds {
        &PROCESS_IDS
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }
}

/// Element identifier for the candidate list of control number `id`.
pub fn candidate_list_id(id: u64) -> String {
    format!("{CANDIDATE_LIST_PREFIX}-{id}")
}
