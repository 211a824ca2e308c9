//! Input pipeline: trailing-edge debounce plus last-issued-wins fetching.
//!
//! Keystrokes restart a single debounce timer. When the timer survives the
//! quiet period it issues a fetch, stamping it with the next value of a
//! shared sequence counter. Fetches run on their own tasks and report back
//! over a channel; the owning control applies an outcome only if its
//! sequence is still the most recently issued one, so a slow early response
//! can never overwrite a faster later one.
//!
//! Superseded fetches are not aborted. They finish in the background and
//! their outcome is discarded on arrival.

use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use tokio::{
    runtime::Handle,
    sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel},
    task::JoinHandle,
};
use tracing::{debug, warn};

use crate::{error::SuggestionError, source::SuggestionSource};

/// Where the pipeline currently sits in its request lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelinePhase {
    /// No timer pending and the latest issued fetch has settled.
    Idle,
    /// A keystroke arrived and the quiet period has not elapsed yet.
    AwaitingDebounce,
    /// The latest issued fetch has not reported back yet.
    Fetching,
}

/// Completion of one issued fetch, waiting to be applied by its control.
#[derive(Debug)]
pub struct SuggestionOutcome<T> {
    pub(crate) sequence: u64,
    pub(crate) query: String,
    pub(crate) result: Result<Vec<T>, SuggestionError>,
}

impl<T> SuggestionOutcome<T> {
    /// Position of the fetch in issue order, starting at 1.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Text the fetch was issued for.
    pub fn query(&self) -> &str {
        &self.query
    }
}

pub(crate) struct InputPipeline<T> {
    field: String,
    debounce_interval: Duration,
    source: Arc<dyn SuggestionSource<T>>,
    latest_issued: Arc<AtomicU64>,
    settled: u64,
    pending_debounce: Option<JoinHandle<()>>,
    outcome_tx: UnboundedSender<SuggestionOutcome<T>>,
    outcome_rx: UnboundedReceiver<SuggestionOutcome<T>>,
}

impl<T> InputPipeline<T>
where
    T: Send + 'static,
{
    pub(crate) fn new(field: String, debounce_interval: Duration, source: Arc<dyn SuggestionSource<T>>) -> Self {
        let (outcome_tx, outcome_rx) = unbounded_channel();
        Self {
            field,
            debounce_interval,
            source,
            latest_issued: Arc::new(AtomicU64::new(0)),
            settled: 0,
            pending_debounce: None,
            outcome_tx,
            outcome_rx,
        }
    }

    /// Restart the debounce timer for `text`, dropping any pending intent.
    pub(crate) fn schedule(&mut self, text: String) {
        self.cancel_debounce();

        let Ok(runtime) = Handle::try_current() else {
            warn!(field = %self.field, "no async runtime available; skipping suggestion fetch");
            return;
        };

        let field = self.field.clone();
        let interval = self.debounce_interval;
        let source = Arc::clone(&self.source);
        let latest_issued = Arc::clone(&self.latest_issued);
        let outcome_tx = self.outcome_tx.clone();

        let debounce = runtime.spawn(async move {
            tokio::time::sleep(interval).await;
            // Nothing below may await: an abort after this point would leave
            // the counter bumped without a fetch behind it.
            let sequence = latest_issued.fetch_add(1, Ordering::SeqCst) + 1;
            debug!(field = %field, query = %text, sequence, "suggestion fetch issued");
            tokio::spawn(run_fetch(field, sequence, text, source, outcome_tx));
        });
        self.pending_debounce = Some(debounce);
    }

    fn cancel_debounce(&mut self) {
        if let Some(pending) = self.pending_debounce.take() {
            pending.abort();
        }
    }

    pub(crate) fn latest_issued(&self) -> u64 {
        self.latest_issued.load(Ordering::SeqCst)
    }

    pub(crate) fn is_latest(&self, sequence: u64) -> bool {
        sequence == self.latest_issued()
    }

    pub(crate) fn settle(&mut self, sequence: u64) {
        self.settled = self.settled.max(sequence);
    }

    pub(crate) fn phase(&self) -> PipelinePhase {
        if self.pending_debounce.as_ref().is_some_and(|pending| !pending.is_finished()) {
            return PipelinePhase::AwaitingDebounce;
        }
        if self.latest_issued() > self.settled {
            PipelinePhase::Fetching
        } else {
            PipelinePhase::Idle
        }
    }

    /// Wait for the next fetch to report back. Pending forever while nothing
    /// is in flight, which makes it suitable as a `select!` branch.
    pub(crate) async fn next_outcome(&mut self) -> Option<SuggestionOutcome<T>> {
        self.outcome_rx.recv().await
    }

    pub(crate) fn try_next_outcome(&mut self) -> Option<SuggestionOutcome<T>> {
        self.outcome_rx.try_recv().ok()
    }
}

impl<T> Drop for InputPipeline<T> {
    fn drop(&mut self) {
        if let Some(pending) = self.pending_debounce.take() {
            pending.abort();
        }
    }
}

async fn run_fetch<T>(
    field: String,
    sequence: u64,
    query: String,
    source: Arc<dyn SuggestionSource<T>>,
    outcome_tx: UnboundedSender<SuggestionOutcome<T>>,
) where
    T: Send + 'static,
{
    let lookup_query = query.clone();
    let lookup = tokio::spawn(async move { source.suggestions_for(&lookup_query).await });
    let result = match lookup.await {
        Ok(result) => result,
        Err(join_error) => Err(SuggestionError::Source(anyhow::anyhow!("suggestion lookup task failed: {join_error}"))),
    };
    debug!(
        field = %field,
        query = %query,
        sequence,
        ok = result.is_ok(),
        "suggestion fetch completed"
    );
    if outcome_tx.send(SuggestionOutcome { sequence, query, result }).is_err() {
        debug!(field = %field, sequence, "control dropped before suggestion fetch completed");
    }
}
