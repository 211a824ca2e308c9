//! The typeahead control: wires the input pipeline, candidate store and
//! field state together behind the [`BindableField`] contract.
//!
//! All state lives on the thread that owns the control. Keystrokes resolve
//! synchronously against the current candidates; fetches run on spawned
//! tasks and come back through [`Typeahead::next_outcome`] (or
//! [`Typeahead::drain_outcomes`]) so the owner applies them in its own loop.

use std::{fmt, sync::Arc, time::Duration};

use tracing::debug;

use crate::{
    candidates::CandidateStore,
    config::TypeaheadConfig,
    error::TypeaheadError,
    field::{BindableField, ChangeCallback, FieldState, TouchedCallback},
    identifier::{IdGenerator, SequentialIds, candidate_list_id},
    pipeline::{InputPipeline, PipelinePhase, SuggestionOutcome},
    source::{FetchErrorSink, FormatFn, SuggestionSource, TracingErrorSink},
};

type FreeTextFn<T> = Arc<dyn Fn(&str) -> T + Send + Sync>;

/// What happened to a fetch outcome handed to [`Typeahead::apply_outcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeDisposition {
    /// The candidate store now holds this many entries from the fetch.
    Applied(usize),
    /// A later fetch was issued after this one; the outcome was dropped.
    Superseded,
    /// The fetch failed and was reported to the error sink.
    Failed,
}

enum Resolution<T> {
    Cleared,
    Assigned(T),
    Unresolved,
}

/// Builder for [`Typeahead`].
pub struct TypeaheadBuilder<T> {
    source: Arc<dyn SuggestionSource<T>>,
    format: FormatFn<T>,
    config: TypeaheadConfig,
    free_text: Option<FreeTextFn<T>>,
    error_sink: Arc<dyn FetchErrorSink>,
    id: Option<u64>,
}

impl<T> TypeaheadBuilder<T>
where
    T: Clone + Send + 'static,
{
    pub fn config(mut self, config: TypeaheadConfig) -> Self {
        self.config = config;
        self
    }

    pub fn debounce_interval(mut self, debounce_interval: Duration) -> Self {
        self.config.debounce_interval = debounce_interval;
        self
    }

    pub fn error_sink(mut self, error_sink: Arc<dyn FetchErrorSink>) -> Self {
        self.error_sink = error_sink;
        self
    }

    /// Draw the control's identifier from `ids` instead of the process-wide
    /// generator.
    pub fn id_generator(mut self, ids: &dyn IdGenerator) -> Self {
        self.id = Some(ids.next_id());
        self
    }

    /// Accept any typed text as the value instead of requiring a candidate
    /// match. Only offered for model types built from a `String`.
    pub fn free_text(mut self) -> Self
    where
        T: From<String>,
    {
        self.config.require_exact_match = false;
        self.free_text = Some(Arc::new(|text: &str| T::from(text.to_string())));
        self
    }

    pub fn build(self) -> Result<Typeahead<T>, TypeaheadError> {
        let free_text = if self.config.require_exact_match {
            None
        } else {
            Some(self.free_text.ok_or(TypeaheadError::FreeTextUnsupported)?)
        };
        let list_id = candidate_list_id(self.id.unwrap_or_else(|| SequentialIds::process().next_id()));
        let pipeline = InputPipeline::new(list_id.clone(), self.config.debounce_interval, self.source);
        let mut field = FieldState::default();
        field.set_display_text((self.format)(None));

        debug!(
            field = %list_id,
            require_exact_match = self.config.require_exact_match,
            debounce_ms = self.config.debounce_interval.as_millis() as u64,
            "typeahead created"
        );
        Ok(Typeahead {
            list_id,
            config: self.config,
            format: self.format,
            free_text,
            field,
            candidates: CandidateStore::new(),
            pipeline,
            error_sink: self.error_sink,
        })
    }
}

/// Asynchronous typeahead input bound to a model value of type `T`.
///
/// Typed text is turned into a value in one of two ways. In strict mode
/// (the default) the text must equal the label of a candidate returned by
/// the most recent accepted fetch; a miss leaves the previous value in
/// place. In free-text mode the text itself becomes the value.
///
/// ```rust
/// use std::sync::Arc;
/// use paddock_typeahead::{FnSource, SuggestionError, Typeahead, format_with};
///
/// let source: Arc<FnSource<_, String>> = Arc::new(FnSource::new(|text: String| async move {
///     Ok::<_, SuggestionError>(vec![format!("{text} Smith")])
/// }));
/// let mut owner = Typeahead::<String>::builder(source, format_with(|value: Option<&String>| value.cloned().unwrap_or_default()))
///     .build()
///     .expect("strict typeahead");
/// owner.input_changed("");
/// assert!(owner.value().is_none());
/// ```
pub struct Typeahead<T> {
    list_id: String,
    config: TypeaheadConfig,
    format: FormatFn<T>,
    free_text: Option<FreeTextFn<T>>,
    field: FieldState<T>,
    candidates: CandidateStore<T>,
    pipeline: InputPipeline<T>,
    error_sink: Arc<dyn FetchErrorSink>,
}

impl<T: fmt::Debug> fmt::Debug for Typeahead<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Typeahead")
            .field("list_id", &self.list_id)
            .field("config", &self.config)
            .field("field", &self.field)
            .field("candidates", &self.candidates)
            .finish_non_exhaustive()
    }
}

impl<T> Typeahead<T>
where
    T: Clone + Send + 'static,
{
    pub fn builder(source: Arc<dyn SuggestionSource<T>>, format: FormatFn<T>) -> TypeaheadBuilder<T> {
        TypeaheadBuilder {
            source,
            format,
            config: TypeaheadConfig::default(),
            free_text: None,
            error_sink: Arc::new(TracingErrorSink),
            id: None,
        }
    }

    /// Handle one text-change event from the host UI.
    ///
    /// Resolution against the current candidates happens before this returns;
    /// the candidate fetch is debounced and runs in the background. Input on a
    /// disabled control is rejected. Outside a Tokio runtime the fetch is
    /// skipped with a warning.
    pub fn input_changed(&mut self, text: impl Into<String>) {
        let text = text.into();
        if self.field.disabled() {
            debug!(field = %self.list_id, "input rejected while disabled");
            return;
        }
        self.field.mark_touched();
        self.resolve_and_commit(&text);
        self.pipeline.schedule(text);
    }

    fn resolve_and_commit(&mut self, text: &str) {
        let resolution = if text.is_empty() {
            Resolution::Cleared
        } else if let Some(convert) = self.free_text.as_ref() {
            Resolution::Assigned(convert(text))
        } else {
            match self.candidates.resolve(text) {
                Some(found) => Resolution::Assigned(found.clone()),
                None => Resolution::Unresolved,
            }
        };

        match resolution {
            Resolution::Cleared => self.commit(None, text),
            Resolution::Assigned(value) => self.commit(Some(value), text),
            Resolution::Unresolved => {
                self.field.set_display_text(text.to_string());
                if self.config.notify_unresolved {
                    self.field.notify_change();
                }
            }
        }
    }

    fn commit(&mut self, value: Option<T>, typed: &str) {
        let display_text = if self.config.require_exact_match {
            (self.format)(value.as_ref())
        } else {
            typed.to_string()
        };
        self.field.write(value, display_text);
        self.field.notify_change();
    }

    /// Restore the display text to the label of the bound value. Hosts call
    /// this when the field loses focus; free-text fields keep what was typed.
    pub fn reset_input_text(&mut self) {
        if self.config.require_exact_match {
            let display_text = (self.format)(self.field.value());
            self.field.set_display_text(display_text);
        }
    }

    /// `true` when the text box shows exactly the label of the bound value
    /// (or the field is in free-text mode).
    pub fn is_valid_selection(&self) -> bool {
        !self.config.require_exact_match || self.field.display_text() == (self.format)(self.field.value())
    }

    /// Clear the `touched` flag, for example when the host form is reset.
    pub fn reset_touched(&mut self) {
        self.field.reset_touched();
    }

    /// Wait for the next fetch completion. Never resolves while no fetch is
    /// in flight.
    pub async fn next_outcome(&mut self) -> Option<SuggestionOutcome<T>> {
        self.pipeline.next_outcome().await
    }

    /// Apply a fetch completion if it belongs to the most recently issued
    /// fetch; otherwise drop it.
    pub fn apply_outcome(&mut self, outcome: SuggestionOutcome<T>) -> OutcomeDisposition {
        let SuggestionOutcome { sequence, query, result } = outcome;
        if !self.pipeline.is_latest(sequence) {
            debug!(
                field = %self.list_id,
                query = %query,
                sequence,
                latest = self.pipeline.latest_issued(),
                "dropping superseded suggestions"
            );
            return OutcomeDisposition::Superseded;
        }
        self.pipeline.settle(sequence);

        match result {
            Ok(values) => {
                let format = Arc::clone(&self.format);
                self.candidates
                    .replace(values.into_iter().map(|value| (format(Some(&value)), value)));
                debug!(
                    field = %self.list_id,
                    query = %query,
                    sequence,
                    item_count = self.candidates.len(),
                    "suggestions applied"
                );
                OutcomeDisposition::Applied(self.candidates.len())
            }
            Err(error) => {
                self.error_sink.report(&self.list_id, &query, &error);
                OutcomeDisposition::Failed
            }
        }
    }

    /// Apply every completion that has already arrived. Returns how many
    /// outcomes were processed (applied, superseded or failed).
    pub fn drain_outcomes(&mut self) -> usize {
        let mut processed = 0;
        while let Some(outcome) = self.pipeline.try_next_outcome() {
            self.apply_outcome(outcome);
            processed += 1;
        }
        processed
    }

    pub fn value(&self) -> Option<&T> {
        self.field.value()
    }

    pub fn display_text(&self) -> &str {
        self.field.display_text()
    }

    pub fn touched(&self) -> bool {
        self.field.touched()
    }

    pub fn disabled(&self) -> bool {
        self.field.disabled()
    }

    pub fn candidates(&self) -> &CandidateStore<T> {
        &self.candidates
    }

    /// Labels to render in the suggestion list, in fetch order.
    pub fn suggestion_labels(&self) -> impl Iterator<Item = &str> {
        self.candidates.labels()
    }

    pub fn format_candidate(&self, value: Option<&T>) -> String {
        (self.format)(value)
    }

    /// Element identifier of this control's candidate list.
    pub fn list_id(&self) -> &str {
        &self.list_id
    }

    pub fn config(&self) -> &TypeaheadConfig {
        &self.config
    }

    pub fn phase(&self) -> PipelinePhase {
        self.pipeline.phase()
    }

    pub fn is_loading(&self) -> bool {
        self.phase() != PipelinePhase::Idle
    }
}

impl<T> BindableField<T> for Typeahead<T>
where
    T: Clone + Send + 'static,
{
    fn write_value(&mut self, value: Option<T>) {
        let display_text = (self.format)(value.as_ref());
        self.field.write(value, display_text);
    }

    fn on_change_subscribe(&mut self, callback: ChangeCallback<T>) {
        self.field.set_on_change(callback);
    }

    fn on_touched_subscribe(&mut self, callback: TouchedCallback) {
        self.field.set_on_touched(callback);
    }

    fn set_disabled(&mut self, disabled: bool) {
        self.field.set_disabled(disabled);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::SuggestionError, source::FnSource};
    use async_trait::async_trait;
    use std::{
        collections::HashMap,
        sync::{
            Mutex,
            atomic::{AtomicUsize, Ordering},
        },
    };
    use tokio::time::sleep;

    #[derive(Debug, Clone, PartialEq)]
    struct Person {
        id: u32,
        name: String,
    }

    fn person(id: u32, name: &str) -> Person {
        Person { id, name: name.into() }
    }

    #[derive(Clone)]
    enum Script {
        Ready(Duration, Vec<Person>),
        Fail,
    }

    #[derive(Default)]
    struct ScriptedSource {
        scripts: HashMap<String, Script>,
        queries: Mutex<Vec<String>>,
    }

    impl ScriptedSource {
        fn with(mut self, query: &str, delay_ms: u64, people: Vec<Person>) -> Self {
            self.scripts
                .insert(query.into(), Script::Ready(Duration::from_millis(delay_ms), people));
            self
        }

        fn failing(mut self, query: &str) -> Self {
            self.scripts.insert(query.into(), Script::Fail);
            self
        }

        fn queries(&self) -> Vec<String> {
            self.queries.lock().expect("queries lock").clone()
        }
    }

    #[async_trait]
    impl SuggestionSource<Person> for ScriptedSource {
        async fn suggestions_for(&self, text: &str) -> Result<Vec<Person>, SuggestionError> {
            self.queries.lock().expect("queries lock").push(text.to_string());
            match self.scripts.get(text).cloned() {
                Some(Script::Ready(delay, people)) => {
                    sleep(delay).await;
                    Ok(people)
                }
                Some(Script::Fail) => Err(SuggestionError::Unavailable("backend down".into())),
                None => Ok(Vec::new()),
            }
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        reports: Mutex<Vec<String>>,
    }

    impl FetchErrorSink for RecordingSink {
        fn report(&self, _field: &str, query: &str, _error: &SuggestionError) {
            self.reports.lock().expect("reports lock").push(query.to_string());
        }
    }

    fn format_person(value: Option<&Person>) -> String {
        value.map(|person| person.name.clone()).unwrap_or_default()
    }

    fn person_typeahead(source: Arc<ScriptedSource>) -> Typeahead<Person> {
        Typeahead::<Person>::builder(source, Arc::new(format_person))
            .id_generator(&SequentialIds::new())
            .build()
            .expect("strict typeahead")
    }

    fn count_changes(control: &mut Typeahead<Person>) -> Arc<AtomicUsize> {
        let changes = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&changes);
        control.on_change_subscribe(Box::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        changes
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_keystrokes_issue_one_fetch_for_last_text() {
        let source = Arc::new(ScriptedSource::default().with("joh", 0, vec![person(1, "John Smith")]));
        let mut control = person_typeahead(Arc::clone(&source));

        for text in ["j", "jo", "joh"] {
            control.input_changed(text);
            sleep(Duration::from_millis(100)).await;
        }
        assert_eq!(control.phase(), PipelinePhase::AwaitingDebounce);
        assert!(source.queries().is_empty());

        sleep(Duration::from_millis(400)).await;
        assert_eq!(source.queries(), vec!["joh".to_string()]);
        assert_eq!(control.drain_outcomes(), 1);
        assert_eq!(control.suggestion_labels().collect::<Vec<_>>(), vec!["John Smith"]);
        assert_eq!(control.phase(), PipelinePhase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_early_fetch_never_overwrites_later_result() {
        let source = Arc::new(
            ScriptedSource::default()
                .with("ab", 1_000, vec![person(1, "Abby")])
                .with("abc", 10, vec![person(2, "Abcott")]),
        );
        let mut control = person_typeahead(Arc::clone(&source));

        control.input_changed("ab");
        sleep(Duration::from_millis(350)).await;
        control.input_changed("abc");
        sleep(Duration::from_millis(2_000)).await;
        assert_eq!(source.queries(), vec!["ab".to_string(), "abc".to_string()]);

        let first = control.next_outcome().await.expect("fast outcome");
        assert_eq!(first.query(), "abc");
        assert_eq!(control.apply_outcome(first), OutcomeDisposition::Applied(1));
        let second = control.next_outcome().await.expect("slow outcome");
        assert_eq!(second.query(), "ab");
        assert_eq!(control.apply_outcome(second), OutcomeDisposition::Superseded);

        assert_eq!(control.candidates().resolve("Abcott"), Some(&person(2, "Abcott")));
        assert!(control.candidates().resolve("Abby").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn stale_result_arriving_before_newer_one_is_dropped() {
        let source = Arc::new(
            ScriptedSource::default()
                .with("ab", 500, vec![person(1, "Abby")])
                .with("abc", 1_000, vec![person(2, "Abcott")]),
        );
        let mut control = person_typeahead(Arc::clone(&source));

        control.input_changed("ab");
        sleep(Duration::from_millis(350)).await;
        control.input_changed("abc");
        sleep(Duration::from_millis(550)).await;

        // "ab" has completed, "abc" has been issued but is still running.
        assert_eq!(control.phase(), PipelinePhase::Fetching);
        assert_eq!(control.drain_outcomes(), 1);
        assert!(control.candidates().is_empty());

        sleep(Duration::from_millis(1_000)).await;
        assert_eq!(control.drain_outcomes(), 1);
        assert_eq!(control.suggestion_labels().collect::<Vec<_>>(), vec!["Abcott"]);
    }

    #[tokio::test(start_paused = true)]
    async fn exact_label_resolves_and_clearing_keeps_store() {
        let john = person(1, "John Smith");
        let source = Arc::new(ScriptedSource::default().with("jo", 0, vec![john.clone()]));
        let mut control = person_typeahead(source);

        control.input_changed("jo");
        assert!(control.value().is_none());
        sleep(Duration::from_millis(350)).await;
        control.drain_outcomes();

        control.input_changed("John Smith");
        assert_eq!(control.value(), Some(&john));
        assert_eq!(control.display_text(), "John Smith");
        assert!(control.is_valid_selection());

        control.input_changed("");
        assert!(control.value().is_none());
        assert_eq!(control.candidates().resolve("John Smith"), Some(&john));
    }

    #[tokio::test(start_paused = true)]
    async fn miss_keeps_previous_selection_until_reset() {
        let john = person(1, "John Smith");
        let source = Arc::new(ScriptedSource::default().with("jo", 0, vec![john.clone()]));
        let mut control = person_typeahead(source);
        let changes = count_changes(&mut control);

        control.input_changed("jo");
        sleep(Duration::from_millis(350)).await;
        control.drain_outcomes();
        control.input_changed("John Smith");
        control.input_changed("John Smit");

        assert_eq!(control.value(), Some(&john));
        assert_eq!(control.display_text(), "John Smit");
        assert!(!control.is_valid_selection());
        assert_eq!(changes.load(Ordering::SeqCst), 3);

        control.reset_input_text();
        assert_eq!(control.display_text(), "John Smith");
        assert!(control.is_valid_selection());
    }

    #[tokio::test(start_paused = true)]
    async fn unresolved_keystrokes_can_stay_silent() {
        let source = Arc::new(ScriptedSource::default());
        let mut control = Typeahead::<Person>::builder(source, Arc::new(format_person))
            .config(TypeaheadConfig::default().with_notify_unresolved(false))
            .build()
            .expect("strict typeahead");
        let changes = count_changes(&mut control);

        control.input_changed("zz");
        assert_eq!(changes.load(Ordering::SeqCst), 0);
        control.input_changed("");
        assert_eq!(changes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_fetch_leaves_state_untouched() {
        let sink = Arc::new(RecordingSink::default());
        let source = Arc::new(
            ScriptedSource::default()
                .with("jo", 0, vec![person(1, "John Smith")])
                .failing("boom"),
        );
        let mut control = Typeahead::<Person>::builder(source, Arc::new(format_person))
            .error_sink(Arc::clone(&sink) as Arc<dyn FetchErrorSink>)
            .build()
            .expect("strict typeahead");
        let changes = count_changes(&mut control);

        control.input_changed("jo");
        sleep(Duration::from_millis(350)).await;
        control.drain_outcomes();
        let before = control.candidates().clone();

        control.input_changed("boom");
        let changes_after_keystroke = changes.load(Ordering::SeqCst);
        sleep(Duration::from_millis(350)).await;
        let outcome = control.next_outcome().await.expect("failed outcome");
        assert_eq!(control.apply_outcome(outcome), OutcomeDisposition::Failed);

        assert_eq!(control.candidates(), &before);
        assert_eq!(changes.load(Ordering::SeqCst), changes_after_keystroke);
        assert_eq!(*sink.reports.lock().expect("reports lock"), vec!["boom".to_string()]);
        assert_eq!(control.phase(), PipelinePhase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn touched_is_monotonic_until_explicit_reset() {
        let source = Arc::new(ScriptedSource::default());
        let mut control = person_typeahead(source);
        let touches = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&touches);
        control.on_touched_subscribe(Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        assert!(!control.touched());
        control.input_changed("a");
        control.input_changed("");
        control.write_value(Some(person(4, "Dora")));
        assert!(control.touched());
        assert_eq!(touches.load(Ordering::SeqCst), 1);

        control.reset_touched();
        assert!(!control.touched());
    }

    #[tokio::test(start_paused = true)]
    async fn free_text_value_is_assigned_immediately() {
        let source: Arc<FnSource<_, String>> =
            Arc::new(FnSource::new(|_text: String| async move { Ok::<Vec<String>, SuggestionError>(Vec::new()) }));
        let mut control = Typeahead::<String>::builder(source, Arc::new(|value: Option<&String>| value.cloned().unwrap_or_default()))
            .free_text()
            .build()
            .expect("free-text typeahead");

        control.input_changed("xyz");
        assert_eq!(control.value().map(String::as_str), Some("xyz"));
        assert_eq!(control.display_text(), "xyz");
        assert!(control.is_valid_selection());
    }

    #[test]
    fn non_strict_without_conversion_is_rejected() {
        let source = Arc::new(ScriptedSource::default());
        let result = Typeahead::<Person>::builder(source, Arc::new(format_person))
            .config(TypeaheadConfig::default().with_require_exact_match(false))
            .build();
        assert_eq!(result.err(), Some(TypeaheadError::FreeTextUnsupported));
    }

    #[test]
    fn write_value_is_silent_and_formats_display() {
        let source = Arc::new(ScriptedSource::default());
        let mut control = person_typeahead(source);
        let changes = count_changes(&mut control);

        control.write_value(Some(person(7, "Greta Berg")));
        assert_eq!(control.display_text(), "Greta Berg");
        assert_eq!(control.value(), Some(&person(7, "Greta Berg")));
        assert!(!control.touched());
        assert_eq!(changes.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn disabled_control_rejects_input() {
        let source = Arc::new(ScriptedSource::default());
        let mut control = person_typeahead(source);
        control.write_value(Some(person(7, "Greta Berg")));
        control.set_disabled(true);

        control.input_changed("");
        assert_eq!(control.value(), Some(&person(7, "Greta Berg")));
        assert!(!control.touched());

        control.set_disabled(false);
        control.input_changed("");
        assert!(control.value().is_none());
    }

    #[test]
    fn resolution_works_without_runtime() {
        let source = Arc::new(ScriptedSource::default());
        let mut control = person_typeahead(source);
        control.input_changed("anything");
        assert!(control.touched());
        assert_eq!(control.phase(), PipelinePhase::Idle);
    }

    #[test]
    fn list_ids_come_from_injected_generator() {
        let ids = SequentialIds::new();
        let first = Typeahead::<Person>::builder(Arc::new(ScriptedSource::default()), Arc::new(format_person))
            .id_generator(&ids)
            .build()
            .expect("first");
        let second = Typeahead::<Person>::builder(Arc::new(ScriptedSource::default()), Arc::new(format_person))
            .id_generator(&ids)
            .build()
            .expect("second");
        assert_eq!(first.list_id(), "typeahead-candidates-0");
        assert_eq!(second.list_id(), "typeahead-candidates-1");
    }
}
