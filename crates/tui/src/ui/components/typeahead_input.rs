//! Terminal widget around a [`Typeahead`] control.
//!
//! The widget owns the editable text buffer and the highlighted suggestion.
//! Every edit is forwarded to the control as a text-change event; the control
//! decides what the bound value is. After each event the buffer is brought
//! back in line with the control's display text.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use paddock_typeahead::{BindableField, ChangeCallback, OutcomeDisposition, SuggestionOutcome, TouchedCallback, Typeahead};
use ratatui::{
    Frame,
    layout::{Position, Rect},
    text::{Line, Span},
    widgets::{Clear, List, ListItem, ListState, Paragraph},
};
use tracing::debug;

use super::text_input::TextInputState;
use crate::ui::theme::{
    Theme,
    theme_helpers::{block, input_style, title},
};

/// Maximum suggestion rows shown below a focused field.
pub const MAX_VISIBLE_SUGGESTIONS: u16 = 5;

const THROBBER_FRAMES: [&str; 4] = ["⠋", "⠙", "⠸", "⠴"];

/// Whether a key was handled by the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Consumed,
    Ignored,
}

pub struct TypeaheadInput<T> {
    label: &'static str,
    control: Typeahead<T>,
    text: TextInputState,
    highlighted: Option<usize>,
}

impl<T> TypeaheadInput<T>
where
    T: Clone + Send + 'static,
{
    pub fn new(label: &'static str, control: Typeahead<T>) -> Self {
        let mut text = TextInputState::new();
        text.set_input(control.display_text());
        Self {
            label,
            control,
            text,
            highlighted: None,
        }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn control(&self) -> &Typeahead<T> {
        &self.control
    }

    pub fn control_mut(&mut self) -> &mut Typeahead<T> {
        &mut self.control
    }

    pub fn text(&self) -> &str {
        self.text.input()
    }

    pub fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    /// Route a key press. Editing keys always reach the control, even when
    /// disabled; the control rejects them and the buffer snaps back.
    pub fn handle_key(&mut self, key: KeyEvent) -> KeyOutcome {
        match key.code {
            KeyCode::Char(c) if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
                self.text.insert_char(c);
                self.edited();
            }
            KeyCode::Backspace => {
                if self.text.backspace() {
                    self.edited();
                }
            }
            KeyCode::Delete => {
                if self.text.delete() {
                    self.edited();
                }
            }
            KeyCode::Left => self.text.move_left(),
            KeyCode::Right => self.text.move_right(),
            KeyCode::Home => self.text.move_home(),
            KeyCode::End => self.text.move_end(),
            KeyCode::Down => self.move_highlight(1),
            KeyCode::Up => self.move_highlight(-1),
            KeyCode::Enter => {
                if !self.accept_highlighted() {
                    return KeyOutcome::Ignored;
                }
            }
            KeyCode::Tab if self.highlighted.is_some() => {
                self.accept_highlighted();
            }
            KeyCode::Esc => self.blur(),
            _ => return KeyOutcome::Ignored,
        }
        KeyOutcome::Consumed
    }

    fn edited(&mut self) {
        self.highlighted = None;
        self.control.input_changed(self.text.input());
        self.sync_text();
    }

    fn sync_text(&mut self) {
        if self.text.input() != self.control.display_text() {
            self.text.set_input(self.control.display_text());
        }
    }

    fn move_highlight(&mut self, step: isize) {
        let count = self.control.candidates().len();
        if count == 0 {
            self.highlighted = None;
            return;
        }
        let next = match self.highlighted {
            None if step > 0 => 0,
            None => count - 1,
            Some(current) => (current as isize + step).rem_euclid(count as isize) as usize,
        };
        self.highlighted = Some(next);
    }

    /// Copy the highlighted label into the field as if it had been typed.
    fn accept_highlighted(&mut self) -> bool {
        let Some(label) = self
            .highlighted
            .and_then(|index| self.control.suggestion_labels().nth(index))
            .map(str::to_owned)
        else {
            return false;
        };
        debug!(field = %self.control.list_id(), label = %label, "suggestion accepted");
        self.text.set_input(label);
        self.edited();
        true
    }

    /// Focus left the field: revert unmatched text and close the list.
    pub fn blur(&mut self) {
        self.highlighted = None;
        self.control.reset_input_text();
        self.sync_text();
    }

    pub fn apply_outcome(&mut self, outcome: SuggestionOutcome<T>) -> OutcomeDisposition {
        let disposition = self.control.apply_outcome(outcome);
        if matches!(disposition, OutcomeDisposition::Applied(_)) {
            let count = self.control.candidates().len();
            self.highlighted = self.highlighted.filter(|index| *index < count);
        }
        disposition
    }

    /// Apply every completion already delivered to the control.
    pub fn drain_outcomes(&mut self) -> usize {
        let processed = self.control.drain_outcomes();
        let count = self.control.candidates().len();
        self.highlighted = self.highlighted.filter(|index| *index < count);
        processed
    }

    /// Height of the suggestion popup including borders, or zero when there
    /// is nothing to show.
    pub fn suggestion_height(&self) -> u16 {
        let rows = self.control.candidates().len().min(MAX_VISIBLE_SUGGESTIONS as usize) as u16;
        if rows == 0 { 0 } else { rows + 2 }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, theme: &dyn Theme, focused: bool, throbber_idx: usize) {
        let invalid = self.control.touched() && !self.control.is_valid_selection();
        let mut heading = vec![title(theme, format!(" {} ", self.label))];
        if self.control.is_loading() {
            let frame_symbol = THROBBER_FRAMES[throbber_idx % THROBBER_FRAMES.len()];
            heading.push(Span::styled(format!("{frame_symbol} "), theme.accent_emphasis_style()));
        }
        if self.control.disabled() {
            heading.push(Span::styled("(locked) ", theme.text_muted_style()));
        }

        let field_block = block(theme, Line::from(heading), focused, invalid);
        let inner = field_block.inner(area);
        let paragraph = Paragraph::new(self.text.input())
            .style(input_style(theme, !invalid, focused))
            .block(field_block);
        frame.render_widget(paragraph, area);

        if focused && inner.width > 0 && inner.height > 0 {
            let x = inner.x.saturating_add(self.text.cursor_columns()).min(inner.right().saturating_sub(1));
            frame.set_cursor_position(Position::new(x, inner.y));
        }
    }

    /// Draw the suggestion list directly below `field_area`, clipped to `bounds`.
    pub fn render_suggestions(&self, frame: &mut Frame, field_area: Rect, bounds: Rect, theme: &dyn Theme) {
        let height = self.suggestion_height();
        if height == 0 {
            return;
        }
        let popup = Rect {
            x: field_area.x,
            y: field_area.bottom(),
            width: field_area.width,
            height,
        }
        .intersection(bounds);
        if popup.height < 3 {
            return;
        }

        let items: Vec<ListItem> = self
            .control
            .suggestion_labels()
            .map(|label| ListItem::new(label.to_owned()).style(theme.text_primary_style()))
            .collect();
        let list = List::new(items)
            .block(block(theme, Line::from(title(theme, " suggestions ")), false, false))
            .highlight_style(theme.selection_style())
            .highlight_symbol("› ");
        let mut state = ListState::default().with_selected(self.highlighted);

        frame.render_widget(Clear, popup);
        frame.render_stateful_widget(list, popup, &mut state);
    }
}

impl<T> BindableField<T> for TypeaheadInput<T>
where
    T: Clone + Send + 'static,
{
    fn write_value(&mut self, value: Option<T>) {
        self.highlighted = None;
        self.control.write_value(value);
        self.sync_text();
    }

    fn on_change_subscribe(&mut self, callback: ChangeCallback<T>) {
        self.control.on_change_subscribe(callback);
    }

    fn on_touched_subscribe(&mut self, callback: TouchedCallback) {
        self.control.on_touched_subscribe(callback);
    }

    fn set_disabled(&mut self, disabled: bool) {
        self.control.set_disabled(disabled);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paddock_typeahead::{FnSource, SuggestionError, SuggestionSource, format_with};
    use std::{sync::Arc, time::Duration};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text<T: Clone + Send + 'static>(input: &mut TypeaheadInput<T>, text: &str) {
        for c in text.chars() {
            input.handle_key(key(KeyCode::Char(c)));
        }
    }

    fn colour_input() -> TypeaheadInput<String> {
        let source: Arc<dyn SuggestionSource<String>> = Arc::new(FnSource::new(|text: String| async move {
            let all = ["Red", "Rose", "Ruby", "Blue"];
            Ok::<_, SuggestionError>(
                all.iter()
                    .filter(|colour| colour.starts_with(text.as_str()))
                    .map(|colour| colour.to_string())
                    .collect(),
            )
        }));
        let control = Typeahead::builder(source, format_with(|value: Option<&String>| value.cloned().unwrap_or_default()))
            .debounce_interval(Duration::from_millis(100))
            .build()
            .expect("strict control");
        TypeaheadInput::new("Colour", control)
    }

    async fn settle<T: Clone + Send + 'static>(input: &mut TypeaheadInput<T>) {
        tokio::time::sleep(Duration::from_millis(150)).await;
        tokio::task::yield_now().await;
        input.drain_outcomes();
    }

    #[tokio::test(start_paused = true)]
    async fn highlighted_suggestion_is_accepted_on_enter() {
        let mut input = colour_input();
        type_text(&mut input, "R");
        settle(&mut input).await;
        assert_eq!(input.control().suggestion_labels().collect::<Vec<_>>(), vec!["Red", "Rose", "Ruby"]);

        input.handle_key(key(KeyCode::Down));
        input.handle_key(key(KeyCode::Down));
        assert_eq!(input.highlighted(), Some(1));
        assert_eq!(input.handle_key(key(KeyCode::Enter)), KeyOutcome::Consumed);

        assert_eq!(input.text(), "Rose");
        assert_eq!(input.control().value().map(String::as_str), Some("Rose"));
        assert!(input.highlighted().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn highlight_wraps_around() {
        let mut input = colour_input();
        type_text(&mut input, "R");
        settle(&mut input).await;

        input.handle_key(key(KeyCode::Up));
        assert_eq!(input.highlighted(), Some(2));
        input.handle_key(key(KeyCode::Down));
        assert_eq!(input.highlighted(), Some(0));
    }

    #[tokio::test(start_paused = true)]
    async fn escape_reverts_unmatched_text() {
        let mut input = colour_input();
        type_text(&mut input, "R");
        settle(&mut input).await;
        type_text(&mut input, "ed");
        assert_eq!(input.control().value().map(String::as_str), Some("Red"));

        input.handle_key(key(KeyCode::Backspace));
        assert_eq!(input.text(), "Re");
        assert!(!input.control().is_valid_selection());

        input.handle_key(key(KeyCode::Esc));
        assert_eq!(input.text(), "Red");
        assert!(input.control().is_valid_selection());
    }

    #[tokio::test(start_paused = true)]
    async fn enter_without_highlight_is_ignored() {
        let mut input = colour_input();
        assert_eq!(input.handle_key(key(KeyCode::Enter)), KeyOutcome::Ignored);
        assert_eq!(input.handle_key(key(KeyCode::Tab)), KeyOutcome::Ignored);
    }

    #[tokio::test(start_paused = true)]
    async fn disabled_field_keeps_its_text() {
        let mut input = colour_input();
        input.write_value(Some("Blue".to_string()));
        input.set_disabled(true);
        type_text(&mut input, "x");
        assert_eq!(input.text(), "Blue");
        assert!(!input.control().touched());
    }

    #[tokio::test(start_paused = true)]
    async fn suggestion_height_tracks_candidates() {
        let mut input = colour_input();
        assert_eq!(input.suggestion_height(), 0);
        type_text(&mut input, "R");
        settle(&mut input).await;
        assert_eq!(input.suggestion_height(), 5);
    }
}
