//! Field state and the bindable form-field contract.
//!
//! A host form talks to any input control through [`BindableField`]: it can
//! push a value in, subscribe to value changes and to the first interaction,
//! and toggle the disabled flag. [`FieldState`] is the storage behind that
//! contract and is owned by exactly one control.

use std::fmt;

/// Callback invoked with the newly committed value.
pub type ChangeCallback<T> = Box<dyn FnMut(Option<&T>) + Send>;

/// Callback invoked once, on the first user interaction.
pub type TouchedCallback = Box<dyn FnMut() + Send>;

/// Capabilities a host form binds to.
pub trait BindableField<T> {
    /// Programmatic write from the host. Does not mark the field touched and
    /// does not notify the change subscriber.
    fn write_value(&mut self, value: Option<T>);

    /// Register the change listener, replacing any previous one.
    fn on_change_subscribe(&mut self, callback: ChangeCallback<T>);

    /// Register the touched listener, replacing any previous one.
    fn on_touched_subscribe(&mut self, callback: TouchedCallback);

    fn set_disabled(&mut self, disabled: bool);
}

/// Value, display text and interaction flags of one control.
pub struct FieldState<T> {
    value: Option<T>,
    display_text: String,
    touched: bool,
    disabled: bool,
    on_change: ChangeCallback<T>,
    on_touched: TouchedCallback,
}

impl<T> Default for FieldState<T> {
    fn default() -> Self {
        Self {
            value: None,
            display_text: String::new(),
            touched: false,
            disabled: false,
            on_change: Box::new(|_| {}),
            on_touched: Box::new(|| {}),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for FieldState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldState")
            .field("value", &self.value)
            .field("display_text", &self.display_text)
            .field("touched", &self.touched)
            .field("disabled", &self.disabled)
            .finish_non_exhaustive()
    }
}

impl<T> FieldState<T> {
    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn display_text(&self) -> &str {
        &self.display_text
    }

    pub fn touched(&self) -> bool {
        self.touched
    }

    pub fn disabled(&self) -> bool {
        self.disabled
    }

    pub(crate) fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    pub(crate) fn set_display_text(&mut self, display_text: String) {
        self.display_text = display_text;
    }

    /// Replace value and display text silently.
    pub(crate) fn write(&mut self, value: Option<T>, display_text: String) {
        self.value = value;
        self.display_text = display_text;
    }

    /// Fire the change listener with the current value.
    pub(crate) fn notify_change(&mut self) {
        (self.on_change)(self.value.as_ref());
    }

    /// Flip `touched` on the first call and notify the touched listener.
    /// Returns `true` only for that first call.
    pub(crate) fn mark_touched(&mut self) -> bool {
        if self.touched {
            return false;
        }
        self.touched = true;
        (self.on_touched)();
        true
    }

    pub(crate) fn reset_touched(&mut self) {
        self.touched = false;
    }

    pub(crate) fn set_on_change(&mut self, callback: ChangeCallback<T>) {
        self.on_change = callback;
    }

    pub(crate) fn set_on_touched(&mut self, callback: TouchedCallback) {
        self.on_touched = callback;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    #[test]
    fn callbacks_default_to_no_ops() {
        let mut state: FieldState<u32> = FieldState::default();
        state.notify_change();
        assert!(state.mark_touched());
        assert!(state.touched());
    }

    #[test]
    fn touched_listener_fires_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut state: FieldState<u32> = FieldState::default();
        let counter = Arc::clone(&calls);
        state.set_on_touched(Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        assert!(state.mark_touched());
        assert!(!state.mark_touched());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn re_registration_replaces_change_listener() {
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let mut state: FieldState<u32> = FieldState::default();

        let counter = Arc::clone(&first);
        state.set_on_change(Box::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        let counter = Arc::clone(&second);
        state.set_on_change(Box::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        state.notify_change();

        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }
}
