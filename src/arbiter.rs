//! Output Arbiter (C8) — spec.md §4.8.
//!
//! Consumes a [`Diff`](crate::domain::Diff) and commits it to the focused
//! client using one of three strategies, chosen per-client:
//!
//! - [`Strategy::Synthesize`]: synthetic backspace + insert keystrokes
//!   against a generic text field, via [`KeystrokeInjector`].
//! - [`Strategy::MarkedText`]: IME-style composition the host app owns, via
//!   [`ImeClient`].
//! - [`Strategy::DirectReplace`]: atomic whole-word rewrite for
//!   known-problematic overlay apps that can't commit marked text cleanly.
//!
//! Not present in the teacher as a distinct module — the teacher's FFI
//! leaves injection entirely to the host app. Supplemented from
//! `other_examples/…vietflux-ime…keyboard.rs` (the backspace-then-insert
//! `SendInput` pattern and its injected-key recursion guard, generalized here
//! into [`KeystrokeInjector`] so the crate stays host-OS-agnostic) and the
//! `client`-parameterized marked-text contract from spec.md §6
//! (`insert_text`/`set_marked_text`/`marked_range`/`selected_range`/`bundle_id`),
//! modeled as [`ImeClient`].

use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

use crate::domain::diff::Diff;

/// Per-client injection/composition strategy (spec.md §3's `ArbiterClientState::strategy`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Synthesize,
    MarkedText,
    DirectReplace,
}

/// Synthesizes backspace/insert keystrokes against a generic text field.
/// Implemented by the host per target OS (Windows `SendInput`, macOS
/// `CGEvent`, a test double, ...).
pub trait KeystrokeInjector {
    fn backspace(&mut self, count: u16) -> Result<(), InjectionError>;
    fn insert(&mut self, text: &str) -> Result<(), InjectionError>;

    /// Peek the `count` on-screen glyphs immediately left of the cursor, if
    /// the host's accessibility API can answer without side effects. Used
    /// only by the Chrome/autocomplete compensation (spec.md §4.8); hosts
    /// that can't support this return `None` and compensation is skipped.
    fn peek_trailing(&self, _count: u16) -> Option<String> {
        None
    }
}

/// A host app's native composition (IMK-style marked text) surface,
/// spec.md §6's `imk_handle_key` client parameter.
pub trait ImeClient {
    fn insert_text(&mut self, text: &str, replace_range: Option<(u32, u32)>);
    fn set_marked_text(&mut self, text: &str, cursor_range: (u32, u32));
    fn marked_range(&self) -> Option<(u32, u32)>;
    fn selected_range(&self) -> (u32, u32);
    fn bundle_id(&self) -> &str;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InjectionError(pub String);

impl std::fmt::Display for InjectionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "injection failed: {}", self.0)
    }
}

impl std::error::Error for InjectionError {}

/// Per-focused-client state the Arbiter tracks across keystrokes (spec.md §3).
#[derive(Debug, Clone)]
pub struct ArbiterClientState {
    pub strategy: Strategy,
    /// Glyphs attributable to us since the last reset, for `DirectReplace`.
    pub tracked_word_length: u16,
    /// Cursor position where the current marked region began, for `MarkedText`.
    pub marked_start: Option<u32>,
    pub last_known_cursor: i64,
    /// Set after 3 failed injection attempts; forces backspace-then-insert
    /// and never select-then-replace (spec.md §7's "AXDirectFallback" rule).
    pub unreliable: bool,
    retry_count: u8,
}

impl Default for ArbiterClientState {
    fn default() -> Self {
        Self {
            strategy: Strategy::Synthesize,
            tracked_word_length: 0,
            marked_start: None,
            last_known_cursor: 0,
            unreliable: false,
            retry_count: 0,
        }
    }
}

const MAX_INJECTION_RETRIES: u8 = 3;
const WAIT_FOR_PENDING_TIMEOUT: Duration = Duration::from_millis(50);

/// Drives commitment of one [`Diff`] to one focused client, plus the
/// injection-lock bookkeeping spec.md §4.8 calls the "Firefox dịch bug" fix:
/// a backspace+insert pair must complete as an atomic unit before the next
/// keystroke is admitted.
pub struct Arbiter {
    pub client_state: ArbiterClientState,
    pending: Arc<(Mutex<bool>, Condvar)>,
}

impl Default for Arbiter {
    fn default() -> Self {
        Self::new()
    }
}

impl Arbiter {
    pub fn new() -> Self {
        Self {
            client_state: ArbiterClientState::default(),
            pending: Arc::new((Mutex::new(false), Condvar::new())),
        }
    }

    pub fn with_strategy(strategy: Strategy) -> Self {
        let mut a = Self::new();
        a.client_state.strategy = strategy;
        a
    }

    /// Block until the last injection batch completes, up to a bounded
    /// timeout (spec.md §5: default 50ms). The Session Controller calls this
    /// before accepting the next key when the host runs injection on a
    /// background pipeline.
    pub fn wait_for_pending(&self) {
        let (lock, cvar) = &*self.pending;
        let guard = lock.lock().unwrap_or_else(|e| e.into_inner());
        let _ = cvar
            .wait_timeout_while(guard, WAIT_FOR_PENDING_TIMEOUT, |pending| *pending)
            .unwrap_or_else(|e| e.into_inner());
    }

    fn mark_pending(&self, pending: bool) {
        let (lock, cvar) = &*self.pending;
        let mut guard = lock.lock().unwrap_or_else(|e| e.into_inner());
        *guard = pending;
        if !pending {
            cvar.notify_all();
        }
    }

    /// Commit `diff` via [`Strategy::Synthesize`]: backspace-then-insert,
    /// held across the pair via the injection lock so no keystroke can
    /// interleave. Retries up to 3 times on injection failure before
    /// flagging the client `unreliable` (spec.md §7); never falls back to
    /// select-then-replace.
    pub fn commit_synthesize(&mut self, diff: &Diff, injector: &mut dyn KeystrokeInjector, mid_sentence: bool, fix_autocomplete: bool) -> Result<(), InjectionError> {
        if !diff.consume() {
            return Ok(());
        }
        self.mark_pending(true);
        let result = self.try_inject(diff, injector, mid_sentence, fix_autocomplete);
        self.mark_pending(false);
        result
    }

    fn try_inject(&mut self, diff: &Diff, injector: &mut dyn KeystrokeInjector, mid_sentence: bool, fix_autocomplete: bool) -> Result<(), InjectionError> {
        let mut delete_count = diff.delete_count();
        let insert: String = diff.insert().iter().collect();

        let mut insert = insert;
        if fix_autocomplete && !mid_sentence && delete_count > 0 {
            let (new_delete_count, new_insert) = self.compensate_autocomplete(delete_count, &insert, injector);
            delete_count = new_delete_count;
            insert = new_insert;
        }

        loop {
            let outcome = (|| -> Result<(), InjectionError> {
                if delete_count > 0 {
                    injector.backspace(delete_count)?;
                }
                if !insert.is_empty() {
                    injector.insert(&insert)?;
                }
                Ok(())
            })();

            match outcome {
                Ok(()) => {
                    self.client_state.retry_count = 0;
                    return Ok(());
                }
                Err(e) => {
                    self.client_state.retry_count += 1;
                    log::warn!("arbiter injection attempt {} failed: {e}", self.client_state.retry_count);
                    if self.client_state.retry_count >= MAX_INJECTION_RETRIES {
                        self.client_state.unreliable = true;
                        self.client_state.strategy = Strategy::Synthesize;
                        return Err(e);
                    }
                }
            }
        }
    }

    /// Chrome/autocomplete fix: some clients auto-complete the character the
    /// user just typed; peek the trailing on-screen glyphs and reduce the
    /// backspace count if they already match the target prefix. Disabled
    /// when `mid_sentence` is set (spec.md §4.8: "unsafe — may delete user
    /// text to the right").
    fn compensate_autocomplete(&self, delete_count: u16, insert: &str, injector: &dyn KeystrokeInjector) -> (u16, String) {
        let Some(trailing) = injector.peek_trailing(delete_count) else {
            return (delete_count, insert.to_string());
        };
        let insert_chars: Vec<char> = insert.chars().collect();
        let trailing_chars: Vec<char> = trailing.chars().collect();
        let matched = trailing_chars
            .iter()
            .zip(insert_chars.iter())
            .take_while(|(a, b)| a == b)
            .count();
        let new_delete_count = delete_count.saturating_sub(matched as u16);
        let new_insert: String = insert_chars[matched..].iter().collect();
        (new_delete_count, new_insert)
    }

    /// Commit via [`Strategy::MarkedText`]: update the composed region to
    /// `current_word`, commit on word-break, cancel on reset. The Diff is
    /// only consulted to decide *when* to commit; the marked text itself is
    /// always set from `current_word`, not rebuilt from the Diff.
    pub fn commit_marked_text(&mut self, current_word: &str, word_break: bool, client: &mut dyn ImeClient) {
        if current_word.is_empty() {
            if client.marked_range().is_some() {
                client.set_marked_text("", (0, 0));
            }
            self.client_state.marked_start = None;
            return;
        }
        if self.client_state.marked_start.is_none() {
            self.client_state.marked_start = Some(client.selected_range().0);
        }
        let cursor = current_word.chars().count() as u32;
        client.set_marked_text(current_word, (cursor, cursor));
        if word_break {
            client.insert_text(current_word, client.marked_range());
            self.client_state.marked_start = None;
        }
    }

    /// Cancel an in-progress marked-text composition without committing it
    /// (a reset signal arrived mid-composition).
    pub fn cancel_marked_text(&mut self, client: &mut dyn ImeClient) {
        if client.marked_range().is_some() {
            client.set_marked_text("", (0, 0));
        }
        self.client_state.marked_start = None;
    }

    /// Commit via [`Strategy::DirectReplace`]: rewrite the tracked word
    /// atomically on each diff rather than composing marked text (the
    /// overlay-app exception: launchers/spotlight-style clients need two
    /// Enter presses to commit marked text).
    pub fn commit_direct_replace(&mut self, diff: &Diff, current_word_len: u16, client: &mut dyn ImeClient) {
        if !diff.consume() {
            return;
        }
        let cursor = client.selected_range().0;
        let start = cursor.saturating_sub(diff.delete_count() as u32);
        let insert: String = diff.insert().iter().collect();
        client.insert_text(&insert, Some((start, cursor)));
        self.client_state.tracked_word_length = current_word_len;
    }

    /// Detect protocol desync (spec.md §7): the marked region disappeared
    /// without us committing it. Treated as a cursor-move reset by the
    /// caller.
    pub fn detect_desync(&self, current_word_is_empty: bool, client: &dyn ImeClient) -> bool {
        !current_word_is_empty && self.client_state.marked_start.is_some() && client.marked_range().is_none()
    }

    pub fn reset_tracking(&mut self) {
        self.client_state.tracked_word_length = 0;
        self.client_state.marked_start = None;
    }
}
