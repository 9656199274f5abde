//! Lifecycle Coordinator (C9) — spec.md §4.9.
//!
//! Not a named module in the teacher (its FFI only exposes the binary
//! `ime_clear`/`ime_clear_all` split between "word boundary" and "cursor
//! moved"); this module generalizes that into the full signal table spec.md
//! §4.9 describes, as a thin [`Signal`] enum plus a dispatcher that turns
//! each signal into the [`crate::domain::session::ResetFlags`] pair
//! `Session::reset` already takes. It owns no state of its own — every
//! signal either resets the session or passes the key through untouched.

use crate::domain::session::ResetFlags;
use crate::engine::Engine;

/// One lifecycle signal the host routes through the coordinator before a
/// key reaches [`Engine::process_key`], per spec.md §4.9's table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// App activation / window focus change.
    FocusChange,
    MouseClick,
    /// Arrow keys, Home/End/Page — and Shift+arrow, per spec.md §9's
    /// "treat as cursor move" default for the otherwise-unhandled
    /// select-vs-move ambiguity.
    CursorKey,
    Tab,
    /// Enter while a composition is in progress: the caller commits the
    /// word first (word-break), then routes this signal.
    EnterInsideComposition,
    /// A modifier+key combo that bypasses the engine (Cmd, Option with
    /// temp-off-engine, Ctrl with temp-off-spelling).
    ModifierPassthrough,
    ImeActivate,
    ImeDeactivate,
}

impl Signal {
    /// The [`ResetFlags`] this signal resolves to, per spec.md §4.9's table.
    /// `ImeDeactivate` has no reset flags of its own — the caller commits
    /// any composition and unloads session state entirely instead of
    /// resetting in place.
    fn reset_flags(self) -> Option<ResetFlags> {
        match self {
            Signal::FocusChange => Some(ResetFlags { cursor_moved: true, preserve_mid_sentence: false }),
            Signal::MouseClick => Some(ResetFlags { cursor_moved: true, preserve_mid_sentence: false }),
            Signal::CursorKey => Some(ResetFlags { cursor_moved: true, preserve_mid_sentence: false }),
            Signal::Tab => Some(ResetFlags { cursor_moved: false, preserve_mid_sentence: false }),
            // mid_sentence must not be cleared: the user may have split a
            // line within existing text.
            Signal::EnterInsideComposition => Some(ResetFlags { cursor_moved: false, preserve_mid_sentence: true }),
            Signal::ModifierPassthrough => Some(ResetFlags { cursor_moved: true, preserve_mid_sentence: false }),
            // Unknown context on activation; conservatively assume mid-sentence.
            Signal::ImeActivate => Some(ResetFlags { cursor_moved: true, preserve_mid_sentence: false }),
            Signal::ImeDeactivate => None,
        }
    }
}

/// Dispatch `signal` against `engine`, applying the reset flags spec.md
/// §4.9's table prescribes. Always safe to call — see spec.md §5's
/// cancellation guarantee: this discards in-flight buffer state but never
/// cancels an already-posted OS event.
pub fn dispatch(engine: &mut Engine, signal: Signal) {
    if let Some(flags) = signal.reset_flags() {
        engine.reset(flags);
    }
    if signal == Signal::ImeDeactivate {
        // Composition commit is the caller's responsibility (it owns the
        // Arbiter and client); this only tears down engine-owned state.
        engine.reset(ResetFlags { cursor_moved: false, preserve_mid_sentence: false });
    }
}
