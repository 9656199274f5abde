//! Vietnamese IME Core
//!
//! A Vietnamese input method engine: keystroke classification per
//! romanization scheme, tone/mark placement, spelling validation, macro
//! expansion, undo/history, and output arbitration against a host text
//! field or native IME composition surface.
//!
//! This crate is the *engine*, not a host. It never touches the keyboard or
//! the screen directly — [`engine::Engine`] is a pure state machine that
//! turns a keystroke into a [`domain::Diff`], and [`arbiter::Arbiter`]
//! commits that `Diff` through a host-supplied [`arbiter::KeystrokeInjector`]
//! or [`arbiter::ImeClient`]. A thin platform host (a macOS IMK server, a
//! Windows low-level keyboard hook, or a test harness) owns everything
//! outside that boundary.
//!
//! # Layout
//!
//! - [`classify`] — Key Classifier (C1): per-scheme key-to-`KeyClass` tables.
//! - [`domain`] — shared data model: `LogicalChar`, `WordBuffer`, `Session`, `Diff`.
//! - [`placer`] — Mark/Tone Placer (C3): nucleus-shape tone placement.
//! - [`validator`] — Spelling Validator (C4): phonotactic legality checks.
//! - [`macros`] — Macro Expander (C5): trigger/replacement store.
//! - [`history`] — History/Undo (C6): bounded ring buffer of committed words.
//! - [`engine`] — Session Controller (C7): the top-level `Engine`.
//! - [`arbiter`] — Output Arbiter (C8): Synthesize/MarkedText/DirectReplace.
//! - [`lifecycle`] — Lifecycle Coordinator (C9): focus/cursor/IME signals.
//! - [`settings`] — the `Settings` configuration record.
//! - [`encoding`] — legacy code-table rendering (TCVN3, VNI-Windows/Compound).
//! - [`errors`] — setup-time failure type; never used on the hot path.
//! - [`ffi`] — the C ABI surface hosts outside Rust link against.

pub mod arbiter;
pub mod classify;
pub mod domain;
pub mod encoding;
pub mod engine;
pub mod errors;
pub mod ffi;
pub mod history;
pub mod lifecycle;
pub mod macros;
pub mod placer;
pub mod settings;
pub mod validator;

pub use domain::{Diff, LogicalChar, Session, WordBuffer};
pub use engine::Engine;
pub use errors::EngineError;
pub use settings::{CodeTable, InputMethod, Settings};
