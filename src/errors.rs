//! Crate-wide error type for setup-time failures.
//!
//! Nothing on the per-keystroke hot path returns an `Err` — `Engine::process_key`,
//! `process_backspace`, `process_word_break` and `undo_typing` always return a
//! [`crate::domain::Diff`], even when something went wrong internally (spec.md
//! §7: "the engine never throws; all outcomes are encoded in Diff"). `EngineError`
//! is only ever produced by fallible *construction*: loading a dictionary,
//! importing a macro snapshot, or deserializing settings.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to parse settings: {0}")]
    InvalidSettings(#[from] serde_json::Error),

    #[error("macro store import failed: {0}")]
    InvalidMacroStore(String),

    #[error("dictionary source unavailable: {0}")]
    DictionaryUnavailable(String),
}
