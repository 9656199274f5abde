//! Macro Expander (C5) — spec.md §4.5.
//!
//! On word-break, looks up `buffer.raw_keys()` in the macro store and, if
//! found, emits a Diff that deletes the buffer's on-screen glyphs and
//! inserts the expansion. The store is read-copy-update (spec.md §5):
//! [`MacroStore`] is the mutable owner a host holds onto; [`MacroSnapshot`]
//! is the immutable, cheaply-`Arc`-cloned view the engine reads from for the
//! duration of one keystroke. Grounded in the teacher's
//! `features::shortcut::{Shortcut, ShortcutTable}` (trigger/replacement
//! shape, longest-match-first lookup, capacity limit), generalized to the
//! RCU snapshot spec.md §5 requires.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::errors::EngineError;

/// A single macro: a trigger string expanding to replacement text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Macro {
    pub trigger: String,
    pub replacement: String,
}

impl Macro {
    pub fn new(trigger: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            trigger: trigger.into(),
            replacement: replacement.into(),
        }
    }
}

/// Maximum number of macros a store holds, matching the teacher's
/// `ShortcutTable::MAX_SHORTCUTS` capacity guard.
pub const MAX_MACROS: usize = 200;

/// Outcome of a successful macro match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroMatch {
    /// Number of on-screen glyphs to delete (the buffer's current projection).
    pub delete_count: u16,
    /// Replacement text, already case-adjusted per `auto_caps`.
    pub replacement: String,
    /// Whether the Session Controller should normalize the triggering
    /// word-break character to a plain space rather than passing it through
    /// as-typed. See [`MacroSnapshot::add_space_after`].
    pub add_space_after: bool,
}

/// Immutable, shareable view of the macro table. The engine holds one of
/// these per keystroke (cloning an `Arc` is O(1)); preference-pane edits
/// publish a new snapshot via [`MacroStore::publish`] rather than mutating
/// this type in place.
///
/// Capitalization (`Settings::auto_caps_macro`) and the english-mode gate
/// (`Settings::macros_in_english_mode`) are controlled through `Settings`
/// alone, not duplicated here — `expand` takes `auto_caps` as a parameter
/// instead of carrying its own copy.
#[derive(Debug, Clone, Default)]
pub struct MacroSnapshot {
    by_trigger: Arc<HashMap<String, String>>,
    /// spec.md §4.5: append a normalizing space after an expansion instead
    /// of passing the triggering boundary character through unchanged.
    pub add_space_after: bool,
}

impl MacroSnapshot {
    pub fn len(&self) -> usize {
        self.by_trigger.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_trigger.is_empty()
    }

    /// Look up `raw_keys` and, if found, produce the Diff-shaped match.
    /// `auto_caps` (`Settings::auto_caps_macro`) and `first_key_uppercase`
    /// together drive capitalization; `buffer_len_glyphs` is what gets
    /// deleted on screen.
    pub fn expand(
        &self,
        raw_keys: &str,
        auto_caps: bool,
        first_key_uppercase: bool,
        buffer_len_glyphs: u16,
    ) -> Option<MacroMatch> {
        let replacement = self.by_trigger.get(raw_keys)?;
        let replacement = if auto_caps && first_key_uppercase {
            capitalize(replacement)
        } else {
            replacement.clone()
        };
        Some(MacroMatch {
            delete_count: buffer_len_glyphs,
            replacement,
            add_space_after: self.add_space_after,
        })
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Mutable owner of the macro table; a host (the preferences path) holds one
/// of these and calls [`MacroStore::snapshot`] to hand the engine a fresh
/// immutable view after every edit.
#[derive(Debug, Clone, Default)]
pub struct MacroStore {
    macros: HashMap<String, String>,
    pub add_space_after: bool,
}

impl MacroStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a macro. Returns `false` if the store is at capacity
    /// and `trigger` is new.
    pub fn add(&mut self, m: Macro) -> bool {
        if !self.macros.contains_key(&m.trigger) && self.macros.len() >= MAX_MACROS {
            return false;
        }
        self.macros.insert(m.trigger, m.replacement);
        true
    }

    pub fn remove(&mut self, trigger: &str) -> Option<String> {
        self.macros.remove(trigger)
    }

    pub fn len(&self) -> usize {
        self.macros.len()
    }

    pub fn is_empty(&self) -> bool {
        self.macros.is_empty()
    }

    /// Publish the current table as an immutable snapshot for the engine.
    pub fn snapshot(&self) -> MacroSnapshot {
        MacroSnapshot {
            by_trigger: Arc::new(self.macros.clone()),
            add_space_after: self.add_space_after,
        }
    }

    /// Import macros from a JSON array of `{"trigger": ..., "replacement": ...}`
    /// objects, replacing the current table.
    pub fn import_json(&mut self, json: &str) -> Result<(), EngineError> {
        let imported: Vec<Macro> =
            serde_json::from_str(json).map_err(|e| EngineError::InvalidMacroStore(e.to_string()))?;
        self.macros.clear();
        for m in imported {
            self.add(m);
        }
        Ok(())
    }

    pub fn export_json(&self) -> Result<String, EngineError> {
        let list: Vec<Macro> = self
            .macros
            .iter()
            .map(|(trigger, replacement)| Macro::new(trigger.clone(), replacement.clone()))
            .collect();
        serde_json::to_string(&list).map_err(EngineError::InvalidSettings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expand_finds_trigger() {
        let mut store = MacroStore::new();
        store.add(Macro::new("vn", "Việt Nam"));
        let snap = store.snapshot();
        let m = snap.expand("vn", false, false, 2).expect("match");
        assert_eq!(m.replacement, "Việt Nam");
        assert_eq!(m.delete_count, 2);
    }

    #[test]
    fn expand_misses_unknown_trigger() {
        let store = MacroStore::new();
        let snap = store.snapshot();
        assert!(snap.expand("xyz", false, false, 3).is_none());
    }

    #[test]
    fn auto_caps_capitalizes_replacement() {
        let mut store = MacroStore::new();
        store.add(Macro::new("vn", "việt nam"));
        let snap = store.snapshot();
        let m = snap.expand("vn", true, true, 2).unwrap();
        assert_eq!(m.replacement, "Việt nam");
    }

    #[test]
    fn auto_caps_false_leaves_replacement_untouched() {
        let mut store = MacroStore::new();
        store.add(Macro::new("vn", "việt nam"));
        let snap = store.snapshot();
        let m = snap.expand("vn", false, true, 2).unwrap();
        assert_eq!(m.replacement, "việt nam");
    }

    #[test]
    fn add_space_after_carries_through_to_match() {
        let mut store = MacroStore::new();
        store.add_space_after = true;
        store.add(Macro::new("vn", "Việt Nam"));
        let snap = store.snapshot();
        let m = snap.expand("vn", false, false, 2).unwrap();
        assert!(m.add_space_after);
    }

    #[test]
    fn capacity_limit_rejects_new_triggers_once_full() {
        let mut store = MacroStore::new();
        for i in 0..MAX_MACROS {
            assert!(store.add(Macro::new(format!("t{i}"), "x")));
        }
        assert!(!store.add(Macro::new("overflow", "x")));
        // Replacing an existing trigger is still allowed at capacity.
        assert!(store.add(Macro::new("t0", "y")));
    }

    #[test]
    fn json_roundtrip() {
        let mut store = MacroStore::new();
        store.add(Macro::new("hn", "Hà Nội"));
        let json = store.export_json().unwrap();
        let mut restored = MacroStore::new();
        restored.import_json(&json).unwrap();
        assert_eq!(restored.snapshot().expand("hn", false, false, 2).unwrap().replacement, "Hà Nội");
    }

    #[test]
    fn snapshot_is_immutable_view_of_store_at_publish_time() {
        let mut store = MacroStore::new();
        store.add(Macro::new("vn", "Việt Nam"));
        let snap = store.snapshot();
        store.add(Macro::new("vn", "changed"));
        assert_eq!(snap.expand("vn", false, false, 2).unwrap().replacement, "Việt Nam");
    }
}
