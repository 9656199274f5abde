//! Round-trip laws and boundary behaviors from spec.md §8, exercised only
//! through the public [`vi_ime_core`] API.

use vi_ime_core::domain::Diff;
use vi_ime_core::settings::Settings;
use vi_ime_core::Engine;

fn type_raw(engine: &mut Engine, raw: &str) {
    for c in raw.chars() {
        engine.process_key(c, false);
    }
}

/// Undo law: `process_key*(K); undo_typing()` produces on-screen text equal
/// to the raw ASCII `K`.
#[test]
fn undo_law_restores_raw_ascii_for_every_scenario_word() {
    for raw in ["dijch", "thuong", "toans", "hoaf", "nghiexm"] {
        let mut engine = Engine::new();
        type_raw(&mut engine, raw);
        let diff = engine.undo_typing();
        let restored: String = diff.insert().iter().collect();
        assert_eq!(restored, raw, "undo law failed for {raw:?}");
        assert!(engine.current_word().is_empty());
        assert!(!engine.can_undo_typing());
    }
}

/// Restore law: an invalid syllable with `restore_if_wrong_spelling` set
/// restores the raw ASCII plus the boundary character (the boundary itself
/// is not part of `current_word`/`Diff`, only the prefix up to it is).
#[test]
fn restore_law_on_invalid_spelling() {
    let mut engine = Engine::new();
    type_raw(&mut engine, "tox"); // "x" is not a legal final consonant
    let diff = engine.process_word_break(' ');
    match diff {
        Diff::Restore { insert, .. } => {
            let restored: String = insert.into_iter().collect();
            assert_eq!(restored, "tox");
        }
        other => panic!("expected Restore, got {other:?}"),
    }
}

/// Backspace-restore law: typing a word, breaking it, then backspacing
/// resumes editing exactly the word that was just committed.
#[test]
fn backspace_restore_law() {
    let mut engine = Engine::new();
    type_raw(&mut engine, "hoa");
    let expected_word = engine.current_word();
    engine.process_word_break(' ');
    assert!(engine.current_word().is_empty());
    engine.process_backspace();
    assert_eq!(engine.current_word(), expected_word);
}

/// Macro idempotence: a macro expanding to plain text with no trigger of
/// its own fires exactly once per word-break.
#[test]
fn macro_idempotence() {
    use vi_ime_core::macros::{Macro, MacroStore};
    let mut engine = Engine::new();
    let mut store = MacroStore::new();
    store.add(Macro::new("vn", "Việt Nam"));
    engine.set_macros(store.snapshot());

    type_raw(&mut engine, "vn");
    let diff = engine.process_word_break(' ');
    let expanded: String = diff.insert().iter().collect();
    assert_eq!(expanded, "Việt Nam");

    // "Việt Nam" is not itself a macro trigger raw-ASCII form, so breaking
    // again right after produces no further expansion.
    let diff2 = engine.process_word_break(' ');
    assert_eq!(diff2, Diff::NoOp);
}

/// Boundary: empty buffer + backspace is a no-op Diff.
#[test]
fn empty_buffer_backspace_is_noop() {
    let mut engine = Engine::new();
    assert_eq!(engine.process_backspace(), Diff::NoOp);
}

/// Boundary: single-char buffer + backspace empties it without touching
/// history.
#[test]
fn single_char_backspace_empties_buffer() {
    let mut engine = Engine::new();
    engine.process_key('a', false);
    let diff = engine.process_backspace();
    assert!(diff.consume());
    assert!(engine.current_word().is_empty());
}

/// Boundary: a tone-mark key with no vowel in the buffer is treated as a
/// literal consonant and still consumed (so the host doesn't double-insert).
#[test]
fn tone_with_no_vowel_is_literal() {
    let mut engine = Engine::new();
    let diff = engine.process_key('s', false);
    assert!(diff.consume());
    assert_eq!(engine.current_word(), "s");
}

/// `reset(); apply(K); reset()` leaves no observable state.
#[test]
fn reset_apply_reset_leaves_no_observable_state() {
    use vi_ime_core::domain::session::ResetFlags;
    let mut engine = Engine::new();
    engine.reset(ResetFlags::default());
    type_raw(&mut engine, "hoa");
    engine.reset(ResetFlags::default());
    assert!(engine.current_word().is_empty());
    assert!(!engine.can_undo_typing());
}

/// `origin_keys` invariant: concatenated across slots, equals the raw ASCII
/// typed so far (checked via the buffer's `raw_keys` through the public
/// `Engine::buffer` accessor).
#[test]
fn raw_keys_reconstructs_literal_typing() {
    let mut engine = Engine::new();
    type_raw(&mut engine, "thuongw");
    assert_eq!(engine.buffer().raw_keys(), "thuongw");
}

/// At most one slot carries a tone at any time, across an entire scenario
/// word (checked indirectly: re-applying a different tone clears the
/// first, never leaving two).
#[test]
fn at_most_one_tone_per_buffer() {
    let mut engine = Engine::new();
    type_raw(&mut engine, "toan");
    engine.process_key('s', false); // acute
    assert_eq!(engine.current_word(), "toán");
    engine.process_key('f', false); // grave replaces acute, not adds
    assert_eq!(engine.current_word(), "toàn");
}

#[test]
fn settings_default_matches_documented_defaults() {
    let s = Settings::default();
    assert!(s.modern_style);
    assert!(s.spell_check);
    assert!(s.restore_if_wrong_spelling);
    assert!(!s.free_mark);
}
