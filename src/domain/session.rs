//! `Session` — per-client composition state: the active [`WordBuffer`], the
//! bounded word history, and the flags the Lifecycle Coordinator (C9) and
//! Session Controller (C7) consult to decide how to treat the next signal.

use crate::domain::word_buffer::WordBuffer;
use crate::history::History;

/// One independent composition session. The crate places no limit on how
/// many of these a host constructs — an IMK-style server hosts one per
/// focused text-input client — and `Session` itself never reaches for
/// process-global state.
#[derive(Debug, Clone)]
pub struct Session {
    pub buffer: WordBuffer,
    pub history: History,
    /// True when the cursor is likely inside existing text rather than at
    /// the end of a line the engine itself produced. Disables edits that
    /// could delete content to the right of the cursor.
    pub mid_sentence: bool,
    /// 0 or 1: whether the last action was committing a word to history,
    /// enabling "backspace restore" on the very next backspace only.
    pub space_count_since_buffer_cleared: u8,
    pub language_on: bool,
    /// True at session start and immediately after a sentence-ending
    /// word-break (`.`/`!`/`?`/newline); consumed by the next word's first
    /// letter under `Settings::upper_case_first_char`, per spec.md §6.
    pub sentence_start: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            buffer: WordBuffer::new(),
            history: History::new(),
            mid_sentence: false,
            space_count_since_buffer_cleared: 0,
            language_on: true,
            sentence_start: true,
        }
    }
}

/// Flags accompanying a [`Session::reset`] call, one pair per lifecycle
/// signal the Lifecycle Coordinator dispatches on.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResetFlags {
    pub cursor_moved: bool,
    pub preserve_mid_sentence: bool,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear the buffer and apply the lifecycle reset flags. Always safe:
    /// any in-flight injection already posted to the OS completes regardless
    /// — this only discards buffer-level state the engine itself owns.
    pub fn reset(&mut self, flags: ResetFlags) {
        self.buffer.clear();
        self.space_count_since_buffer_cleared = 0;
        if flags.cursor_moved && !flags.preserve_mid_sentence {
            self.mid_sentence = true;
        } else if !flags.preserve_mid_sentence {
            self.mid_sentence = false;
        }
    }

    pub fn current_word(&self) -> String {
        self.buffer.current_word()
    }
}
