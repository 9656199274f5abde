//! Session Controller (C7) — spec.md §4.7.
//!
//! `Engine` is the top-level entry point: it owns one [`Session`], the
//! current [`Settings`], a macro snapshot, and a dictionary handle, and
//! orchestrates the classifier, word buffer, placer, validator, macro
//! expander and history into the four public operations a host drives a
//! keystroke stream with. Every path returns a [`Diff`]; nothing here ever
//! panics or returns a `Result` — setup failures are the only place
//! `EngineError` appears (spec.md §7), and there are none on this type.
//!
//! Grounded in the teacher's top-level `VietnameseEngine`
//! (`application::vietnamese_engine`), which plays the same orchestrating
//! role over its own classify/buffer/transform/validate stack.

use crate::classify::{self, KeyClass};
use crate::domain::logical_char::{Base, LogicalChar, Mark, Tone};
use crate::domain::session::{ResetFlags, Session};
use crate::domain::word_buffer::WordBuffer;
use crate::domain::Diff;
use crate::history::HistoryEntry;
use crate::macros::MacroSnapshot;
use crate::placer;
use crate::settings::Settings;
use crate::validator::{self, NoDictionary, SpellingDictionary, Validity};

/// Top-level engine: one per independently-composing text client.
pub struct Engine {
    session: Session,
    settings: Settings,
    macros: MacroSnapshot,
    dictionary: Box<dyn SpellingDictionary>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    pub fn new() -> Self {
        Self {
            session: Session::new(),
            settings: Settings::default(),
            macros: MacroSnapshot::default(),
            dictionary: Box::new(NoDictionary),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Replace the active configuration. Denormalizes `modern_style` into
    /// the buffer immediately so a mid-word settings change (rare, but
    /// possible via a live preferences pane) takes effect on the next key.
    pub fn update_settings(&mut self, settings: Settings) {
        self.session.buffer.set_modern_style(settings.modern_style);
        self.settings = settings;
    }

    pub fn set_macros(&mut self, macros: MacroSnapshot) {
        self.macros = macros;
    }

    pub fn set_dictionary(&mut self, dictionary: Box<dyn SpellingDictionary>) {
        self.dictionary = dictionary;
    }

    pub fn language_on(&self) -> bool {
        self.session.language_on
    }

    pub fn set_language_on(&mut self, on: bool) {
        self.session.language_on = on;
    }

    pub fn current_word(&self) -> String {
        self.session.current_word()
    }

    pub fn can_undo_typing(&self) -> bool {
        !self.session.buffer.is_empty()
    }

    /// See spec.md §4.9: callers route lifecycle signals through
    /// [`crate::lifecycle`], which calls this.
    pub fn reset(&mut self, flags: ResetFlags) {
        self.session.reset(flags);
    }

    /// Step 1-6 of spec.md §4.7's `process_key` outline.
    pub fn process_key(&mut self, key: char, uppercase: bool) -> Diff {
        let class = classify::classify(self.settings.input_method, key, &self.session.buffer);
        self.session.space_count_since_buffer_cleared = 0;

        if !self.session.language_on {
            return Diff::NoOp;
        }

        match class {
            KeyClass::Other(_) | KeyClass::WordBreak => Diff::NoOp,
            KeyClass::Vowel(c) | KeyClass::Consonant(c) => self.append_literal(c, uppercase),
            KeyClass::DoubleConsonant(c) => self.apply_double_consonant(c, uppercase),
            KeyClass::ToneMark(tone) => self.apply_tone_key(tone, key, uppercase),
            KeyClass::VowelMark(mark) => self.apply_vowel_mark(mark, key),
            KeyClass::StandaloneVowel(base, mark) => self.append_standalone_vowel(base, mark, key, uppercase),
            KeyClass::QuickConsonant(c) => self.apply_quick_consonant(c, uppercase),
        }
    }

    /// Telex's tone keys (`s/f/r/x/j`) double as literal Vietnamese
    /// consonants when there's no vowel yet to carry a tone: spec.md §8's
    /// boundary behaviors table and its `ss -> ss` worked scenario agree
    /// the key still lands on screen, so it's appended to the buffer like
    /// any other consonant rather than dropped. A non-alphabetic tone key
    /// (VNI's digit tones) has no letter identity to fall back to, so it
    /// passes through untouched instead.
    fn apply_tone_key(&mut self, tone: Tone, key: char, uppercase: bool) -> Diff {
        if self.session.buffer.vowel_run().is_empty() {
            return if key.is_ascii_alphabetic() {
                self.append_literal(key, uppercase)
            } else {
                Diff::NoOp
            };
        }
        let diff = self
            .session
            .buffer
            .apply_tone(tone, self.settings.modern_style, self.settings.free_mark);
        self.record_modifier_key(key);
        diff
    }

    /// Tone and vowel-mark keys rewrite an existing slot rather than
    /// appending a new one, so they carry no [`LogicalChar::origin_keys`] of
    /// their own. Recording the key on the *last* slot (not necessarily the
    /// one the mark/tone landed on) keeps `WordBuffer::raw_keys`'s
    /// slot-by-slot concatenation in actual typing order, since the
    /// triggering key is always the most recently typed one — e.g. "toans"
    /// is `t`,`o`,`a`,`n` appended in order, then the acute-tone `s` lands on
    /// `a` but is recorded on `n`, so concatenation still reads "toans".
    fn record_modifier_key(&mut self, key: char) {
        if let Some(slot) = self.session.buffer.slots_mut().last_mut() {
            slot.push_origin(key);
        }
    }

    /// Layer a vowel mark onto an already-typed vowel, with one exception:
    /// if the mark would toggle off on the exact slot that a single
    /// keystroke of `key` itself created (Telex's standalone `w -> ư`), the
    /// user never typed a bare vowel to mark, so clearing the mark would
    /// leave a slot (`u`) they never asked for. spec.md §8's double-mark
    /// boundary case expects the raw keys back instead (`ww -> ww`), so that
    /// slot is split back into the two literal letters.
    fn apply_vowel_mark(&mut self, mark: Mark, key: char) -> Diff {
        let before = self.session.buffer.project_unicode();
        if let placer::Placement::ToggledOff(i) = placer::place_mark(&self.session.buffer, mark) {
            if self.session.buffer.slots()[i].origin_keys == [key] {
                let uppercase = self.session.buffer.slots()[i].uppercase;
                self.session.buffer.slots_mut()[i] = LogicalChar::new(Base::Consonant(key), key, uppercase);
                self.session
                    .buffer
                    .slots_mut()
                    .insert(i + 1, LogicalChar::new(Base::Consonant(key), key, uppercase));
                placer::reposition_tone(&mut self.session.buffer);
                let after = self.session.buffer.project_unicode();
                return Diff::between(&before, &after);
            }
        }
        let diff = self.session.buffer.apply_mark(mark);
        self.record_modifier_key(key);
        diff
    }

    /// A vowel whose base and mark are both determined by `key` alone
    /// (Telex's standalone `w -> ư`), built directly rather than routed
    /// through [`Base::from_ascii_letter`], which only understands ASCII.
    fn append_standalone_vowel(&mut self, base: char, mark: Mark, key: char, uppercase: bool) -> Diff {
        let before = self.session.buffer.project_unicode();
        let is_first_letter = self.session.buffer.is_empty();
        let uppercase = self.maybe_capitalize(is_first_letter, uppercase);
        let mut slot = LogicalChar::new(Base::Vowel(base), key, uppercase);
        slot.set_mark(mark);
        self.session.buffer.append(slot);
        let after = self.session.buffer.project_unicode();
        Diff::between(&before, &after)
    }

    /// Whether the slot about to be appended is the first of a new word and,
    /// if so, whether `upper_case_first_char` forces it uppercase regardless
    /// of the key's own shift state (spec.md §6). Consumes `sentence_start`
    /// on any first letter, capitalized or not, so a sentence only gets one
    /// shot at auto-capitalization.
    fn maybe_capitalize(&mut self, is_first_letter: bool, uppercase: bool) -> bool {
        if !is_first_letter {
            return uppercase;
        }
        let force = self.settings.upper_case_first_char && self.session.sentence_start;
        self.session.sentence_start = false;
        force || uppercase
    }

    fn append_literal(&mut self, c: char, uppercase: bool) -> Diff {
        let before = self.session.buffer.project_unicode();
        let base = Base::from_ascii_letter(c);
        let is_first_letter = self.session.buffer.is_empty();
        let uppercase = self.maybe_capitalize(is_first_letter, uppercase);
        self.session.buffer.append(LogicalChar::new(base, c, uppercase));
        if base.is_consonant() {
            // spec.md §8.7's `nghiễm` scenario: a bare `ie` nucleus followed
            // directly by a final consonant promotes to `iê` first.
            placer::promote_ie_before_final(&mut self.session.buffer);
        }
        let after = self.session.buffer.project_unicode();
        Diff::between(&before, &after)
    }

    /// `dd -> đ` is resolved by [`WordBuffer::append`] itself. The only
    /// doubling this layer handles specially is `cc`, and only under
    /// `quick_telex` (spec.md §6: "`cc -> ch`-style speed-typing rewrites").
    /// The second `c` keystroke becomes the slot rendering `h`; its
    /// `origin_keys` stays `['c']`, so `raw_keys()` still reconstructs the
    /// literal `"cc"` the user typed.
    fn apply_double_consonant(&mut self, c: char, uppercase: bool) -> Diff {
        let before = self.session.buffer.project_unicode();
        let is_first_letter = self.session.buffer.is_empty();
        let uppercase = self.maybe_capitalize(is_first_letter, uppercase);
        if c == 'c' && self.settings.quick_telex {
            self.session
                .buffer
                .append(LogicalChar::new(Base::Consonant('h'), c, uppercase));
        } else {
            self.session
                .buffer
                .append(LogicalChar::new(Base::from_ascii_letter(c), c, uppercase));
        }
        let after = self.session.buffer.project_unicode();
        Diff::between(&before, &after)
    }

    /// Quick-Telex / Quick-Consonant rewrites (spec.md §4.7 step 4, §6).
    /// The classifier only flags the trigger key
    /// ([`KeyClass::QuickConsonant`]); whether it's honoured is gated here
    /// by settings, since the classifier has no settings access.
    ///
    /// Each rewrite expands one keystroke into two glyphs. The physically
    /// typed key keeps its origin on the first new slot; the second is
    /// [`LogicalChar::synthesized`] — see that constructor's doc for why
    /// this doesn't break the `origin_keys`/`raw_keys` invariant.
    fn apply_quick_consonant(&mut self, c: char, uppercase: bool) -> Diff {
        let before = self.session.buffer.project_unicode();
        let is_first_letter = self.session.buffer.is_empty();
        let uppercase = self.maybe_capitalize(is_first_letter, uppercase);
        match c {
            'f' if self.settings.quick_consonant_start && is_first_letter => {
                self.session
                    .buffer
                    .append(LogicalChar::new(Base::Consonant('p'), c, uppercase));
                self.session
                    .buffer
                    .append(LogicalChar::synthesized(Base::Consonant('h'), uppercase));
            }
            'j' if self.settings.quick_consonant_start && is_first_letter => {
                self.session
                    .buffer
                    .append(LogicalChar::new(Base::Consonant('g'), c, uppercase));
                self.session
                    .buffer
                    .append(LogicalChar::synthesized(Base::Vowel('i'), uppercase));
            }
            'w' if self.settings.quick_consonant_start && is_first_letter => {
                self.session
                    .buffer
                    .append(LogicalChar::new(Base::Consonant('q'), c, uppercase));
                self.session
                    .buffer
                    .append(LogicalChar::synthesized(Base::Vowel('u'), uppercase));
            }
            'g' | 'h' | 'k' if self.settings.quick_consonant_end => {
                let (first, second) = match c {
                    'g' => ('n', 'g'),
                    'h' => ('n', 'h'),
                    _ => ('c', 'h'),
                };
                let restore_len = self.session.buffer.len();
                self.session
                    .buffer
                    .append(LogicalChar::new(Base::Consonant(first), c, uppercase));
                self.session
                    .buffer
                    .append(LogicalChar::synthesized(Base::Consonant(second), uppercase));
                placer::promote_ie_before_final(&mut self.session.buffer);
                // Only valid-looking finals get expanded; "only if the
                // result is still a plausible syllable" (spec.md §6).
                if validator::validate(&self.session.buffer, &self.settings, self.dictionary.as_ref())
                    == Validity::Invalid
                {
                    self.session.buffer.slots_mut().truncate(restore_len);
                    self.session
                        .buffer
                        .append(LogicalChar::new(Base::Consonant(c), c, uppercase));
                }
            }
            // Disabled, or not at word start: Telex's standalone `w -> ư`
            // (spec.md §4.1) still applies — unlike `f`/`j`, a bare `w`'s
            // un-rewritten reading is a vowel, not a literal consonant.
            'w' => {
                let mut slot = LogicalChar::new(Base::Vowel('u'), c, uppercase);
                slot.set_mark(Mark::Horn);
                self.session.buffer.append(slot);
            }
            _ => self
                .session
                .buffer
                .append(LogicalChar::new(Base::from_ascii_letter(c), c, uppercase)),
        }
        let after = self.session.buffer.project_unicode();
        Diff::between(&before, &after)
    }

    /// spec.md §4.2, §4.6: remove the last slot, or resume editing the
    /// previous committed word if this is the single backspace immediately
    /// following a word-break (`space_count_since_buffer_cleared == 1`).
    pub fn process_backspace(&mut self) -> Diff {
        if self.session.buffer.is_empty() {
            if self.session.space_count_since_buffer_cleared == 1 {
                if let Some(entry) = self.session.history.pop() {
                    self.session.buffer = entry.buffer;
                    self.session.space_count_since_buffer_cleared = 0;
                    // The committed word's glyphs are already on screen
                    // unchanged; only the trailing boundary character needs
                    // to go, to resume composing in place of it.
                    return Diff::restore(1, Vec::new());
                }
            }
            return Diff::NoOp;
        }
        self.session.space_count_since_buffer_cleared = 0;
        self.session.buffer.backspace()
    }

    /// spec.md §4.7's `process_word_break` outline: macro first, else
    /// validate-and-maybe-restore, else commit silently.
    pub fn process_word_break(&mut self, boundary: char) -> Diff {
        // spec.md §6 `upper_case_first_char`: re-arm capitalization after a
        // sentence-ending boundary (`.`/`!`/`?` or newline), matching "auto-
        // capitalize first letter after `.`/start".
        if matches!(boundary, '.' | '!' | '?' | '\n') {
            self.session.sentence_start = true;
        }
        if self.session.buffer.is_empty() {
            self.session.space_count_since_buffer_cleared = 0;
            return Diff::NoOp;
        }

        let macro_hit = if self.settings.macros_enabled
            && (self.session.language_on || self.settings.macros_in_english_mode)
        {
            let raw = self.session.buffer.raw_keys();
            let uppercase_first = self
                .session
                .buffer
                .slots()
                .first()
                .map(|s| s.uppercase)
                .unwrap_or(false);
            self.macros.expand(
                &raw,
                self.settings.auto_caps_macro,
                uppercase_first,
                self.session.buffer.length_glyphs() as u16,
            )
        } else {
            None
        };

        let result = if let Some(m) = macro_hit {
            // The triggering word-break character is never inserted
            // separately once the macro's Diff consumes it (spec.md §4.7
            // step 1: "emit its Diff and pass the break character through"),
            // so it has to ride along in `insert` instead of being dropped.
            // `add_space_after` normalizes it to a plain space; otherwise
            // the actual boundary character (space, comma, ...) falls
            // through unchanged.
            let mut insert: Vec<char> = m.replacement.chars().collect();
            insert.push(if m.add_space_after { ' ' } else { boundary });
            Diff::edit(m.delete_count, insert)
        } else if self.settings.spell_check
            && validator::validate(&self.session.buffer, &self.settings, self.dictionary.as_ref())
                == Validity::Invalid
        {
            if self.settings.restore_if_wrong_spelling {
                let raw: Vec<char> = self.session.buffer.raw_keys().chars().collect();
                Diff::restore(self.session.buffer.length_glyphs() as u16, raw)
            } else {
                Diff::NoOp
            }
        } else {
            Diff::NoOp
        };

        self.session.history.push(HistoryEntry::from_buffer(&self.session.buffer));
        self.session.buffer.clear();
        self.session.space_count_since_buffer_cleared = 1;
        result
    }

    /// Revert the in-progress word's on-screen Vietnamese rendering back to
    /// the literal ASCII the user typed, and drop the buffer — this is an
    /// explicit undo of the *composition*, not a word commit.
    pub fn undo_typing(&mut self) -> Diff {
        if self.session.buffer.is_empty() {
            return Diff::NoOp;
        }
        let delete_count = self.session.buffer.length_glyphs() as u16;
        let raw: Vec<char> = self.session.buffer.raw_keys().chars().collect();
        self.session.buffer.clear();
        self.session.space_count_since_buffer_cleared = 0;
        Diff::restore(delete_count, raw)
    }

    pub fn buffer(&self) -> &WordBuffer {
        &self.session.buffer
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }
}
