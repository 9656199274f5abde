//! Telex: `s/f/r/x/j` tones; `aa/ee/oo` circumflex; `aw/ow/uw` breve/horn;
//! standalone `w -> ư`; `dd -> đ` (spec.md §4.1).

use super::{KeyClass, Scheme};
use crate::domain::logical_char::{Base, Mark, Tone};
use crate::domain::word_buffer::WordBuffer;

pub struct Telex;

impl Scheme for Telex {
    fn classify(&self, key: char, buffer: &WordBuffer) -> KeyClass {
        let lower = key.to_ascii_lowercase();
        let last_base = buffer.last().map(|s| s.base);

        match lower {
            // Speed-typing triggers (spec.md §4.1/§6 quick_consonant_start/end,
            // quick_telex): the classifier only flags these by buffer *shape*;
            // whether the Session Controller honours them is gated by settings.
            // These guarded arms must come before the unconditional tone-key
            // arms below: `f` is Telex's grave-tone key everywhere else, but
            // at word start it first needs a chance to be the `f -> ph`
            // quick-consonant trigger instead.
            'f' if buffer.is_empty() => KeyClass::QuickConsonant('f'),
            'j' if buffer.is_empty() => KeyClass::QuickConsonant('j'),
            'g' | 'h' | 'k'
                if !buffer.vowel_run().is_empty() && !buffer.has_final_consonant() =>
            {
                KeyClass::QuickConsonant(lower)
            }

            's' => KeyClass::ToneMark(Tone::Acute),
            'f' => KeyClass::ToneMark(Tone::Grave),
            'r' => KeyClass::ToneMark(Tone::HookAbove),
            'x' => KeyClass::ToneMark(Tone::Tilde),
            'j' => KeyClass::ToneMark(Tone::DotBelow),

            'a' if last_base == Some(Base::Vowel('a')) => KeyClass::VowelMark(Mark::Circumflex),
            'e' if last_base == Some(Base::Vowel('e')) => KeyClass::VowelMark(Mark::Circumflex),
            'o' if last_base == Some(Base::Vowel('o')) => KeyClass::VowelMark(Mark::Circumflex),

            // Standalone `w` has no mark target yet: at word start it's
            // first offered to the `w -> qu` quick-consonant trigger (only
            // honoured under `quick_consonant_start`); anywhere else it
            // builds its own `ư` nucleus in one keystroke.
            'w' => match last_base {
                Some(Base::Vowel('o')) | Some(Base::Vowel('u')) => KeyClass::VowelMark(Mark::Horn),
                Some(Base::Vowel('a')) => KeyClass::VowelMark(Mark::Breve),
                None => KeyClass::QuickConsonant('w'),
                _ => KeyClass::StandaloneVowel('u', Mark::Horn),
            },

            'd' if last_base == Some(Base::Consonant('d')) => KeyClass::DoubleConsonant('d'),
            'c' if last_base == Some(Base::Consonant('c')) => KeyClass::DoubleConsonant('c'),

            c if super::is_vowel_letter(c) => KeyClass::Vowel(c),
            c if c.is_ascii_alphabetic() => KeyClass::Consonant(c),
            c if c.is_ascii_digit() => KeyClass::Other(c),
            c if self.is_word_break(c) => KeyClass::WordBreak,
            c => KeyClass::Other(c),
        }
    }
}
