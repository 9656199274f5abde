//! VIQR: `' \` ? ~ .` tones; `^` circumflex; `+` horn; `(` breve; `dd -> đ`
//! (spec.md §4.1). Unlike Telex/VNI, VIQR's mark keys are punctuation, so
//! `is_word_break` must exclude them from the default "any punctuation is a
//! word break" rule.

use super::{KeyClass, Scheme};
use crate::domain::logical_char::{Base, Mark, Tone};
use crate::domain::word_buffer::WordBuffer;

const MARK_CHARS: [char; 9] = ['\'', '`', '?', '~', '.', '^', '+', '(', ')'];

pub struct Viqr;

impl Scheme for Viqr {
    fn classify(&self, key: char, buffer: &WordBuffer) -> KeyClass {
        let last_base = buffer.last().map(|s| s.base);

        match key {
            '\'' => KeyClass::ToneMark(Tone::Acute),
            '`' => KeyClass::ToneMark(Tone::Grave),
            '?' => KeyClass::ToneMark(Tone::HookAbove),
            '~' => KeyClass::ToneMark(Tone::Tilde),
            '.' => KeyClass::ToneMark(Tone::DotBelow),
            '^' => KeyClass::VowelMark(Mark::Circumflex),
            '+' => KeyClass::VowelMark(Mark::Horn),
            '(' => KeyClass::VowelMark(Mark::Breve),

            'd' if last_base == Some(Base::Consonant('d')) => KeyClass::DoubleConsonant('d'),

            c if super::is_vowel_letter(c.to_ascii_lowercase()) => KeyClass::Vowel(c.to_ascii_lowercase()),
            c if c.is_ascii_alphabetic() => KeyClass::Consonant(c.to_ascii_lowercase()),
            c if self.is_word_break(c) => KeyClass::WordBreak,
            c => KeyClass::Other(c),
        }
    }

    fn is_word_break(&self, key: char) -> bool {
        !key.is_alphanumeric() && !MARK_CHARS.contains(&key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn punctuation_tones_are_not_word_breaks() {
        assert!(!Viqr.is_word_break('\''));
        assert!(!Viqr.is_word_break('^'));
        assert!(Viqr.is_word_break(' '));
    }

    #[test]
    fn classifies_tone_and_mark_symbols() {
        let b = WordBuffer::new();
        assert_eq!(Viqr.classify('\'', &b), KeyClass::ToneMark(Tone::Acute));
        assert_eq!(Viqr.classify('.', &b), KeyClass::ToneMark(Tone::DotBelow));
        assert_eq!(Viqr.classify('^', &b), KeyClass::VowelMark(Mark::Circumflex));
        assert_eq!(Viqr.classify('+', &b), KeyClass::VowelMark(Mark::Horn));
    }
}
