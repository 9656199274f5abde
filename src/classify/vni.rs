//! VNI: digits `1`-`5` are tones, `6` circumflex, `7` horn, `8` breve, `9`
//! bar (spec.md §4.1). Digits always target the buffer's current vowel
//! nucleus/last consonant rather than a doubled letter, so unlike Telex
//! there is no standalone-letter ambiguity to resolve here.

use super::{KeyClass, Scheme};
use crate::domain::logical_char::Tone;
use crate::domain::word_buffer::WordBuffer;

pub struct Vni;

impl Scheme for Vni {
    fn classify(&self, key: char, _buffer: &WordBuffer) -> KeyClass {
        match key {
            '1' => KeyClass::ToneMark(Tone::Acute),
            '2' => KeyClass::ToneMark(Tone::Grave),
            '3' => KeyClass::ToneMark(Tone::HookAbove),
            '4' => KeyClass::ToneMark(Tone::Tilde),
            '5' => KeyClass::ToneMark(Tone::DotBelow),
            '6' => KeyClass::VowelMark(crate::domain::logical_char::Mark::Circumflex),
            '7' => KeyClass::VowelMark(crate::domain::logical_char::Mark::Horn),
            '8' => KeyClass::VowelMark(crate::domain::logical_char::Mark::Breve),
            '9' => KeyClass::VowelMark(crate::domain::logical_char::Mark::Bar),
            c if super::is_vowel_letter(c.to_ascii_lowercase()) => KeyClass::Vowel(c.to_ascii_lowercase()),
            c if c.is_ascii_alphabetic() => KeyClass::Consonant(c.to_ascii_lowercase()),
            c if self.is_word_break(c) => KeyClass::WordBreak,
            c => KeyClass::Other(c),
        }
    }
}
