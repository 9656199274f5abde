//! Simple-Telex variants: subsets of full Telex with specific combinations
//! disabled. `SimpleTelex1` drops the `w` mark/standalone-`ư`
//! overload (many simplified layouts reserve `w` as a literal letter, since
//! it collides with the English `w` key in mixed-language typing);
//! `SimpleTelex2` additionally drops the doubled-vowel circumflex
//! shortcuts (`aa/ee/oo`), requiring VNI-style explicit marks instead.

use super::{KeyClass, Scheme};
use crate::domain::logical_char::{Base, Tone};
use crate::domain::word_buffer::WordBuffer;

pub struct SimpleTelex1;
pub struct SimpleTelex2;

fn classify_shared(key: char, buffer: &WordBuffer, allow_circumflex_doubling: bool, allow_w: bool) -> KeyClass {
    let lower = key.to_ascii_lowercase();
    let last_base = buffer.last().map(|s| s.base);

    match lower {
        's' => KeyClass::ToneMark(Tone::Acute),
        'f' => KeyClass::ToneMark(Tone::Grave),
        'r' => KeyClass::ToneMark(Tone::HookAbove),
        'x' => KeyClass::ToneMark(Tone::Tilde),
        'j' => KeyClass::ToneMark(Tone::DotBelow),

        'a' if allow_circumflex_doubling && last_base == Some(Base::Vowel('a')) => {
            KeyClass::VowelMark(crate::domain::logical_char::Mark::Circumflex)
        }
        'e' if allow_circumflex_doubling && last_base == Some(Base::Vowel('e')) => {
            KeyClass::VowelMark(crate::domain::logical_char::Mark::Circumflex)
        }
        'o' if allow_circumflex_doubling && last_base == Some(Base::Vowel('o')) => {
            KeyClass::VowelMark(crate::domain::logical_char::Mark::Circumflex)
        }

        'w' if allow_w => match last_base {
            Some(Base::Vowel('o')) | Some(Base::Vowel('u')) => {
                KeyClass::VowelMark(crate::domain::logical_char::Mark::Horn)
            }
            Some(Base::Vowel('a')) => KeyClass::VowelMark(crate::domain::logical_char::Mark::Breve),
            _ => KeyClass::StandaloneVowel('u', crate::domain::logical_char::Mark::Horn),
        },

        'd' if last_base == Some(Base::Consonant('d')) => KeyClass::DoubleConsonant('d'),

        c if super::is_vowel_letter(c) => KeyClass::Vowel(c),
        c if c.is_ascii_alphabetic() => KeyClass::Consonant(c),
        c if c.is_ascii_digit() => KeyClass::Other(c),
        c if !c.is_alphanumeric() => KeyClass::WordBreak,
        c => KeyClass::Other(c),
    }
}

impl Scheme for SimpleTelex1 {
    fn classify(&self, key: char, buffer: &WordBuffer) -> KeyClass {
        classify_shared(key, buffer, true, false)
    }
}

impl Scheme for SimpleTelex2 {
    fn classify(&self, key: char, buffer: &WordBuffer) -> KeyClass {
        classify_shared(key, buffer, false, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::logical_char::LogicalChar;

    #[test]
    fn simple_telex1_treats_w_as_literal_consonant() {
        let b = WordBuffer::new();
        assert_eq!(SimpleTelex1.classify('w', &b), KeyClass::Consonant('w'));
    }

    #[test]
    fn simple_telex2_disables_circumflex_doubling() {
        let mut b = WordBuffer::new();
        b.append(LogicalChar::new(Base::Vowel('a'), 'a', false));
        assert_eq!(SimpleTelex2.classify('a', &b), KeyClass::Vowel('a'));
    }

    #[test]
    fn tones_still_work_in_both_variants() {
        let b = WordBuffer::new();
        assert_eq!(SimpleTelex1.classify('s', &b), KeyClass::ToneMark(Tone::Acute));
        assert_eq!(SimpleTelex2.classify('s', &b), KeyClass::ToneMark(Tone::Acute));
    }
}
