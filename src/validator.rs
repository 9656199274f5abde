//! Spelling Validator (C4) — spec.md §4.4.
//!
//! Decomposes a buffer at a word boundary into initial consonant(s) /
//! nucleus / final consonant(s) / tone and checks each against the legal
//! Vietnamese phonotactic sets. Grounded in the teacher's
//! `infrastructure/adapters/validation/diacritical_validator.rs`
//! (mark-vs-final-consonant incompatibility) and `engine_v2::vietnamese_validator`
//! (validate-before-transform policy); the per-(initial, final) nucleus-shape
//! table itself has no surviving source in this retrieval (`original_source/`
//! is empty), so it is approximated here by a single legal-nucleus-shape set
//! independent of the surrounding consonants — see DESIGN.md.

use crate::domain::word_buffer::WordBuffer;
use crate::settings::Settings;

/// Host-provided lookup into the (out-of-scope) lexicon / spellchecker
/// dictionary. spec.md §6: "the Validator's only requirement is a
/// `contains(raw_ascii_word) -> bool` query."
pub trait SpellingDictionary {
    fn contains(&self, raw_ascii_word: &str) -> bool;
}

/// Dictionary stand-in for hosts that haven't wired one up yet. Always
/// reports "not found", so validation falls back to the phonotactic rules
/// alone (spec.md §7: "Resource unavailable... fall back to always valid"
/// describes the *missing-dictionary* case; here the phonotactic rules
/// still run, they just never get a free pass from the dictionary).
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDictionary;

impl SpellingDictionary for NoDictionary {
    fn contains(&self, _raw_ascii_word: &str) -> bool {
        false
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validity {
    Valid,
    Invalid,
}

const LEGAL_INITIALS: &[&str] = &[
    "b", "c", "ch", "d", "đ", "g", "gh", "gi", "h", "k", "kh", "l", "m", "n", "ng", "ngh", "nh",
    "ph", "qu", "r", "s", "t", "th", "tr", "v", "x",
];

const EXTRA_INITIALS_ZFWJ: &[&str] = &["z", "f", "w", "j"];

const LEGAL_FINALS: &[&str] = &["c", "ch", "m", "n", "ng", "nh", "p", "t"];

/// Legal nucleus shapes (vowel-glyph clusters), independent of surrounding
/// consonants. Not exhaustive of every rare loanword nucleus, but covers the
/// productive set a modern Vietnamese syllable draws its vowel cluster from.
const LEGAL_NUCLEI: &[&str] = &[
    // single vowels
    "a", "ă", "â", "e", "ê", "i", "o", "ô", "ơ", "u", "ư", "y",
    // two-vowel
    "ai", "ao", "au", "âu", "ay", "ây", "eo", "êu", "ia", "iu", "oa", "oe", "oi", "ôi", "ơi",
    "ua", "uê", "ui", "uo", "uơ", "uy", "ưa", "ưi", "ưu", "yê", "iê", "uô", "ươ",
    // three-vowel
    "iêu", "oai", "oay", "oeo", "uao", "uây", "uôi", "ươi", "ươu", "uyê", "uyu", "yêu",
];

/// Validate `buf` at a word boundary. Always `Valid` when `dictionary`
/// recognizes the raw ASCII form, per spec.md §4.4's dictionary override.
pub fn validate(buf: &WordBuffer, settings: &Settings, dictionary: &dyn SpellingDictionary) -> Validity {
    if buf.is_empty() {
        return Validity::Valid;
    }
    if dictionary.contains(&buf.raw_keys()) {
        return Validity::Valid;
    }

    let run = buf.vowel_run();
    if run.is_empty() {
        return Validity::Invalid;
    }

    let slots = buf.slots();
    let initial: String = slots[..run[0]].iter().filter_map(|s| s.base.letter()).collect();
    let nucleus: String = run.iter().map(|&i| slots[i].base_glyph().to_ascii_lowercase()).collect();
    let last_vowel = *run.last().unwrap();
    let finalc: String = slots[last_vowel + 1..].iter().filter_map(|s| s.base.letter()).collect();

    if !initial.is_empty() && !legal_initial(&initial, settings) {
        return Validity::Invalid;
    }
    if !finalc.is_empty() && !LEGAL_FINALS.contains(&finalc.as_str()) {
        return Validity::Invalid;
    }
    if !LEGAL_NUCLEI.contains(&nucleus.as_str()) {
        return Validity::Invalid;
    }
    if is_sharp_final(&finalc) {
        let tone = buf.current_tone();
        if !tone.is_none() && !tone.compatible_with_sharp_final() {
            return Validity::Invalid;
        }
    }

    Validity::Valid
}

fn legal_initial(initial: &str, settings: &Settings) -> bool {
    if LEGAL_INITIALS.contains(&initial) {
        return true;
    }
    settings.allow_consonant_zfwj && EXTRA_INITIALS_ZFWJ.contains(&initial)
}

fn is_sharp_final(finalc: &str) -> bool {
    matches!(finalc, "c" | "ch" | "p" | "t")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::logical_char::{Base, LogicalChar, Tone};

    fn type_word(raw: &str) -> WordBuffer {
        let mut buf = WordBuffer::new();
        for c in raw.chars() {
            let base = if "aeiouy".contains(c) {
                Base::Vowel(c)
            } else {
                Base::Consonant(c)
            };
            buf.append(LogicalChar::new(base, c, false));
        }
        buf
    }

    #[test]
    fn plausible_syllable_is_valid() {
        let buf = type_word("toan");
        assert_eq!(validate(&buf, &Settings::default(), &NoDictionary), Validity::Valid);
    }

    #[test]
    fn illegal_final_is_invalid() {
        let buf = type_word("tox"); // final "x" is not a legal Vietnamese final
        assert_eq!(validate(&buf, &Settings::default(), &NoDictionary), Validity::Invalid);
    }

    #[test]
    fn illegal_initial_cluster_is_invalid() {
        let buf = type_word("zin"); // "z" initial disallowed unless zfwj extension on
        assert_eq!(validate(&buf, &Settings::default(), &NoDictionary), Validity::Invalid);
    }

    #[test]
    fn zfwj_extension_allows_z_initial() {
        let buf = type_word("zin");
        let mut settings = Settings::default();
        settings.allow_consonant_zfwj = true;
        assert_eq!(validate(&buf, &settings, &NoDictionary), Validity::Valid);
    }

    #[test]
    fn dictionary_override_wins() {
        struct Always;
        impl SpellingDictionary for Always {
            fn contains(&self, _: &str) -> bool {
                true
            }
        }
        let buf = type_word("zzz");
        assert_eq!(validate(&buf, &Settings::default(), &Always), Validity::Valid);
    }

    #[test]
    fn sharp_final_rejects_incompatible_tone() {
        let mut buf = type_word("toc");
        buf.apply_tone(Tone::Grave, true, false);
        assert_eq!(validate(&buf, &Settings::default(), &NoDictionary), Validity::Invalid);
    }

    #[test]
    fn sharp_final_accepts_acute() {
        let mut buf = type_word("toc");
        buf.apply_tone(Tone::Acute, true, false);
        assert_eq!(validate(&buf, &Settings::default(), &NoDictionary), Validity::Valid);
    }
}
