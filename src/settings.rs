//! `Settings` — the engine's configuration record.
//!
//! Delivered to the engine with an explicit [`crate::engine::Engine::update_settings`]
//! call; the engine holds no listeners of its own and never reaches for a
//! global settings singleton.

use serde::{Deserialize, Serialize};

/// Romanization scheme selecting which [`crate::classify::Scheme`]
/// implementation classifies keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputMethod {
    Telex,
    Vni,
    Viqr,
    SimpleTelex1,
    SimpleTelex2,
}

impl Default for InputMethod {
    fn default() -> Self {
        InputMethod::Telex
    }
}

/// Output encoding for [`crate::domain::WordBuffer::project`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CodeTable {
    Unicode,
    Tcvn3,
    VniWindows,
    Compound,
}

impl Default for CodeTable {
    fn default() -> Self {
        CodeTable::Unicode
    }
}

/// The engine's full configuration record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub input_method: InputMethod,
    pub code_table: CodeTable,
    /// Tone placement table: oa/oe/uy handling in open two-vowel nuclei.
    pub modern_style: bool,
    pub spell_check: bool,
    pub restore_if_wrong_spelling: bool,
    /// `cc -> ch`-style speed-typing rewrites.
    pub quick_telex: bool,
    /// `f -> ph`, `j -> gi`, `w -> qu` at word start.
    pub quick_consonant_start: bool,
    /// `g -> ng`, `h -> nh`, `k -> ch` at word end, only if the result is
    /// still a plausible syllable.
    pub quick_consonant_end: bool,
    /// Allow tone placement on non-nuclear vowels without relocation.
    pub free_mark: bool,
    /// Extend the legal initial-consonant set with z/f/w/j.
    pub allow_consonant_zfwj: bool,
    pub upper_case_first_char: bool,
    pub macros_enabled: bool,
    pub macros_in_english_mode: bool,
    pub auto_caps_macro: bool,
    /// Allow the Arbiter's Chrome/autocomplete backspace-count compensation.
    pub fix_autocomplete: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            input_method: InputMethod::default(),
            code_table: CodeTable::default(),
            modern_style: true,
            spell_check: true,
            restore_if_wrong_spelling: true,
            quick_telex: false,
            quick_consonant_start: false,
            quick_consonant_end: false,
            free_mark: false,
            allow_consonant_zfwj: false,
            upper_case_first_char: false,
            macros_enabled: true,
            macros_in_english_mode: false,
            auto_caps_macro: true,
            fix_autocomplete: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_match_documented_defaults() {
        let s = Settings::default();
        assert_eq!(s.input_method, InputMethod::Telex);
        assert_eq!(s.code_table, CodeTable::Unicode);
        assert!(s.modern_style);
        assert!(s.restore_if_wrong_spelling);
    }

    #[test]
    fn settings_roundtrip_through_json() {
        let s = Settings::default();
        let json = serde_json::to_string(&s).expect("serialize");
        let back: Settings = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(s, back);
    }
}
