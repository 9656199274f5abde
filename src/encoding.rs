//! Output code-table conversion: render composed Vietnamese code points into
//! the legacy single-byte encodings some older host applications still
//! expect, or into the "compound" base+modifier-code representation some
//! VNI-era software reads directly (selected via the `code_table` setting).
//!
//! [`crate::domain::WordBuffer::project`] always composes to Unicode NFC
//! first; this module only re-renders that already-correct Unicode text, so
//! placement logic (C3) never has to know which code table is active.

use crate::settings::CodeTable;

/// Re-render `codepoints` (already-composed Unicode Vietnamese) under
/// `table`. `table == CodeTable::Unicode` is handled by the caller and never
/// reaches here.
pub fn convert(codepoints: &[char], table: CodeTable) -> Vec<char> {
    match table {
        CodeTable::Unicode => codepoints.to_vec(),
        CodeTable::Tcvn3 => codepoints.iter().map(|&c| to_tcvn3(c)).collect(),
        CodeTable::VniWindows | CodeTable::Compound => {
            codepoints.iter().flat_map(|&c| to_compound(c)).collect()
        }
    }
}

/// TCVN3 is a single-byte legacy encoding: every precomposed Vietnamese
/// letter maps to one byte in the 0x80-0xFC range under a custom font.
/// Represented here as the Latin-1 code point with that byte value, which
/// is how the legacy font-substitution trick actually worked on Windows.
fn to_tcvn3(ch: char) -> char {
    let byte: u8 = match ch {
        'à' => 0xB5, 'á' => 0xB8, 'ả' => 0xB6, 'ã' => 0xB7, 'ạ' => 0xB9,
        'ă' => 0xBE, 'ằ' => 0xBF, 'ắ' => 0xC1, 'ẳ' => 0xC0, 'ẵ' => 0xC2, 'ặ' => 0xC3,
        'â' => 0xC4, 'ầ' => 0xC5, 'ấ' => 0xC7, 'ẩ' => 0xC6, 'ẫ' => 0xC8, 'ậ' => 0xC9,
        'è' => 0xCC, 'é' => 0xCE, 'ẻ' => 0xCD, 'ẽ' => 0xCF, 'ẹ' => 0xD0,
        'ê' => 0xD1, 'ề' => 0xD2, 'ế' => 0xD4, 'ể' => 0xD3, 'ễ' => 0xD5, 'ệ' => 0xD6,
        'ì' => 0xD7, 'í' => 0xD9, 'ỉ' => 0xD8, 'ĩ' => 0xDA, 'ị' => 0xDB,
        'ò' => 0xDC, 'ó' => 0xDE, 'ỏ' => 0xDD, 'õ' => 0xDF, 'ọ' => 0xE0,
        'ô' => 0xE1, 'ồ' => 0xE2, 'ố' => 0xE4, 'ổ' => 0xE3, 'ỗ' => 0xE5, 'ộ' => 0xE6,
        'ơ' => 0xE7, 'ờ' => 0xE8, 'ớ' => 0xEA, 'ở' => 0xE9, 'ỡ' => 0xEB, 'ợ' => 0xEC,
        'ù' => 0xED, 'ú' => 0xEF, 'ủ' => 0xEE, 'ũ' => 0xF0, 'ụ' => 0xF1,
        'ư' => 0xF2, 'ừ' => 0xF3, 'ứ' => 0xF5, 'ử' => 0xF4, 'ữ' => 0xF6, 'ự' => 0xF7,
        'ỳ' => 0xF8, 'ý' => 0xFA, 'ỷ' => 0xF9, 'ỹ' => 0xFB, 'ỵ' => 0xFC,
        'đ' => 0xAE,
        'À' => 0x80, 'Á' => 0x81, 'Ả' => 0x82, 'Ã' => 0x83, 'Ạ' => 0x84,
        'Ă' => 0x85, 'Ằ' => 0x86, 'Ắ' => 0x87, 'Ẳ' => 0x88, 'Ẵ' => 0x89, 'Ặ' => 0x8A,
        'Â' => 0x8B, 'Ầ' => 0x8C, 'Ấ' => 0x8D, 'Ẩ' => 0x8E, 'Ẫ' => 0x8F, 'Ậ' => 0x90,
        'È' => 0x91, 'É' => 0x92, 'Ẻ' => 0x93, 'Ẽ' => 0x94, 'Ẹ' => 0x95,
        'Ê' => 0x96, 'Ề' => 0x97, 'Ế' => 0x98, 'Ể' => 0x99, 'Ễ' => 0x9A, 'Ệ' => 0x9B,
        'Ì' => 0x9C, 'Í' => 0x9D, 'Ỉ' => 0x9E, 'Ĩ' => 0x9F, 'Ị' => 0xA0,
        'Ò' => 0xA1, 'Ó' => 0xA2, 'Ỏ' => 0xA3, 'Õ' => 0xA4, 'Ọ' => 0xA5,
        'Ô' => 0xA6, 'Ồ' => 0xA7, 'Ố' => 0xA8, 'Ổ' => 0xA9, 'Ỗ' => 0xAA, 'Ộ' => 0xAB,
        'Đ' => 0xAC,
        c if c.is_ascii() => return c,
        _ => return '?',
    };
    byte as char
}

/// Decompose a precomposed Vietnamese letter into its base ASCII letter
/// followed by VNI-style numeric modifier codes (1-5 tones, 6 circumflex,
/// 7 horn, 8 breve, 9 bar). This is the
/// representation some legacy VNI-Windows fonts and "compound" consumers
/// expect instead of a precomposed Unicode glyph.
fn to_compound(ch: char) -> Vec<char> {
    let Some((base, codes)) = decompose_vietnamese(ch) else {
        return vec![ch];
    };
    let mut out = vec![base];
    out.extend(codes);
    out
}

fn decompose_vietnamese(ch: char) -> Option<(char, Vec<char>)> {
    let lower = ch.to_ascii_lowercase();
    let is_upper = ch.is_uppercase();
    let (base, mark_code, tone_code): (char, Option<char>, Option<char>) = match lower {
        'à' => ('a', None, Some('2')), 'á' => ('a', None, Some('1')),
        'ả' => ('a', None, Some('3')), 'ã' => ('a', None, Some('4')), 'ạ' => ('a', None, Some('5')),
        'ă' => ('a', Some('8'), None),
        'ằ' => ('a', Some('8'), Some('2')), 'ắ' => ('a', Some('8'), Some('1')),
        'ẳ' => ('a', Some('8'), Some('3')), 'ẵ' => ('a', Some('8'), Some('4')), 'ặ' => ('a', Some('8'), Some('5')),
        'â' => ('a', Some('6'), None),
        'ầ' => ('a', Some('6'), Some('2')), 'ấ' => ('a', Some('6'), Some('1')),
        'ẩ' => ('a', Some('6'), Some('3')), 'ẫ' => ('a', Some('6'), Some('4')), 'ậ' => ('a', Some('6'), Some('5')),
        'è' => ('e', None, Some('2')), 'é' => ('e', None, Some('1')),
        'ẻ' => ('e', None, Some('3')), 'ẽ' => ('e', None, Some('4')), 'ẹ' => ('e', None, Some('5')),
        'ê' => ('e', Some('6'), None),
        'ề' => ('e', Some('6'), Some('2')), 'ế' => ('e', Some('6'), Some('1')),
        'ể' => ('e', Some('6'), Some('3')), 'ễ' => ('e', Some('6'), Some('4')), 'ệ' => ('e', Some('6'), Some('5')),
        'ì' => ('i', None, Some('2')), 'í' => ('i', None, Some('1')),
        'ỉ' => ('i', None, Some('3')), 'ĩ' => ('i', None, Some('4')), 'ị' => ('i', None, Some('5')),
        'ò' => ('o', None, Some('2')), 'ó' => ('o', None, Some('1')),
        'ỏ' => ('o', None, Some('3')), 'õ' => ('o', None, Some('4')), 'ọ' => ('o', None, Some('5')),
        'ô' => ('o', Some('6'), None),
        'ồ' => ('o', Some('6'), Some('2')), 'ố' => ('o', Some('6'), Some('1')),
        'ổ' => ('o', Some('6'), Some('3')), 'ỗ' => ('o', Some('6'), Some('4')), 'ộ' => ('o', Some('6'), Some('5')),
        'ơ' => ('o', Some('7'), None),
        'ờ' => ('o', Some('7'), Some('2')), 'ớ' => ('o', Some('7'), Some('1')),
        'ở' => ('o', Some('7'), Some('3')), 'ỡ' => ('o', Some('7'), Some('4')), 'ợ' => ('o', Some('7'), Some('5')),
        'ù' => ('u', None, Some('2')), 'ú' => ('u', None, Some('1')),
        'ủ' => ('u', None, Some('3')), 'ũ' => ('u', None, Some('4')), 'ụ' => ('u', None, Some('5')),
        'ư' => ('u', Some('7'), None),
        'ừ' => ('u', Some('7'), Some('2')), 'ứ' => ('u', Some('7'), Some('1')),
        'ử' => ('u', Some('7'), Some('3')), 'ữ' => ('u', Some('7'), Some('4')), 'ự' => ('u', Some('7'), Some('5')),
        'ỳ' => ('y', None, Some('2')), 'ý' => ('y', None, Some('1')),
        'ỷ' => ('y', None, Some('3')), 'ỹ' => ('y', None, Some('4')), 'ỵ' => ('y', None, Some('5')),
        'đ' => ('d', Some('9'), None),
        _ => return None,
    };
    let base = if is_upper {
        base.to_ascii_uppercase()
    } else {
        base
    };
    let mut codes = Vec::with_capacity(2);
    codes.extend(mark_code);
    codes.extend(tone_code);
    Some((base, codes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unicode_passes_through() {
        let chars: Vec<char> = "Việt Nam".chars().collect();
        assert_eq!(convert(&chars, CodeTable::Unicode), chars);
    }

    #[test]
    fn tcvn3_known_mappings() {
        assert_eq!(to_tcvn3('đ'), 0xAEu8 as char);
        assert_eq!(to_tcvn3('à'), 0xB5u8 as char);
        assert_eq!(to_tcvn3('H'), 'H');
    }

    #[test]
    fn compound_decomposes_tone_and_mark() {
        assert_eq!(to_compound('á'), vec!['a', '1']);
        assert_eq!(to_compound('ộ'), vec!['o', '6', '5']);
        assert_eq!(to_compound('đ'), vec!['d', '9']);
        assert_eq!(to_compound('k'), vec!['k']);
    }

    #[test]
    fn compound_preserves_case() {
        assert_eq!(to_compound('Ấ'), vec!['A', '6', '1']);
    }
}
