//! `WordBuffer` (C2) — the ordered sequence of [`LogicalChar`] slots making
//! up the word currently under composition.
//!
//! This module owns slot storage, merging (`d+d -> đ`), backspace, and
//! final-form projection. Mark/tone *placement policy* — which slot a tone
//! or vowel-mark lands on — lives in [`crate::placer`]; this type only
//! exposes the primitives the placer needs (`vowel_run`, `set_tone_slot`,
//! `clear_tone`) plus thin `apply_mark`/`apply_tone` entry points that
//! simply delegate to the placer.

use unicode_normalization::UnicodeNormalization;

use crate::domain::diff::Diff;
use crate::domain::logical_char::{Base, LogicalChar, Mark, Tone};
use crate::placer;
use crate::settings::CodeTable;

/// Maximum slots a single word buffer holds. Generous relative to any real
/// Vietnamese syllable (longest valid syllables run 7-8 letters); guards
/// against unbounded growth from a stuck non-breaking key stream.
pub const MAX_SLOTS: usize = 64;

#[derive(Debug, Clone)]
pub struct WordBuffer {
    slots: Vec<LogicalChar>,
    /// Index into `slots` of the slot currently carrying the syllable tone,
    /// if any.
    tone_slot: Option<usize>,
    /// Denormalized copy of `Settings::modern_style`, kept current by
    /// [`WordBuffer::set_modern_style`] so `append`/`backspace` can recompute
    /// tone placement without threading settings through every call; tone
    /// placement must be recomputed after every buffer edit.
    modern_style: bool,
    /// Denormalized copy of `Settings::free_mark`, kept current by
    /// [`WordBuffer::set_free_mark`]. When set, [`placer::reposition_tone`]
    /// leaves an already-placed tone alone on every subsequent edit instead
    /// of re-homing it to the nucleus's ideal slot.
    free_mark: bool,
}

impl Default for WordBuffer {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            tone_slot: None,
            modern_style: true,
            free_mark: false,
        }
    }
}

impl WordBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn modern_style(&self) -> bool {
        self.modern_style
    }

    pub fn set_modern_style(&mut self, modern_style: bool) {
        self.modern_style = modern_style;
    }

    pub fn free_mark(&self) -> bool {
        self.free_mark
    }

    pub fn set_free_mark(&mut self, free_mark: bool) {
        self.free_mark = free_mark;
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn slots(&self) -> &[LogicalChar] {
        &self.slots
    }

    pub fn slots_mut(&mut self) -> &mut Vec<LogicalChar> {
        &mut self.slots
    }

    pub fn last(&self) -> Option<&LogicalChar> {
        self.slots.last()
    }

    pub fn tone_slot(&self) -> Option<usize> {
        self.tone_slot
    }

    pub fn set_tone_slot(&mut self, idx: Option<usize>) {
        if let Some(old) = self.tone_slot {
            if Some(old) != idx {
                if let Some(slot) = self.slots.get_mut(old) {
                    slot.tone = Tone::None;
                }
            }
        }
        self.tone_slot = idx;
        if let Some(i) = idx {
            // caller is responsible for setting slots[i].tone before/after;
            // this only repoints the index and clears the vacated slot.
            debug_assert!(i < self.slots.len());
        }
    }

    pub fn current_tone(&self) -> Tone {
        self.tone_slot
            .and_then(|i| self.slots.get(i))
            .map(|s| s.tone)
            .unwrap_or(Tone::None)
    }

    /// Clear any tone currently set, on all slots.
    pub fn clear_tone(&mut self) {
        if let Some(i) = self.tone_slot.take() {
            if let Some(slot) = self.slots.get_mut(i) {
                slot.tone = Tone::None;
            }
        }
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.tone_slot = None;
    }

    /// Indices of the maximal contiguous run of vowel slots making up the
    /// buffer's vowel nucleus. Non-vowel slots after the last vowel run (a final consonant)
    /// are not included; slots before an intervening consonant are not
    /// included either, since Vietnamese syllables have one nucleus.
    pub fn vowel_run(&self) -> Vec<usize> {
        let mut run = Vec::new();
        let mut last_complete = Vec::new();
        for (i, slot) in self.slots.iter().enumerate() {
            if slot.base.is_vowel() {
                run.push(i);
            } else if !run.is_empty() {
                last_complete = std::mem::take(&mut run);
            }
        }
        if run.is_empty() {
            last_complete
        } else {
            run
        }
    }

    /// Whether the buffer has a final consonant after the vowel nucleus.
    pub fn has_final_consonant(&self) -> bool {
        match self.vowel_run().last() {
            Some(&last_vowel_idx) => last_vowel_idx + 1 < self.slots.len(),
            None => false,
        }
    }

    /// Append a freshly classified slot. Handles the doubled-letter merges
    /// the classifier doesn't resolve itself (`d+d -> đ` in Telex/VIQR).
    /// Returns the previous projection length consumed by the merge, so
    /// callers can build a Diff (0 when no merge happened — append always
    /// net-adds exactly one glyph in that case).
    pub fn append(&mut self, ch: LogicalChar) {
        let merged = if let Some(last) = self.slots.last_mut() {
            if let (Base::Consonant('d'), Base::Consonant('d')) = (last.base, ch.base) {
                if last.mark.is_none() {
                    for k in &ch.origin_keys {
                        last.push_origin(*k);
                    }
                    last.set_mark(Mark::Bar);
                    true
                } else {
                    false
                }
            } else {
                false
            }
        } else {
            false
        };
        if !merged {
            self.slots.push(ch);
        }
        // Appending can change which slot is the tone-ideal one (e.g. a
        // final consonant landing after a two-vowel nucleus), so the tone
        // (if any is set) is re-homed here too, same as after a backspace.
        placer::reposition_tone(self);
    }

    /// Remove the last slot. If it carried the syllable tone, the placer
    /// re-derives where the tone should now live among the remaining slots,
    /// or clears it if none remain.
    pub fn backspace(&mut self) -> Diff {
        if self.slots.is_empty() {
            return Diff::NoOp;
        }
        let before = self.project_unicode();
        let removed_idx = self.slots.len() - 1;
        let tone_was_here = self.tone_slot == Some(removed_idx);
        self.slots.pop();
        if tone_was_here {
            self.tone_slot = None;
        }
        placer::reposition_tone(self);
        let after = self.project_unicode();
        Diff::between(&before, &after)
    }

    /// Delegates to the placer: apply a non-tone vowel mark to the most
    /// recently eligible vowel, toggling it off if already present.
    pub fn apply_mark(&mut self, mark: Mark) -> Diff {
        let before = self.project_unicode();
        placer::apply_mark(self, mark);
        let after = self.project_unicode();
        Diff::between(&before, &after)
    }

    /// Delegates to the placer: place `tone` on the correct nucleus slot per
    /// the modern/traditional rule table, toggling off if the slot already
    /// carries it. Under `free_mark`, lands on the most recently typed vowel
    /// instead, without relocating it afterward.
    pub fn apply_tone(&mut self, tone: Tone, modern_style: bool, free_mark: bool) -> Diff {
        let before = self.project_unicode();
        placer::apply_tone(self, tone, modern_style, free_mark);
        let after = self.project_unicode();
        Diff::between(&before, &after)
    }

    /// Render slots to final-form NFC code points under `table`. Pure.
    pub fn project(&self, table: CodeTable) -> Vec<char> {
        let codepoints = self.project_unicode();
        match table {
            CodeTable::Unicode => codepoints,
            other => crate::encoding::convert(&codepoints, other),
        }
    }

    /// Project under Unicode specifically; used internally for diffing
    /// since Diff always carries Unicode code points regardless of the
    /// active output code table (the Arbiter re-encodes at the very end).
    pub fn project_unicode(&self) -> Vec<char> {
        let mut out = Vec::with_capacity(self.slots.len() + 1);
        for (i, slot) in self.slots.iter().enumerate() {
            out.push(slot.base_glyph());
            if self.tone_slot == Some(i) {
                if let Some(mark) = slot.tone.combining_mark() {
                    out.push(mark);
                }
            }
        }
        // Compose combining marks into precomposed code points so the Diff
        // carries one code point per glyph, matching `length_glyphs`.
        compose_nfc(&out)
    }

    pub fn length_glyphs(&self) -> usize {
        self.project_unicode().len()
    }

    pub fn raw_keys(&self) -> String {
        self.slots.iter().flat_map(|s| s.origin_keys.iter()).collect()
    }

    pub fn current_word(&self) -> String {
        self.project_unicode().into_iter().collect()
    }
}

/// Compose a base letter followed by a combining tone mark into the single
/// precomposed Vietnamese code point (NFC), so the Diff always carries one
/// code point per glyph.
fn compose_nfc(chars: &[char]) -> Vec<char> {
    chars.iter().collect::<String>().nfc().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::logical_char::Base;

    fn push_plain(buf: &mut WordBuffer, c: char) {
        let base = if "aeiouy".contains(c) {
            Base::Vowel(c)
        } else {
            Base::Consonant(c)
        };
        buf.append(LogicalChar::new(base, c, false));
    }

    #[test]
    fn dd_merges_into_stroke_d() {
        let mut buf = WordBuffer::new();
        push_plain(&mut buf, 'd');
        push_plain(&mut buf, 'd');
        assert_eq!(buf.len(), 1);
        assert_eq!(buf.current_word(), "đ");
    }

    #[test]
    fn backspace_on_empty_is_noop() {
        let mut buf = WordBuffer::new();
        assert_eq!(buf.backspace(), Diff::NoOp);
    }

    #[test]
    fn backspace_removes_last_slot() {
        let mut buf = WordBuffer::new();
        push_plain(&mut buf, 'h');
        push_plain(&mut buf, 'o');
        buf.backspace();
        assert_eq!(buf.current_word(), "h");
    }

    #[test]
    fn vowel_run_identifies_nucleus() {
        let mut buf = WordBuffer::new();
        for c in ['t', 'o', 'a', 'n'] {
            push_plain(&mut buf, c);
        }
        assert_eq!(buf.vowel_run(), vec![1, 2]);
        assert!(buf.has_final_consonant());
    }

    #[test]
    fn raw_keys_concatenates_origins() {
        let mut buf = WordBuffer::new();
        push_plain(&mut buf, 'h');
        push_plain(&mut buf, 'i');
        assert_eq!(buf.raw_keys(), "hi");
    }
}
