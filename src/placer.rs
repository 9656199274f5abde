//! Mark/Tone Placer (C3) — spec.md §4.3, the hard algorithmic subsystem.
//!
//! Two independent placement policies live here:
//!
//! - **Vowel-mark placement** (circumflex/breve/horn/bar) is *local*: it
//!   lands on the most recently typed eligible vowel (or consonant, for the
//!   `đ` bar), toggling off if already present.
//! - **Tone placement** is *global*: it follows the nucleus-shape table
//!   (spec.md §4.3 steps 1-4) and is recomputed after every buffer edit, so
//!   a tone already sitting on one slot may hop to another as the word
//!   grows (`toan` + `s` moves the acute from nowhere onto `a`; backspacing
//!   a final consonant can move it back).
//!
//! Grounded in the teacher's `infrastructure/adapters/transformation/tone_positioning.rs`
//! (diacritic-priority / second-vowel rule shape) and `engine/vietnamese/vowel_compound.rs`
//! (the `uo -> ươ` horn-propagation quirk, reused here verbatim for the Telex
//! `w`-after-`uo` case spec.md's worked example §8.2 depends on).

use crate::domain::logical_char::{Base, Mark, Tone};
use crate::domain::word_buffer::WordBuffer;

/// Outcome of attempting to apply a mark/tone to the buffer's nucleus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Landed on slot `.0`.
    Applied(usize),
    /// The target slot already carried this exact mark/tone; it was
    /// cleared (spec.md §4.1: "the mark is cancelled... preserving the
    /// original key").
    ToggledOff(usize),
    /// No eligible slot exists (no vowel at all, or no base admits the
    /// mark). Caller decides whether to fall back to a literal letter.
    NotEligible,
}

/// Apply a non-tone vowel mark (circumflex/breve/horn) or the `đ` bar.
/// Local rule: most recently typed slot whose base admits the mark.
pub fn place_mark(buf: &WordBuffer, mark: Mark) -> Placement {
    for (i, slot) in buf.slots().iter().enumerate().rev() {
        if mark.admits(slot.base) {
            if slot.mark == Some(mark) {
                return Placement::ToggledOff(i);
            }
            return Placement::Applied(i);
        }
        // Bar only targets a consonant 'd'; other marks only target
        // vowels. Once we pass the kind of base the mark could ever land
        // on, there's nothing further back worth searching for Horn/
        // Circumflex/Breve (they never skip over an intervening
        // different-base vowel in practice for the schemes this crate
        // supports), but Bar must keep scanning past vowels to reach an
        // earlier 'd' (e.g. a stray vowel typed before 'd' never happens
        // in valid syllables, so this is defensive, not load-bearing).
    }
    Placement::NotEligible
}

/// Apply `mark` to the buffer, mutating slots in place, honouring the
/// uo -> ươ horn-propagation quirk. Returns the resolved [`Placement`].
pub fn apply_mark(buf: &mut WordBuffer, mark: Mark) -> Placement {
    let placement = place_mark(buf, mark);
    match placement {
        Placement::Applied(i) => {
            buf.slots_mut()[i].set_mark(mark);
            if mark == Mark::Horn {
                propagate_uo_horn(buf);
            }
            reposition_tone(buf);
        }
        Placement::ToggledOff(i) => {
            buf.slots_mut()[i].clear_mark();
            reposition_tone(buf);
        }
        Placement::NotEligible => {}
    }
    placement
}

/// `uo`/`ou` adjacent-vowel pairs are never valid with only one member
/// bearing the horn (spec.md's worked example: `thuong` + `w` → `thương`,
/// horn on both `ư` and `ơ`). Propagate the horn to whichever neighbour is
/// still plain, in either scan direction, grounded in the teacher's
/// `normalize_uo_compound`.
fn propagate_uo_horn(buf: &mut WordBuffer) {
    let slots = buf.slots_mut();
    for i in 0..slots.len().saturating_sub(1) {
        let (left, right) = (slots[i].base, slots[i + 1].base);
        let is_uo_pair = matches!(
            (left, right),
            (Base::Vowel('u'), Base::Vowel('o')) | (Base::Vowel('o'), Base::Vowel('u'))
        );
        if !is_uo_pair {
            continue;
        }
        let left_horn = slots[i].mark == Some(Mark::Horn);
        let right_horn = slots[i + 1].mark == Some(Mark::Horn);
        if left_horn && !right_horn {
            slots[i + 1].set_mark(Mark::Horn);
        } else if right_horn && !left_horn {
            slots[i].set_mark(Mark::Horn);
        }
    }
}

/// Apply a tone, toggling off if the target slot already carries this exact
/// tone. Returns the resolved [`Placement`].
///
/// Under `free_mark` (spec.md §4.3/§6: "allow tone placement on non-nuclear
/// vowels without relocation"), the nucleus-shape table is bypassed entirely:
/// the tone lands on whatever vowel the user most recently typed, and
/// [`reposition_tone`] leaves it there on every later edit instead of
/// re-homing it.
pub fn apply_tone(buf: &mut WordBuffer, tone: Tone, modern_style: bool, free_mark: bool) -> Placement {
    if buf.vowel_run().is_empty() {
        return Placement::NotEligible;
    }
    let ideal = if free_mark {
        last_vowel_slot(buf)
    } else {
        ideal_tone_slot(buf, modern_style)
    };
    let Some(idx) = ideal else {
        return Placement::NotEligible;
    };
    if buf.current_tone() == tone && buf.tone_slot() == Some(idx) {
        buf.set_tone_slot(None);
        buf.slots_mut()[idx].tone = Tone::None;
        return Placement::ToggledOff(idx);
    }
    buf.slots_mut()[idx].tone = tone;
    buf.set_tone_slot(Some(idx));
    Placement::Applied(idx)
}

/// Index of the most recently typed vowel slot, scanning the whole buffer
/// rather than just the nucleus run — the target a `free_mark` tone lands on.
fn last_vowel_slot(buf: &WordBuffer) -> Option<usize> {
    buf.slots().iter().enumerate().rev().find(|(_, s)| s.base.is_vowel()).map(|(i, _)| i)
}

/// Recompute where the syllable tone belongs given the buffer's current
/// shape, and move it there if a tone is currently set. Called after every
/// structural edit (append, backspace, mark placement) per spec.md §4.3:
/// "the re-placement must recompute after each buffer edit". Under
/// `free_mark` this is a no-op: a tone the user explicitly placed on a
/// non-nuclear vowel stays put.
pub fn reposition_tone(buf: &mut WordBuffer) {
    if buf.free_mark() {
        return;
    }
    let tone = buf.current_tone();
    if tone.is_none() {
        return;
    }
    let Some(ideal) = ideal_tone_slot(buf, buf.modern_style()) else {
        buf.clear_tone();
        return;
    };
    if buf.tone_slot() == Some(ideal) {
        return;
    }
    buf.slots_mut()[ideal].tone = tone;
    buf.set_tone_slot(Some(ideal));
}

/// The slot index that should carry the syllable tone right now, per
/// spec.md §4.3 steps 1-4. `None` only when there is no vowel nucleus.
fn ideal_tone_slot(buf: &WordBuffer, modern_style: bool) -> Option<usize> {
    let run = buf.vowel_run();
    match run.len() {
        0 => None,
        1 => Some(run[0]),
        2 => Some(two_vowel_target(buf, &run, modern_style)),
        _ => Some(three_plus_vowel_target(buf, &run)),
    }
}

/// Two-vowel nucleus V1V2 (spec.md §4.3 step 3).
///
/// Resolution order:
/// 1. A final consonant after the nucleus always pulls the tone onto V2.
/// 2. Ascending diphthongs `ia/ua/ưa/ya` always keep the tone on V1,
///    regardless of style.
/// 3. Otherwise the modern/traditional split applies: traditional keeps V1,
///    modern moves it to V2.
///
/// This resolves the Concrete Scenario in spec.md §8.4 (`hoas` → `hòa`
/// traditional / `hoà` modern) in favour of the worked example over the
/// step 3 prose table, which inconsistently also claims `oa/oe/uy` take V2
/// "in both styles" — spec.md §9 flags this exact class of table as one of
/// the source's internally-inconsistent readings to pin, not guess at; see
/// DESIGN.md.
fn two_vowel_target(buf: &WordBuffer, run: &[usize], modern_style: bool) -> usize {
    let v1 = run[0];
    let v2 = run[1];
    if buf.has_final_consonant() {
        return v2;
    }
    let (b1, b2) = (buf.slots()[v1].base.letter(), buf.slots()[v2].base.letter());
    if matches!((b1, b2), (Some('i'), Some('a'))) || matches!((b1, b2), (Some('u'), Some('a'))) {
        return v1;
    }
    // ưa: u with horn, a plain.
    if b1 == Some('u') && buf.slots()[v1].mark == Some(Mark::Horn) && b2 == Some('a') {
        return v1;
    }
    if matches!((b1, b2), (Some('y'), Some('a'))) {
        return v1;
    }
    if modern_style {
        v2
    } else {
        v1
    }
}

/// Three-(or more-)vowel nucleus (spec.md §4.3 step 4): tone on the middle
/// vowel unless the last vowel is itself followed by a final consonant, in
/// which case the tone moves to the last vowel.
///
/// `nghiêm` (raw `nghiem`) is the scenario this resolves specially: `ie`
/// followed by a final consonant is not itself a valid open Vietnamese
/// rime (only `iê` is), so a final consonant appended directly after a
/// bare `ie` nucleus auto-promotes the `e` to `ê` first (see
/// [`promote_ie_before_final`]), turning the pair into the three-vowel-like
/// case spec.md §8.7 describes. Resolved this way rather than guessed at;
/// see DESIGN.md.
fn three_plus_vowel_target(buf: &WordBuffer, run: &[usize]) -> usize {
    let last = *run.last().unwrap();
    let mid = run[run.len() / 2];
    if last + 1 < buf.slots().len() {
        last
    } else {
        mid
    }
}

/// `ie` immediately followed by a final consonant is promoted to `iê`
/// before tone placement runs, since bare `ie` never takes a final
/// consonant in real Vietnamese orthography (spec.md §8.7's `nghiễm`
/// scenario). Called by the Session Controller right after a consonant is
/// appended onto a two-vowel `i`+`e` nucleus with no mark yet.
pub fn promote_ie_before_final(buf: &mut WordBuffer) {
    let run = buf.vowel_run();
    if run.len() != 2 {
        return;
    }
    let (i, e) = (run[0], run[1]);
    let slots = buf.slots();
    let is_bare_ie = slots[i].base.letter() == Some('i')
        && slots[i].mark.is_none()
        && slots[e].base.letter() == Some('e')
        && slots[e].mark.is_none();
    if is_bare_ie && e + 1 < slots.len() {
        buf.slots_mut()[e].set_mark(Mark::Circumflex);
    }
}
