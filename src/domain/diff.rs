//! `Diff` — the engine's only output. Every path through the Session
//! Controller ends in one of these, never an error: user-intent mismatches
//! (bad spelling, an inapplicable mark) are encoded as a `Restore`, not a
//! thrown exception.

/// Minimal on-screen edit caused by one keystroke, word-break, or
/// undo-typing call.
///
/// `NoOp` always means "the host should behave as if we were never here":
/// the key falls through and nothing is deleted or inserted. `Edit` and
/// `Restore` both consume the originating key even when they carry zero
/// deletes and zero inserts — a classified-but-inert keystroke (e.g. a tone
/// mark with no eligible vowel) still claims the key so the host doesn't
/// double-insert it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Diff {
    #[default]
    NoOp,
    /// A normal composition rewrite: delete `delete_count` glyphs left of
    /// the cursor, then insert `insert`.
    Edit { delete_count: u16, insert: Vec<char> },
    /// Same shape as `Edit`, but semantically a restore of raw keystrokes
    /// (undo-typing, restore-on-bad-spelling, backspace-restore) rather than
    /// a forward composition step. Kept as a distinct variant so callers and
    /// tests can tell the two apart without inspecting content.
    Restore { delete_count: u16, insert: Vec<char> },
}

impl Diff {
    pub fn edit(delete_count: u16, insert: Vec<char>) -> Self {
        Diff::Edit { delete_count, insert }
    }

    pub fn restore(delete_count: u16, insert: Vec<char>) -> Self {
        Diff::Restore { delete_count, insert }
    }

    /// Whether the host must not let the originating key fall through.
    #[inline]
    pub fn consume(&self) -> bool {
        !matches!(self, Diff::NoOp)
    }

    #[inline]
    pub fn delete_count(&self) -> u16 {
        match self {
            Diff::NoOp => 0,
            Diff::Edit { delete_count, .. } | Diff::Restore { delete_count, .. } => *delete_count,
        }
    }

    pub fn insert(&self) -> &[char] {
        match self {
            Diff::NoOp => &[],
            Diff::Edit { insert, .. } | Diff::Restore { insert, .. } => insert,
        }
    }

    /// Minimal edit transforming `from` into `to`, expressed as a common
    /// prefix retained and a rewritten tail. Used throughout C3/C7 to avoid
    /// deleting/reinserting glyphs that didn't change.
    pub fn between(from: &[char], to: &[char]) -> Diff {
        let common = from
            .iter()
            .zip(to.iter())
            .take_while(|(a, b)| a == b)
            .count();
        let delete_count = (from.len() - common) as u16;
        let insert: Vec<char> = to[common..].to_vec();
        if delete_count == 0 && insert.is_empty() {
            Diff::Edit { delete_count: 0, insert: Vec::new() }
        } else {
            Diff::Edit { delete_count, insert }
        }
    }
}
