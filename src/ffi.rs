//! C FFI surface (spec.md §6's external-interface boundary).
//!
//! Grounded directly in the teacher's root `lib.rs`: a single process-wide
//! `Mutex<Option<Engine>>` behind `#[no_mangle] extern "C"` functions, a
//! fixed-size `#[repr(C)]` result struct the caller polls instead of an
//! owned heap allocation per keystroke, and one `ime_init` that must run
//! before anything else. Kept at the FFI boundary only (spec.md §5/§9): the
//! `Engine`/`Session` types underneath take no lock and have no singleton of
//! their own, so a Rust caller can construct as many independent `Engine`s
//! as it wants without going through this module at all.
//!
//! Extends the teacher's surface per `SPEC_FULL.md` §6: `ime_word_break`,
//! `ime_undo_typing` and `ime_can_undo_typing` are first-class entry points
//! here (the teacher folds word-break/undo into its keycode dispatch table
//! instead), and panics are caught at every boundary per the
//! `catch_unwind`-wrapped pattern in the pack's `presentation::ffi::api`
//! (`khaphanspace-gonhanh.org` shares the same `Mutex<Option<Engine>>`
//! shape but never wraps `catch_unwind`; the teacher's FFI doesn't either —
//! a background OS service crossing a C ABI boundary can't let a Rust panic
//! unwind into the host process, so this crate adds the guard the pack
//! itself leaves out).

use std::ffi::{c_char, CStr, CString};
use std::panic;
use std::sync::Mutex;

use crate::domain::diff::Diff;
use crate::domain::session::ResetFlags;
use crate::engine::Engine;
use crate::macros::MacroStore;
use crate::settings::{CodeTable, InputMethod, Settings};

/// Longest `insert` an [`FfiDiff`] can carry inline. Generous relative to
/// [`crate::domain::word_buffer::MAX_SLOTS`] plus a macro expansion's
/// replacement text; a macro whose replacement runs longer is produced in
/// full by [`Engine::process_word_break`], it is only the FFI's fixed-array
/// transport that truncates (documented on [`FfiDiff`]).
pub const FFI_MAX_CHARS: usize = 128;

static ENGINE: Mutex<Option<Engine>> = Mutex::new(None);
static MACRO_STORE: Mutex<Option<MacroStore>> = Mutex::new(None);

fn lock_engine() -> std::sync::MutexGuard<'static, Option<Engine>> {
    ENGINE.lock().unwrap_or_else(|e| e.into_inner())
}

fn lock_macro_store() -> std::sync::MutexGuard<'static, Option<MacroStore>> {
    MACRO_STORE.lock().unwrap_or_else(|e| e.into_inner())
}

fn catch_panic<F: FnOnce() -> R + panic::UnwindSafe, R>(default: R, f: F) -> R {
    panic::catch_unwind(f).unwrap_or(default)
}

/// `Diff::Edit` / `Diff::Restore` discriminant for the FFI transport.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiAction {
    None = 0,
    Edit = 1,
    Restore = 2,
}

/// Fixed-layout mirror of [`Diff`] for the C ABI.
///
/// `chars` truncates silently past [`FFI_MAX_CHARS`] (`count` reflects only
/// what fit) rather than heap-allocating per keystroke — the hot per-key
/// path the teacher's own `Result` struct is grounded on makes the same
/// trade for the same reason (one allocation-free struct the host can stack
/// allocate and poll).
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct FfiDiff {
    pub action: u8,
    pub delete_count: u16,
    pub count: u16,
    pub chars: [u32; FFI_MAX_CHARS],
}

impl FfiDiff {
    fn none() -> Self {
        Self {
            action: FfiAction::None as u8,
            delete_count: 0,
            count: 0,
            chars: [0; FFI_MAX_CHARS],
        }
    }

    fn from_diff(diff: Diff) -> Self {
        let action = match diff {
            Diff::NoOp => return Self::none(),
            Diff::Edit { .. } => FfiAction::Edit,
            Diff::Restore { .. } => FfiAction::Restore,
        };
        let delete_count = diff.delete_count();
        let mut chars = [0u32; FFI_MAX_CHARS];
        let count = diff.insert().len().min(FFI_MAX_CHARS);
        for (slot, &c) in chars.iter_mut().zip(diff.insert().iter().take(count)) {
            *slot = c as u32;
        }
        Self {
            action: action as u8,
            delete_count,
            count: count as u16,
            chars,
        }
    }
}

/// Initialize the process-global engine. Must run before any other
/// `ime_*` call; safe to call again to reset to a fresh [`Engine`].
#[no_mangle]
pub extern "C" fn ime_init() {
    catch_panic((), || {
        *lock_engine() = Some(Engine::new());
    });
}

/// Tear down the process-global engine. No-op if never initialized.
#[no_mangle]
pub extern "C" fn ime_shutdown() {
    catch_panic((), || {
        *lock_engine() = None;
    });
}

fn with_engine<R>(default: R, f: impl FnOnce(&mut Engine) -> R + panic::UnwindSafe) -> R {
    catch_panic(default, || match lock_engine().as_mut() {
        Some(e) => f(e),
        None => default,
    })
}

/// Process one keystroke. `key` is a Unicode scalar value, not a physical
/// keycode — platform hosts translate their own keycode tables upstream of
/// this boundary (spec.md §6 leaves `physical_key_code` opaque to the
/// engine beyond classification, which only needs the logical character).
#[no_mangle]
pub extern "C" fn ime_key(key: u32, uppercase: bool) -> FfiDiff {
    with_engine(FfiDiff::none(), |e| match char::from_u32(key) {
        Some(c) => FfiDiff::from_diff(e.process_key(c, uppercase)),
        None => FfiDiff::none(),
    })
}

#[no_mangle]
pub extern "C" fn ime_backspace() -> FfiDiff {
    with_engine(FfiDiff::none(), |e| FfiDiff::from_diff(e.process_backspace()))
}

#[no_mangle]
pub extern "C" fn ime_word_break(boundary: u32) -> FfiDiff {
    with_engine(FfiDiff::none(), |e| {
        let c = char::from_u32(boundary).unwrap_or(' ');
        FfiDiff::from_diff(e.process_word_break(c))
    })
}

#[no_mangle]
pub extern "C" fn ime_undo_typing() -> FfiDiff {
    with_engine(FfiDiff::none(), |e| FfiDiff::from_diff(e.undo_typing()))
}

#[no_mangle]
pub extern "C" fn ime_can_undo_typing() -> bool {
    with_engine(false, |e| e.can_undo_typing())
}

/// `flags` bit 0 = `cursor_moved`, bit 1 = `preserve_mid_sentence`, per
/// spec.md §4.7's `reset(flags)` signature.
#[no_mangle]
pub extern "C" fn ime_reset(flags: u8) {
    with_engine((), |e| {
        e.reset(ResetFlags {
            cursor_moved: flags & 0b01 != 0,
            preserve_mid_sentence: flags & 0b10 != 0,
        });
    });
}

#[no_mangle]
pub extern "C" fn ime_method(method: u8) {
    with_engine((), |e| {
        let input_method = match method {
            0 => InputMethod::Telex,
            1 => InputMethod::Vni,
            2 => InputMethod::Viqr,
            3 => InputMethod::SimpleTelex1,
            4 => InputMethod::SimpleTelex2,
            _ => return,
        };
        let mut settings = *e.settings();
        settings.input_method = input_method;
        e.update_settings(settings);
    });
}

#[no_mangle]
pub extern "C" fn ime_code_table(table: u8) {
    with_engine((), |e| {
        let code_table = match table {
            0 => CodeTable::Unicode,
            1 => CodeTable::Tcvn3,
            2 => CodeTable::VniWindows,
            3 => CodeTable::Compound,
            _ => return,
        };
        let mut settings = *e.settings();
        settings.code_table = code_table;
        e.update_settings(settings);
    });
}

#[no_mangle]
pub extern "C" fn ime_enabled(enabled: bool) {
    with_engine((), |e| e.set_language_on(enabled));
}

/// Replace the whole settings record in one call, via a JSON payload
/// (the `Settings` struct's `serde` derive). Returns `false` and leaves the
/// engine's settings unchanged if `json` fails to parse.
///
/// # Safety
/// `json` must be a valid, null-terminated UTF-8 C string.
#[no_mangle]
pub unsafe extern "C" fn ime_update_settings_json(json: *const c_char) -> bool {
    catch_panic(false, || {
        let Some(json) = c_str_to_str(json) else { return false };
        let Ok(settings) = serde_json::from_str::<Settings>(json) else {
            return false;
        };
        with_engine((), |e| e.update_settings(settings));
        true
    })
}

/// Read the current word under composition as a freshly heap-allocated C
/// string. The caller must release it with [`ime_free_string`].
#[no_mangle]
pub extern "C" fn ime_current_word() -> *mut c_char {
    with_engine(std::ptr::null_mut(), |e| {
        string_to_c(e.current_word())
    })
}

/// # Safety
/// `ptr` must have been returned by [`ime_current_word`] or
/// [`ime_macro_export`] (or be null).
#[no_mangle]
pub unsafe extern "C" fn ime_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

/// Import a macro store from a JSON array of `{"trigger", "replacement"}`
/// objects (the teacher's `features::shortcut` import shape, upgraded to
/// `serde_json`), publishing the resulting snapshot to the process-global
/// engine. Returns `false` on parse failure.
///
/// # Safety
/// `json` must be a valid, null-terminated UTF-8 C string.
#[no_mangle]
pub unsafe extern "C" fn ime_macro_import(json: *const c_char) -> bool {
    catch_panic(false, || {
        let Some(json) = c_str_to_str(json) else { return false };
        let mut store = MacroStore::new();
        if store.import_json(json).is_err() {
            return false;
        }
        with_engine((), |e| e.set_macros(store.snapshot()));
        *lock_macro_store() = Some(store);
        true
    })
}

/// Export the current macro store as JSON. Caller frees with
/// [`ime_free_string`]. Returns null if no macros have been imported yet.
#[no_mangle]
pub extern "C" fn ime_macro_export() -> *mut c_char {
    catch_panic(std::ptr::null_mut(), || match lock_macro_store().as_ref() {
        Some(store) => match store.export_json() {
            Ok(json) => string_to_c(json),
            Err(_) => std::ptr::null_mut(),
        },
        None => std::ptr::null_mut(),
    })
}

fn string_to_c(s: String) -> *mut c_char {
    CString::new(s).map(CString::into_raw).unwrap_or(std::ptr::null_mut())
}

unsafe fn c_str_to_str<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn type_word(raw: &str) {
        for c in raw.chars() {
            ime_key(c as u32, false);
        }
    }

    #[test]
    #[serial]
    fn init_then_key_produces_edit_action() {
        ime_init();
        let diff = ime_key('d' as u32, false);
        assert_eq!(diff.action, FfiAction::Edit as u8);
        assert_eq!(diff.count, 1);
        assert_eq!(diff.chars[0], 'd' as u32);
    }

    #[test]
    #[serial]
    fn key_before_init_returns_none_action() {
        ime_shutdown();
        let diff = ime_key('a' as u32, false);
        assert_eq!(diff.action, FfiAction::None as u8);
    }

    #[test]
    #[serial]
    fn full_word_round_trips_through_current_word() {
        ime_init();
        type_word("dijch");
        let ptr = ime_current_word();
        assert!(!ptr.is_null());
        let word = unsafe { CStr::from_ptr(ptr) }.to_str().unwrap().to_string();
        assert_eq!(word, "dịch");
        unsafe { ime_free_string(ptr) };
    }

    #[test]
    #[serial]
    fn undo_typing_restores_raw_ascii() {
        ime_init();
        type_word("hoas");
        let diff = ime_undo_typing();
        assert_eq!(diff.action, FfiAction::Restore as u8);
        let restored: String = diff.chars[..diff.count as usize]
            .iter()
            .map(|&c| char::from_u32(c).unwrap())
            .collect();
        assert_eq!(restored, "hoas");
    }

    #[test]
    #[serial]
    fn macro_import_export_round_trip() {
        ime_init();
        let json = CString::new(r#"[{"trigger":"vn","replacement":"Việt Nam"}]"#).unwrap();
        assert!(unsafe { ime_macro_import(json.as_ptr()) });
        type_word("vn");
        let diff = ime_word_break(' ' as u32);
        assert_eq!(diff.action, FfiAction::Edit as u8);

        let exported = ime_macro_export();
        assert!(!exported.is_null());
        unsafe { ime_free_string(exported) };
    }

    #[test]
    #[serial]
    fn method_switches_to_vni_digit_tones() {
        ime_init();
        ime_method(1); // Vni
        let diff_a = ime_key('t' as u32, false);
        assert_eq!(diff_a.action, FfiAction::Edit as u8);
        let diff_o = ime_key('o' as u32, false);
        assert_eq!(diff_o.action, FfiAction::Edit as u8);
        let diff_tone = ime_key('1' as u32, false);
        assert_eq!(diff_tone.action, FfiAction::Edit as u8);
    }

    #[test]
    #[serial]
    fn reset_clears_buffer() {
        ime_init();
        type_word("ho");
        ime_reset(0b01);
        let ptr = ime_current_word();
        let word = unsafe { CStr::from_ptr(ptr) }.to_str().unwrap().to_string();
        unsafe { ime_free_string(ptr) };
        assert!(word.is_empty());
    }
}
