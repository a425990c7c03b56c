//! Entry points for compiled code. [Word] is `repr(transparent)` over `usize` and [Kind] is
//! `repr(u8)`, so both cross the boundary as plain integers.

#![allow(non_snake_case)]

use crate::constr::allocate_unboxed;
use crate::header::{make_header, Header};
use crate::word::{self, DWord, Kind, Word};

#[no_mangle]
pub extern "C" fn prim__word_classify(value: Word) -> Kind {
    value.classify()
}

#[no_mangle]
pub extern "C" fn prim__make_unboxed(n: usize) -> Word {
    word::make_unboxed(n)
}

#[no_mangle]
pub extern "C" fn prim__get_unboxed(value: Word) -> usize {
    word::get_unboxed(value)
}

#[no_mangle]
pub extern "C" fn prim__get_unboxed_signed(value: Word) -> isize {
    word::get_unboxed_signed(value)
}

#[no_mangle]
pub extern "C" fn prim__make_dword_ptr(addr: *const DWord) -> Word {
    word::make_dword_ptr(addr)
}

#[no_mangle]
pub extern "C" fn prim__get_dword_ptr(value: Word) -> *mut DWord {
    word::get_dword_ptr(value)
}

#[no_mangle]
pub extern "C" fn prim__make_header(uid: u32, nfields: usize) -> Word {
    make_header(uid, nfields)
}

#[no_mangle]
pub extern "C" fn prim__alloc_constr_unboxed(uid: u32) -> Word {
    allocate_unboxed(uid)
}

/// UID of the object `ptr` points to.
///
/// # Safety
/// `ptr` must point to a live object header.
#[no_mangle]
pub unsafe extern "C" fn prim__get_uid(ptr: *const Word) -> u32 {
    Header::from_word_unchecked(ptr.read()).uid()
}

/// # Safety
/// `ptr` must point to a live object header.
#[no_mangle]
pub unsafe extern "C" fn prim__get_nfields(ptr: *const Word) -> usize {
    Header::from_word_unchecked(ptr.read()).nfields()
}
