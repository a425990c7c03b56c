//! Tagged word representation and heap object layout for compiled code.
//!
//! [word] classifies machine words, [header] packs object headers, and [constr] allocates
//! constructors on top of an external [allocator::Allocator]. Closures and byte strings are the
//! two shapes with reserved UIDs, see [closure] and [cstring].

pub mod allocator;
pub mod check;
pub mod closure;
pub mod constr;
pub mod cstring;
mod display;
pub mod error;
pub mod ffi;
pub mod header;
pub mod object;
pub mod roots;
pub mod word;

pub use crate::allocator::{Allocator, ArenaAllocator, ArenaConfig};
pub use crate::closure::{allocate_closure, Closure, CodePtr};
pub use crate::constr::{allocate_boxed, allocate_dword, allocate_pair, allocate_unboxed, read_dword};
pub use crate::cstring::{allocate_cstring, cstring_nfields, HeapCString};
pub use crate::error::{Error, Result};
pub use crate::header::{make_header, Header, MAX_FIELDS, MAX_UIDS, UID_CLOSURE, UID_CSTRING};
pub use crate::object::{HeapObject, ObjectLayout, Pair};
pub use crate::roots::{RootIndex, Roots};
pub use crate::word::{
    classify, get_dword_ptr, get_unboxed, get_unboxed_signed, make_dword_ptr, make_unboxed,
    make_unboxed_signed, DWord, FatWord, Kind, Word, WORD_SIZE,
};
