//! Constructor allocation.
//!
//! Every function here that takes an [Allocator] may trigger a collection. Words that are needed
//! after the call have to be registered in the [Roots] passed along and read back from them.
//!
//! Objects come back with their header written and their fields uninitialized. The caller must
//! fill every field before the object is stored anywhere reachable.

use std::ptr::NonNull;

use crate::allocator::Allocator;
use crate::error::Result;
use crate::header::{make_header, Header};
use crate::object::{HeapObject, Pair};
use crate::roots::Roots;
use crate::word::{get_dword_ptr, make_dword_ptr, DWord, DWordValue, Word};

/// Allocates a constructor with `nfields` fields. The header is validated before the allocator is
/// asked for memory, so nothing is allocated for a bad header.
pub fn allocate_boxed<A: Allocator + ?Sized>(
    allocator: &mut A,
    uid: u32,
    nfields: usize,
    roots: &mut Roots,
) -> Result<HeapObject> {
    let header = Header::try_new(uid, nfields)?;
    let ptr = allocator.alloc_words(nfields + 1, roots)?;
    Ok(unsafe { write_header(ptr, header) })
}

/// A nullary constructor is its own header word. Nothing is allocated, and the value classifies as
/// a header rather than a pointer.
#[inline(always)]
pub fn allocate_unboxed(uid: u32) -> Word {
    make_header(uid, 0)
}

/// Allocates a headerless pair with uninitialized components.
pub fn allocate_pair<A: Allocator + ?Sized>(allocator: &mut A, roots: &mut Roots) -> Result<Pair> {
    let ptr = allocator.alloc_words(2, roots)?;
    Ok(unsafe { Pair::from_non_null(ptr) })
}

/// Stores `value` out of line and returns the double word pointer to it.
pub fn allocate_dword<A: Allocator + ?Sized>(
    allocator: &mut A,
    value: DWordValue,
    roots: &mut Roots,
) -> Result<Word> {
    let ptr = allocator.alloc_dwords(1, roots)?;
    unsafe { ptr.as_ptr().write(DWord::new(value)) };
    Ok(make_dword_ptr(ptr.as_ptr()))
}

/// Reads the value behind a double word pointer.
///
/// # Safety
/// `word` must be a [crate::Kind::DWordPointer] to a live block.
pub unsafe fn read_dword(word: Word) -> DWordValue {
    (*get_dword_ptr(word)).value()
}

/// # Safety
/// `ptr` must point to at least `header.nfields() + 1` words, more for closures.
pub(crate) unsafe fn write_header(ptr: NonNull<Word>, header: Header) -> HeapObject {
    ptr.as_ptr().write(header.to_word());
    HeapObject::from_non_null(ptr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocator::ArenaAllocator;
    use crate::error::Error;
    use crate::word::{make_unboxed, Kind};

    #[test]
    fn boxed() {
        let mut arena = ArenaAllocator::new();
        let mut roots = Roots::new();

        let obj = allocate_boxed(&mut arena, 5, 2, &mut roots).unwrap();
        obj.set_field(1, make_unboxed(10));
        obj.set_field(2, make_unboxed(20));

        assert_eq!(obj.uid(), 5);
        assert_eq!(obj.nfields(), 2);
        assert_eq!(obj.constructor_arg(0), make_unboxed(10));
        assert_eq!(obj.constructor_arg(1), make_unboxed(20));
        assert_eq!(arena.allocated_words(), 3);
    }

    #[test]
    fn boxed_without_fields() {
        let mut arena = ArenaAllocator::new();
        let obj = allocate_boxed(&mut arena, 8, 0, &mut Roots::new()).unwrap();

        assert_eq!(obj.nfields(), 0);
        assert_eq!(obj.as_word().classify(), Kind::Pointer);
        assert_eq!(arena.allocated_words(), 1);
    }

    #[test]
    fn boxed_rejects_bad_headers() {
        let mut arena = ArenaAllocator::new();
        let mut roots = Roots::new();

        assert_eq!(
            allocate_boxed(&mut arena, 5, 256, &mut roots),
            Err(Error::TooManyFields(256))
        );
        assert_eq!(
            allocate_boxed(&mut arena, 1 << 20, 1, &mut roots),
            Err(Error::UidOutOfRange(1 << 20))
        );
        assert_eq!(arena.allocated_words(), 0);
    }

    #[test]
    fn unboxed_is_a_header() {
        let word = allocate_unboxed(3);

        assert_eq!(word.classify(), Kind::Header);
        assert_eq!(word, make_header(3, 0));
    }

    #[test]
    fn pair() {
        let mut arena = ArenaAllocator::new();
        let pair = allocate_pair(&mut arena, &mut Roots::new()).unwrap();

        pair.set_fst(make_unboxed(1));
        pair.set_snd(allocate_unboxed(4));

        assert_eq!(pair.fst(), make_unboxed(1));
        assert_eq!(pair.snd(), allocate_unboxed(4));
        assert_eq!(arena.allocated_words(), 2);
    }

    #[test]
    fn dword() {
        let mut arena = ArenaAllocator::new();
        let mut roots = Roots::new();
        let value = DWordValue::MAX - 41;

        allocate_pair(&mut arena, &mut roots).unwrap();
        let word = allocate_dword(&mut arena, value, &mut roots).unwrap();

        assert_eq!(word.classify(), Kind::DWordPointer);
        assert_eq!(unsafe { read_dword(word) }, value);
    }
}
