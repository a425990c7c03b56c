//! Byte strings stored under the reserved [UID_CSTRING]. The payload is the raw bytes followed by
//! a nul terminator and zero padding up to a whole word. The collector never looks inside.

use std::ffi::CStr;

use crate::allocator::Allocator;
use crate::check::check;
use crate::constr::write_header;
use crate::error::{Error, Result};
use crate::header::{Header, UID_CSTRING};
use crate::object::HeapObject;
use crate::roots::Roots;
use crate::word::{Word, WORD_SIZE};

/// Words needed for `byte_len` bytes on a target with `word_size` byte words.
pub const fn words_for_bytes(byte_len: usize, word_size: usize) -> usize {
    byte_len.div_ceil(word_size)
}

/// `NFIELDS` of a string object whose payload, terminator included, is `byte_len` bytes long.
pub const fn cstring_nfields(byte_len: usize) -> usize {
    words_for_bytes(byte_len, WORD_SIZE)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeapCString(HeapObject);

impl HeapCString {
    /// # Safety
    /// `obj` must be a fully initialized string object.
    pub unsafe fn from_object(obj: HeapObject) -> Self {
        check!(obj.header().is_cstring(), "{obj:?} is not a string");
        Self(obj)
    }

    pub fn as_object(self) -> HeapObject {
        self.0
    }

    pub fn as_word(self) -> Word {
        self.0.as_word()
    }

    /// Bytes available for the payload, terminator and padding included.
    pub fn capacity(&self) -> usize {
        self.0.nfields() * WORD_SIZE
    }

    pub fn as_cstr(&self) -> &CStr {
        unsafe { CStr::from_ptr(self.0.as_ptr().add(1) as *const libc::c_char) }
    }

    /// The bytes without the terminator.
    pub fn as_bytes(&self) -> &[u8] {
        self.as_cstr().to_bytes()
    }
}

/// Allocates a string object holding `bytes`. `bytes` must not point into the heap, since the
/// allocation may collect.
pub fn allocate_cstring<A: Allocator + ?Sized>(
    allocator: &mut A,
    bytes: &[u8],
    roots: &mut Roots,
) -> Result<HeapCString> {
    if let Some(offset) = bytes.iter().position(|&byte| byte == 0) {
        return Err(Error::InteriorNul(offset));
    }

    let nfields = cstring_nfields(bytes.len() + 1);
    let header = Header::try_new(UID_CSTRING, nfields)?;
    let ptr = allocator.alloc_words(nfields + 1, roots)?;

    let obj = unsafe {
        let obj = write_header(ptr, header);
        let payload = obj.as_ptr().add(1) as *mut u8;
        std::ptr::write_bytes(payload, 0, nfields * WORD_SIZE);
        std::ptr::copy_nonoverlapping(bytes.as_ptr(), payload, bytes.len());
        obj
    };

    Ok(HeapCString(obj))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocator::ArenaAllocator;
    use crate::header::MAX_FIELDS;

    #[test]
    fn nfields() {
        assert_eq!(words_for_bytes(b"abc\0".len(), 4), 1);
        assert_eq!(words_for_bytes(5, 4), 2);
        assert_eq!(words_for_bytes(0, 8), 0);
        assert_eq!(cstring_nfields(1), 1);
        assert_eq!(cstring_nfields(WORD_SIZE + 1), 2);
    }

    #[test]
    fn allocate() {
        let mut arena = ArenaAllocator::new();
        let string = allocate_cstring(&mut arena, b"abc", &mut Roots::new()).unwrap();
        let obj = string.as_object();

        assert_eq!(obj.uid(), UID_CSTRING);
        assert_eq!(obj.nfields(), 1);
        assert!(obj.reference_slots().is_empty());
        assert_eq!(string.as_bytes(), b"abc");
        assert_eq!(string.as_cstr().to_str(), Ok("abc"));
        assert_eq!(string.capacity(), WORD_SIZE);
    }

    #[test]
    fn exact_word_multiple() {
        let mut arena = ArenaAllocator::new();
        let bytes = vec![b'x'; WORD_SIZE];
        let string = allocate_cstring(&mut arena, &bytes, &mut Roots::new()).unwrap();

        assert_eq!(string.as_object().nfields(), 2);
        assert_eq!(string.as_bytes(), &bytes[..]);
    }

    #[test]
    fn empty() {
        let mut arena = ArenaAllocator::new();
        let string = allocate_cstring(&mut arena, b"", &mut Roots::new()).unwrap();

        assert_eq!(string.as_object().nfields(), 1);
        assert!(string.as_bytes().is_empty());
    }

    #[test]
    fn rejects_interior_nul() {
        let mut arena = ArenaAllocator::new();
        assert_eq!(
            allocate_cstring(&mut arena, b"ab\0c", &mut Roots::new()),
            Err(Error::InteriorNul(2))
        );
        assert_eq!(arena.allocated_words(), 0);
    }

    #[test]
    fn too_long() {
        let mut arena = ArenaAllocator::new();
        let bytes = vec![b'x'; MAX_FIELDS * WORD_SIZE];

        assert_eq!(
            allocate_cstring(&mut arena, &bytes, &mut Roots::new()),
            Err(Error::TooManyFields(MAX_FIELDS + 1))
        );
    }
}
