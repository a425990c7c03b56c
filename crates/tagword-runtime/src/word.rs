//! This module defines the tagging scheme of a machine [Word]. Every word that compiled code
//! produces or consumes is one of: a heap pointer, an unboxed scalar, a pointer to an out-of-line
//! double word, or an object header. The kind lives in the low bits:
//!
//! - The 2-bit kind tells pointers from scalars from "header or double word pointer". Bit 0 alone
//!   separates scalars from everything else, which is all constructor dispatch and small integer
//!   arithmetic need.
//! - The 3-bit kind additionally separates headers from double word pointers. It's only needed by
//!   the collector scan and by field access.
//!
//! Heap pointers are word aligned, so on a 32 bit target their bit 2 may be set, which is why
//! there are two pointer patterns. Headers (`0b110`) and double word pointers (`0b010`) have bit 1
//! set and can never be confused with an aligned pointer.
//!
//! Nothing outside this module should look at the bits of a word directly.

use std::fmt::Debug;

use crate::check::check;
use crate::error::{Error, Result};
use crate::header::Header;

/// Size of a machine word in bytes.
pub const WORD_SIZE: usize = std::mem::size_of::<usize>();

/// Size and alignment of a [DWord] block in bytes.
pub const DWORD_SIZE: usize = 2 * WORD_SIZE;

pub const KIND_MASK: usize = 0b11;

pub const KIND_PTR: usize = 0b00;
pub const KIND_UNBOXED0: usize = 0b01;
pub const KIND_UNBOXED1: usize = 0b11;
pub const KIND_HEADER_OR_DWORDPTR: usize = 0b10;

pub const KIND3_MASK: usize = 0b111;

pub const KIND3_PTR0: usize = 0b000;
pub const KIND3_PTR1: usize = 0b100;
pub const KIND3_UNBOXED00: usize = 0b001;
pub const KIND3_UNBOXED10: usize = 0b101;
pub const KIND3_UNBOXED01: usize = 0b011;
pub const KIND3_UNBOXED11: usize = 0b111;
pub const KIND3_HEADER: usize = 0b110;
pub const KIND3_DWORDPTR: usize = 0b010;

/// Largest value that survives [make_unboxed].
pub const UNBOXED_MAX: usize = usize::MAX >> 1;

/// Range of values that survive [make_unboxed_signed].
pub const UNBOXED_SIGNED_MIN: isize = isize::MIN >> 1;
pub const UNBOXED_SIGNED_MAX: isize = isize::MAX >> 1;

/// The interpretation of a word, as seen from outside of the tagging scheme.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Kind {
    Pointer = 0,
    Unboxed = 1,
    DWordPointer = 2,
    Header = 3,
}

/// The 2-bit classification.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind2 {
    Pointer = 0,
    Unboxed = 1,
    HeaderOrDWordPointer = 2,
}

/// The 3-bit classification. Discriminants are the tag patterns themselves.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind3 {
    Pointer0 = KIND3_PTR0 as u8,
    Unboxed00 = KIND3_UNBOXED00 as u8,
    DWordPointer = KIND3_DWORDPTR as u8,
    Unboxed01 = KIND3_UNBOXED01 as u8,
    Pointer1 = KIND3_PTR1 as u8,
    Unboxed10 = KIND3_UNBOXED10 as u8,
    Header = KIND3_HEADER as u8,
    Unboxed11 = KIND3_UNBOXED11 as u8,
}

impl Kind3 {
    /// Collapses the fine classification into the one used at API boundaries.
    pub fn kind(self) -> Kind {
        match self {
            Kind3::Pointer0 | Kind3::Pointer1 => Kind::Pointer,
            Kind3::Header => Kind::Header,
            Kind3::DWordPointer => Kind::DWordPointer,
            _ => Kind::Unboxed,
        }
    }
}

/// A machine word. Can hold any of the [Kind]s, it's up to [Word::classify] to tell which.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Word(usize);

impl Word {
    #[inline(always)]
    pub const fn from_raw(raw: usize) -> Self {
        Self(raw)
    }

    #[inline(always)]
    pub const fn raw(self) -> usize {
        self.0
    }

    /// Classifies the word without dereferencing it, so it's fine to call on garbage.
    #[inline]
    pub fn classify(self) -> Kind {
        if self.0 & 1 != 0 {
            Kind::Unboxed
        } else if self.0 & KIND_HEADER_OR_DWORDPTR == 0 {
            Kind::Pointer
        } else if self.0 & KIND3_MASK == KIND3_HEADER {
            Kind::Header
        } else {
            Kind::DWordPointer
        }
    }

    #[inline]
    pub fn kind2(self) -> Kind2 {
        match self.0 & KIND_MASK {
            KIND_PTR => Kind2::Pointer,
            KIND_HEADER_OR_DWORDPTR => Kind2::HeaderOrDWordPointer,
            _ => Kind2::Unboxed,
        }
    }

    #[inline]
    pub fn kind3(self) -> Kind3 {
        match self.0 & KIND3_MASK {
            KIND3_PTR0 => Kind3::Pointer0,
            KIND3_UNBOXED00 => Kind3::Unboxed00,
            KIND3_DWORDPTR => Kind3::DWordPointer,
            KIND3_UNBOXED01 => Kind3::Unboxed01,
            KIND3_PTR1 => Kind3::Pointer1,
            KIND3_UNBOXED10 => Kind3::Unboxed10,
            KIND3_HEADER => Kind3::Header,
            _ => Kind3::Unboxed11,
        }
    }

    #[inline(always)]
    pub fn is_unboxed(self) -> bool {
        self.0 & 1 != 0
    }

    #[inline(always)]
    pub fn is_ptr(self) -> bool {
        self.0 & KIND_MASK == KIND_PTR
    }

    #[inline(always)]
    pub fn is_header(self) -> bool {
        self.0 & KIND3_MASK == KIND3_HEADER
    }

    #[inline(always)]
    pub fn is_dword_ptr(self) -> bool {
        self.0 & KIND3_MASK == KIND3_DWORDPTR
    }

    /// Tags a heap pointer. Pointers carry no tag bits, they only need to be word aligned.
    #[inline]
    pub fn from_ptr(ptr: *const Word) -> Self {
        let addr = ptr as usize;
        check!(
            addr % WORD_SIZE == 0,
            "heap pointer {addr:#x} is not word aligned"
        );
        Self(addr)
    }

    /// The heap address of a [Kind::Pointer] word.
    #[inline(always)]
    pub fn as_ptr(self) -> *mut Word {
        self.0 as *mut Word
    }

    /// Decodes the word into a "fat" representation that is easier to work with on the rust side.
    /// Like [Word::classify], this never touches memory.
    pub fn decode(self) -> FatWord {
        match self.classify() {
            Kind::Pointer => FatWord::Pointer(self.0),
            Kind::Unboxed => FatWord::Unboxed(get_unboxed(self)),
            Kind::DWordPointer => FatWord::DWordPointer(get_dword_ptr(self) as usize),
            Kind::Header => match Header::from_word(self) {
                Some(header) => FatWord::Header(header),
                None => FatWord::Corrupt(self),
            },
        }
    }
}

impl Debug for Word {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Word({:#x})", self.0)
    }
}

/// "Fat" decoded word.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FatWord {
    Pointer(usize),
    Unboxed(usize),
    DWordPointer(usize),
    Header(Header),
    /// Header tagged, but with bits set outside of the header layout.
    Corrupt(Word),
}

#[inline(always)]
pub fn classify(word: Word) -> Kind {
    word.classify()
}

/// Embeds `n` in a word. The most significant bit of `n` is lost.
#[inline(always)]
pub fn make_unboxed(n: usize) -> Word {
    Word((n << 1) | 1)
}

#[inline(always)]
pub fn make_unboxed_signed(n: isize) -> Word {
    Word(((n as usize) << 1) | 1)
}

#[inline(always)]
pub fn get_unboxed(word: Word) -> usize {
    word.0 >> 1
}

/// Like [get_unboxed], but sign extends the payload.
#[inline(always)]
pub fn get_unboxed_signed(word: Word) -> isize {
    (word.0 as isize) >> 1
}

/// A value too wide to embed in a word, stored out of line in a block aligned to twice the word
/// size so the double word pointer tag fits in its address.
#[repr(C)]
#[cfg_attr(target_pointer_width = "64", repr(align(16)))]
#[cfg_attr(target_pointer_width = "32", repr(align(8)))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DWord {
    pub lo: usize,
    pub hi: usize,
}

const _: () = assert!(std::mem::align_of::<DWord>() == DWORD_SIZE);
const _: () = assert!(std::mem::size_of::<DWord>() == DWORD_SIZE);

/// An integer as wide as a [DWord].
#[cfg(target_pointer_width = "64")]
pub type DWordValue = u128;

#[cfg(target_pointer_width = "32")]
pub type DWordValue = u64;

impl DWord {
    pub fn new(value: DWordValue) -> Self {
        Self {
            lo: value as usize,
            hi: (value >> usize::BITS) as usize,
        }
    }

    pub fn value(&self) -> DWordValue {
        ((self.hi as DWordValue) << usize::BITS) | self.lo as DWordValue
    }
}

/// Tags the address of a [DWord] block. The address must be aligned to [DWORD_SIZE].
#[inline]
pub fn make_dword_ptr(addr: *const DWord) -> Word {
    let addr = addr as usize;
    check!(
        addr % DWORD_SIZE == 0,
        "double word pointer {addr:#x} is not aligned to {DWORD_SIZE} bytes"
    );
    Word(addr | KIND3_DWORDPTR)
}

/// Always-checked version of [make_dword_ptr].
pub fn try_make_dword_ptr(addr: *const DWord) -> Result<Word> {
    let raw = addr as usize;
    if raw % DWORD_SIZE != 0 {
        return Err(Error::MisalignedDWord(raw));
    }
    Ok(Word(raw | KIND3_DWORDPTR))
}

/// Strips the tag of a [Kind::DWordPointer] word.
#[inline(always)]
pub fn get_dword_ptr(word: Word) -> *mut DWord {
    (word.0 ^ KIND3_DWORDPTR) as *mut DWord
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind3_table() {
        let expected = [
            (0, Kind3::Pointer0, Kind::Pointer),
            (1, Kind3::Unboxed00, Kind::Unboxed),
            (2, Kind3::DWordPointer, Kind::DWordPointer),
            (3, Kind3::Unboxed01, Kind::Unboxed),
            (4, Kind3::Pointer1, Kind::Pointer),
            (5, Kind3::Unboxed10, Kind::Unboxed),
            (6, Kind3::Header, Kind::Header),
            (7, Kind3::Unboxed11, Kind::Unboxed),
        ];

        for (bits, kind3, kind) in expected {
            let word = Word::from_raw(0x1000 | bits);
            assert_eq!(word.kind3(), kind3);
            assert_eq!(word.kind3() as usize, bits);
            assert_eq!(word.classify(), kind);
            assert_eq!(kind3.kind(), kind);
        }
    }

    #[test]
    fn kind2_agrees_with_kind() {
        for bits in 0..8 {
            let word = Word::from_raw(0xabc0 | bits);
            let kind2 = match word.classify() {
                Kind::Pointer => Kind2::Pointer,
                Kind::Unboxed => Kind2::Unboxed,
                Kind::Header | Kind::DWordPointer => Kind2::HeaderOrDWordPointer,
            };
            assert_eq!(word.kind2(), kind2);
            assert_eq!(word.is_unboxed(), kind2 == Kind2::Unboxed);
            assert_eq!(word.is_ptr(), kind2 == Kind2::Pointer);
        }
    }

    #[test]
    fn unboxed() {
        for n in [0, 1, 42, 0xdead_beef, UNBOXED_MAX] {
            let word = make_unboxed(n);
            assert_eq!(word.classify(), Kind::Unboxed);
            assert_eq!(get_unboxed(word), n);
        }
    }

    #[test]
    fn unboxed_signed() {
        for n in [0, 1, -1, -42, UNBOXED_SIGNED_MIN, UNBOXED_SIGNED_MAX] {
            let word = make_unboxed_signed(n);
            assert!(word.is_unboxed());
            assert_eq!(get_unboxed_signed(word), n);
        }
    }

    #[test]
    fn unboxed_loses_top_bit() {
        let word = make_unboxed(usize::MAX);
        assert_eq!(get_unboxed(word), UNBOXED_MAX);
        assert_eq!(get_unboxed_signed(word), -1);
    }

    #[test]
    fn dword_ptr() {
        let block = DWord::new(7);
        let word = make_dword_ptr(&block);

        assert_eq!(word.classify(), Kind::DWordPointer);
        assert!(word.is_dword_ptr());
        assert_eq!(get_dword_ptr(word) as *const DWord, &block as *const DWord);
        assert_eq!(unsafe { (*get_dword_ptr(word)).value() }, 7);
    }

    #[test]
    fn dword_ptr_misaligned() {
        for offset in 1..DWORD_SIZE {
            let addr = (DWORD_SIZE * 100 + offset) as *const DWord;
            assert_eq!(
                try_make_dword_ptr(addr),
                Err(Error::MisalignedDWord(addr as usize))
            );
        }
    }

    #[cfg(any(debug_assertions, feature = "checked"))]
    #[test]
    #[should_panic(expected = "not aligned")]
    fn dword_ptr_misaligned_is_fatal() {
        make_dword_ptr((DWORD_SIZE + WORD_SIZE) as *const DWord);
    }

    #[test]
    fn dword_value() {
        let value = (DWordValue::MAX >> 3) ^ 0x55;
        assert_eq!(DWord::new(value).value(), value);
    }

    #[test]
    fn decode() {
        assert_eq!(make_unboxed(9).decode(), FatWord::Unboxed(9));
        assert_eq!(Word::from_raw(0x1000).decode(), FatWord::Pointer(0x1000));
        assert_eq!(Word::from_raw(0x1002).decode(), FatWord::DWordPointer(0x1000));
    }

    #[test]
    fn pointer_alignments() {
        for offset in [0, WORD_SIZE, 2 * WORD_SIZE, 3 * WORD_SIZE] {
            let word = Word::from_ptr((0x8000 + offset) as *const Word);
            assert_eq!(word.classify(), Kind::Pointer);
            assert!(!word.is_header());
            assert!(!word.is_dword_ptr());
        }
    }
}
