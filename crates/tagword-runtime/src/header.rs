//! The header word of a heap object. It occupies the low 32 bits of a word, from most to least
//! significant:
//!
//! ```text
//! |NFIELDS:8|UID:20|MARK:1|KIND3:3|
//! ```
//!
//! - `NFIELDS` is the number of fields following the header.
//! - `UID` identifies the shape of the object. It's assigned by the compiler.
//! - `MARK` is owned by the collector. It's clear outside of a collection.
//! - `KIND3` is always [KIND3_HEADER].
//!
//! On 64 bit targets the high half of a header word is zero.
//!
//! Some UIDs are reserved, see [UID_CLOSURE] and [UID_CSTRING].

use std::fmt::Debug;

use crate::check::check;
use crate::error::{Error, Result};
use crate::word::{Word, KIND3_HEADER, KIND3_MASK};

/// Number of distinct UIDs the header can hold.
pub const MAX_UIDS: u32 = 1 << 20;

/// Largest field count the header can hold.
pub const MAX_FIELDS: usize = 255;

/// A closure has two extra fields right after the header: the code address and the environment
/// descriptor. Neither is counted in `NFIELDS` and neither is a heap reference. The `NFIELDS`
/// captured values that follow them are.
pub const UID_CLOSURE: u32 = 0;

/// The header is followed by a nul terminated byte string. `NFIELDS` is the byte length, including
/// the terminator, rounded up to whole words.
pub const UID_CSTRING: u32 = 1;

/// Bit 3 sits between the tag and the UID and belongs to neither.
pub const MARK_MASK: u32 = 0x0000_0008;

pub const UID_MASK: u32 = 0x00FF_FFF0;
pub const UID_SHIFT: u32 = 4;

pub const NFIELDS_MASK: u32 = 0xFF00_0000;
pub const NFIELDS_SHIFT: u32 = 24;

const TAG: u32 = KIND3_HEADER as u32;

#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Header(u32);

impl Header {
    /// Builds an unmarked header. Out of range arguments are fatal.
    #[inline]
    pub fn new(uid: u32, nfields: usize) -> Self {
        check!(uid < MAX_UIDS, "uid {uid} is out of range");
        check!(nfields <= MAX_FIELDS, "{nfields} fields exceed the limit");
        Self::pack(uid, nfields)
    }

    /// Always-checked version of [Header::new].
    pub fn try_new(uid: u32, nfields: usize) -> Result<Self> {
        if uid >= MAX_UIDS {
            return Err(Error::UidOutOfRange(uid));
        }
        if nfields > MAX_FIELDS {
            return Err(Error::TooManyFields(nfields));
        }
        Ok(Self::pack(uid, nfields))
    }

    #[inline(always)]
    fn pack(uid: u32, nfields: usize) -> Self {
        Self(((nfields as u32) << NFIELDS_SHIFT) | (uid << UID_SHIFT) | TAG)
    }

    /// Reads a header back out of a word, if the word has the header tag and nothing set above
    /// the 32 bit layout.
    pub fn from_word(word: Word) -> Option<Self> {
        if !word.is_header() {
            return None;
        }
        u32::try_from(word.raw()).ok().map(Self)
    }

    /// Reinterprets a word that is known to hold a header.
    #[inline(always)]
    pub(crate) fn from_word_unchecked(word: Word) -> Self {
        Self(word.raw() as u32)
    }

    pub fn try_from_word(word: Word) -> Result<Self> {
        Self::from_word(word).ok_or(Error::NotAHeader(word.raw()))
    }

    #[inline(always)]
    pub fn to_word(self) -> Word {
        Word::from_raw(self.0 as usize)
    }

    #[inline(always)]
    pub fn uid(self) -> u32 {
        (self.0 & UID_MASK) >> UID_SHIFT
    }

    #[inline(always)]
    pub fn nfields(self) -> usize {
        ((self.0 & NFIELDS_MASK) >> NFIELDS_SHIFT) as usize
    }

    #[inline(always)]
    pub fn is_marked(self) -> bool {
        self.0 & MARK_MASK != 0
    }

    #[inline(always)]
    pub fn marked(self) -> Self {
        Self(self.0 | MARK_MASK)
    }

    #[inline(always)]
    pub fn unmarked(self) -> Self {
        Self(self.0 & !MARK_MASK)
    }

    pub fn is_closure(self) -> bool {
        self.uid() == UID_CLOSURE
    }

    pub fn is_cstring(self) -> bool {
        self.uid() == UID_CSTRING
    }
}

impl From<Header> for Word {
    fn from(header: Header) -> Self {
        header.to_word()
    }
}

impl Debug for Header {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Header")
            .field("uid", &self.uid())
            .field("nfields", &self.nfields())
            .field("marked", &self.is_marked())
            .finish()
    }
}

/// Builds a header word. See [Header::new].
#[inline]
pub fn make_header(uid: u32, nfields: usize) -> Word {
    Header::new(uid, nfields).to_word()
}

const _: () = assert!(MARK_MASK & UID_MASK == 0);
const _: () = assert!(MARK_MASK & NFIELDS_MASK == 0);
const _: () = assert!(MARK_MASK & KIND3_MASK as u32 == 0);
const _: () = assert!(UID_MASK >> UID_SHIFT == MAX_UIDS - 1);
const _: () = assert!((NFIELDS_MASK >> NFIELDS_SHIFT) as usize == MAX_FIELDS);
