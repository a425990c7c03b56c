//! Heap objects as seen through a [Word::classify]d pointer.
//!
//! A [HeapObject] starts with a [Header] in slot 0. Field access comes in two flavours so the
//! header offset is never counted by hand: [HeapObject::get_field] addresses raw slots, where slot
//! 0 is the header, and [HeapObject::constructor_arg] addresses constructor arguments, where
//! argument 0 is slot 1.
//!
//! A [Pair] has no header at all. Its shape is known at the call site.

use std::ops::Range;
use std::ptr::NonNull;

use crate::check::check;
use crate::header::{Header, UID_CLOSURE, UID_CSTRING};
use crate::word::Word;

/// Slots between the header and the captures of a closure.
pub const CLOSURE_EXTRA_FIELDS: usize = 2;

/// How the collector has to treat the slots of an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectLayout {
    /// `nfields` slots after the header, all of them references.
    Constructor { nfields: usize },
    /// Code address and descriptor, then `ncaptures` references.
    Closure { ncaptures: usize },
    /// `nwords` words of bytes, no references.
    CString { nwords: usize },
}

impl ObjectLayout {
    pub fn of(header: Header) -> Self {
        match header.uid() {
            UID_CLOSURE => ObjectLayout::Closure {
                ncaptures: header.nfields(),
            },
            UID_CSTRING => ObjectLayout::CString {
                nwords: header.nfields(),
            },
            _ => ObjectLayout::Constructor {
                nfields: header.nfields(),
            },
        }
    }

    /// Number of slots the object occupies, header included.
    pub fn slot_count(self) -> usize {
        match self {
            ObjectLayout::Constructor { nfields } => 1 + nfields,
            ObjectLayout::Closure { ncaptures } => 1 + CLOSURE_EXTRA_FIELDS + ncaptures,
            ObjectLayout::CString { nwords } => 1 + nwords,
        }
    }

    /// Slots holding words the collector must trace.
    pub fn reference_slots(self) -> Range<usize> {
        match self {
            ObjectLayout::Constructor { nfields } => 1..1 + nfields,
            ObjectLayout::Closure { ncaptures } => {
                let first = 1 + CLOSURE_EXTRA_FIELDS;
                first..first + ncaptures
            }
            ObjectLayout::CString { .. } => 1..1,
        }
    }
}

/// A pointer to a heap object with a header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HeapObject(NonNull<Word>);

impl HeapObject {
    /// # Safety
    /// `ptr` must point to a live object whose header has been written.
    pub unsafe fn from_non_null(ptr: NonNull<Word>) -> Self {
        Self(ptr)
    }

    /// # Safety
    /// `word` must be a [crate::Kind::Pointer] to a live object whose header has been written.
    pub unsafe fn from_word(word: Word) -> Self {
        check!(word.is_ptr(), "{word:?} is not a pointer");
        Self(NonNull::new_unchecked(word.as_ptr()))
    }

    /// The pointer word for this object. It classifies as a pointer, while the word it points to
    /// classifies as a header.
    #[inline(always)]
    pub fn as_word(self) -> Word {
        Word::from_ptr(self.0.as_ptr())
    }

    #[inline(always)]
    pub fn as_ptr(self) -> *mut Word {
        self.0.as_ptr()
    }

    #[inline(always)]
    pub fn header(self) -> Header {
        let word = unsafe { self.0.as_ptr().read() };
        check!(
            Header::from_word(word).is_some(),
            "slot 0 of {:?} is not a header: {word:?}",
            self.0
        );
        Header::from_word_unchecked(word)
    }

    /// Only meaningful while the object is not marked by a collection in progress, see
    /// [crate::header::MARK_MASK].
    #[inline(always)]
    pub fn uid(self) -> u32 {
        self.header().uid()
    }

    #[inline(always)]
    pub fn nfields(self) -> usize {
        self.header().nfields()
    }

    pub fn layout(self) -> ObjectLayout {
        ObjectLayout::of(self.header())
    }

    pub fn slot_count(self) -> usize {
        self.layout().slot_count()
    }

    pub fn reference_slots(self) -> Range<usize> {
        self.layout().reference_slots()
    }

    /// Reads raw slot `n`. Slot 0 is the header. Reading outside of the object is checked in
    /// checked builds and undefined otherwise.
    #[inline(always)]
    pub fn get_field(self, n: usize) -> Word {
        check!(
            n < self.slot_count(),
            "slot {n} out of bounds of {}",
            self.slot_count()
        );
        unsafe { self.0.as_ptr().add(n).read() }
    }

    #[inline(always)]
    pub fn set_field(self, n: usize, value: Word) {
        check!(
            n < self.slot_count(),
            "slot {n} out of bounds of {}",
            self.slot_count()
        );
        unsafe { self.0.as_ptr().add(n).write(value) }
    }

    /// Constructor argument `n`, that is slot `n + 1`.
    #[inline(always)]
    pub fn constructor_arg(self, n: usize) -> Word {
        self.get_field(n + 1)
    }

    #[inline(always)]
    pub fn set_constructor_arg(self, n: usize, value: Word) {
        self.set_field(n + 1, value)
    }

    /// All constructor arguments at once. The slots must have been initialized.
    pub fn constructor_args(&self) -> &[Word] {
        unsafe { std::slice::from_raw_parts(self.0.as_ptr().add(1), self.nfields()) }
    }

    pub fn is_marked(self) -> bool {
        self.header().is_marked()
    }

    pub fn mark(self) {
        let header = self.header().marked();
        unsafe { self.0.as_ptr().write(header.to_word()) }
    }

    pub fn unmark(self) {
        let header = self.header().unmarked();
        unsafe { self.0.as_ptr().write(header.to_word()) }
    }
}

/// A headerless two word cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pair(NonNull<Word>);

impl Pair {
    /// # Safety
    /// `ptr` must point to two live words.
    pub unsafe fn from_non_null(ptr: NonNull<Word>) -> Self {
        Self(ptr)
    }

    /// # Safety
    /// `word` must be a [crate::Kind::Pointer] to a live pair.
    pub unsafe fn from_word(word: Word) -> Self {
        check!(word.is_ptr(), "{word:?} is not a pointer");
        Self(NonNull::new_unchecked(word.as_ptr()))
    }

    #[inline(always)]
    pub fn as_word(self) -> Word {
        Word::from_ptr(self.0.as_ptr())
    }

    #[inline(always)]
    pub fn fst(self) -> Word {
        unsafe { self.0.as_ptr().read() }
    }

    #[inline(always)]
    pub fn snd(self) -> Word {
        unsafe { self.0.as_ptr().add(1).read() }
    }

    #[inline(always)]
    pub fn set_fst(self, value: Word) {
        unsafe { self.0.as_ptr().write(value) }
    }

    #[inline(always)]
    pub fn set_snd(self, value: Word) {
        unsafe { self.0.as_ptr().add(1).write(value) }
    }
}
