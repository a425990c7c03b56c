use std::fmt::Display;

use crate::header::{Header, UID_CLOSURE, UID_CSTRING};
use crate::object::ObjectLayout;
use crate::word::{FatWord, Kind, Kind3, Word};

impl Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Kind::Pointer => "pointer",
            Kind::Unboxed => "unboxed",
            Kind::DWordPointer => "dword-pointer",
            Kind::Header => "header",
        };
        f.pad(name)
    }
}

impl Display for Kind3 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:03b}", *self as u8)
    }
}

impl Display for Header {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.uid() {
            UID_CLOSURE => write!(f, "closure captures={}", self.nfields())?,
            UID_CSTRING => write!(f, "cstring words={}", self.nfields())?,
            uid => write!(f, "uid={uid} nfields={}", self.nfields())?,
        }
        if self.is_marked() {
            write!(f, " marked")?;
        }
        Ok(())
    }
}

impl Display for FatWord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FatWord::Pointer(addr) => write!(f, "#<ptr {addr:#x}>"),
            FatWord::Unboxed(n) => write!(f, "{n}"),
            FatWord::DWordPointer(addr) => write!(f, "#<dword {addr:#x}>"),
            FatWord::Header(header) => write!(f, "#<{header}>"),
            FatWord::Corrupt(word) => write!(f, "#<corrupt header {:#x}>", word.raw()),
        }
    }
}

impl Display for Word {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.decode())
    }
}

impl Display for ObjectLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let refs = self.reference_slots();
        write!(f, "{} slots, references in {}..{}", self.slot_count(), refs.start, refs.end)
    }
}
