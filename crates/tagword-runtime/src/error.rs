/// Definitions of errors that can be reported by the representation layer.
///
/// Most invariant violations are fatal and go through [crate::check]. These are the ones that a
/// caller can observe: allocator failures, and the fallible twins of the checked constructors that
/// tooling uses on untrusted words.
use thiserror::Error;

use crate::header::{MAX_FIELDS, MAX_UIDS};
use crate::word::DWORD_SIZE;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("uid {0} is out of range, expected less than {max}", max = MAX_UIDS)]
    UidOutOfRange(u32),

    #[error("{0} fields exceed the limit of {max}", max = MAX_FIELDS)]
    TooManyFields(usize),

    #[error("address {0:#x} is not aligned to {align} bytes", align = DWORD_SIZE)]
    MisalignedDWord(usize),

    #[error("out of memory, requested {0} words")]
    OutOfMemory(usize),

    #[error("word {0:#x} is not a header")]
    NotAHeader(usize),

    #[error("string has an interior nul byte at offset {0}")]
    InteriorNul(usize),
}

pub type Result<T> = std::result::Result<T, Error>;
