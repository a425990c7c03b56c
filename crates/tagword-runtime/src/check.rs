//! Checked/unchecked build toggle for representation invariants.
//!
//! Violations of the word and header invariants mean that code generation or
//! memory is already corrupted, so they are never reported as recoverable
//! errors. They panic when checks are enabled, and compile to nothing
//! otherwise. Checks are enabled with `debug_assertions` or with the `checked`
//! feature.

/// Whether invariant checks are compiled into this build.
pub const CHECKED: bool = cfg!(any(debug_assertions, feature = "checked"));

macro_rules! check {
    ($cond:expr, $($arg:tt)+) => {
        if $crate::check::CHECKED {
            assert!($cond, $($arg)+);
        }
    };
}

pub(crate) use check;
