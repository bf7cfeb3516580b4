//! Caller-contract checks.
//!
//! The host's bus decoder and scheduler are trusted to pre-filter addresses
//! and deliver time in order. Breaking that contract is a host bug, so the
//! check panics in debug builds and compiles to nothing in release builds.

macro_rules! contract {
    ($cond:expr, $($arg:tt)+) => {
        debug_assert!($cond, $($arg)+)
    };
}

pub(crate) use contract;
