//! Optional diagnostic logging shims
//!
//! Diagnostics are best-effort and never required for correctness, so
//! they compile to nothing when the `log` feature is off (embedded
//! targets typically trace through `defmt::Format` on the value types
//! instead).

#[cfg(feature = "log")]
macro_rules! diag_debug {
    ($($arg:tt)*) => { log::debug!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! diag_debug {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "log")]
macro_rules! diag_info {
    ($($arg:tt)*) => { log::info!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! diag_info {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "log")]
macro_rules! diag_warn {
    ($($arg:tt)*) => { log::warn!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! diag_warn {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "log")]
macro_rules! diag_error {
    ($($arg:tt)*) => { log::error!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! diag_error {
    ($($arg:tt)*) => {};
}

pub(crate) use diag_debug;
pub(crate) use diag_error;
pub(crate) use diag_info;
pub(crate) use diag_warn;
