//! FILENAME: core/tablix-engine/src/logging.rs
// PURPOSE: Category-tagged logging macros over the `log` facade.
//
// The category becomes the log target, so hosts can filter with
// e.g. `RUST_LOG=REALIZE=debug`. The crate never installs a logger.

#[allow(unused_macros)]
macro_rules! log_debug {
    ($cat:expr, $($arg:tt)*) => {
        ::log::debug!(target: $cat, $($arg)*)
    };
}

#[allow(unused_macros)]
macro_rules! log_info {
    ($cat:expr, $($arg:tt)*) => {
        ::log::info!(target: $cat, $($arg)*)
    };
}

#[allow(unused_macros)]
macro_rules! log_warn {
    ($cat:expr, $($arg:tt)*) => {
        ::log::warn!(target: $cat, $($arg)*)
    };
}

#[allow(unused_macros)]
macro_rules! log_error {
    ($cat:expr, $($arg:tt)*) => {
        ::log::error!(target: $cat, $($arg)*)
    };
}
