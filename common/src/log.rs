//! Thin forwarding macros over `tracing`.
//!
//! `success!` logs at INFO under its own target so the terminal formatter can
//! render it differently from ordinary progress messages.

pub const SUCCESS_TARGET: &str = "netscout::success";

#[macro_export]
macro_rules! success {
    ($($arg:tt)+) => {
        $crate::__tracing::info!(target: $crate::log::SUCCESS_TARGET, $($arg)+)
    };
}

#[macro_export]
macro_rules! info {
    ($($arg:tt)+) => {
        $crate::__tracing::info!($($arg)+)
    };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)+) => {
        $crate::__tracing::warn!($($arg)+)
    };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)+) => {
        $crate::__tracing::error!($($arg)+)
    };
}
