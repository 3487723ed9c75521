//! Logging macros for library code.
//!
//! On the embedded target these forward to `defmt` (RTT transport is set up by
//! the binary). On the host they only type-check their arguments, so unit tests
//! and the simulator stay quiet.
//!
//! Format strings must stick to plain `{}` placeholders so both expansions accept
//! them.

#[cfg(target_arch = "arm")]
macro_rules! log_info {
    ($($arg:tt)*) => {
        defmt::info!($($arg)*)
    };
}

#[cfg(target_arch = "arm")]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        defmt::warn!($($arg)*)
    };
}

#[cfg(target_arch = "arm")]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        defmt::debug!($($arg)*)
    };
}

#[cfg(not(target_arch = "arm"))]
macro_rules! log_info {
    ($($arg:tt)*) => {{
        let _ = core::format_args!($($arg)*);
    }};
}

#[cfg(not(target_arch = "arm"))]
macro_rules! log_warn {
    ($($arg:tt)*) => {{
        let _ = core::format_args!($($arg)*);
    }};
}

#[cfg(not(target_arch = "arm"))]
macro_rules! log_debug {
    ($($arg:tt)*) => {{
        let _ = core::format_args!($($arg)*);
    }};
}
