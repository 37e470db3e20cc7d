//! Logging macros for ergonomic message formatting.
//!
//! Each macro takes the logger, an optional `meta = <LogMeta>` argument, and
//! `format!`-style arguments.
//!
//! # Examples
//!
//! ```
//! use service_logger::prelude::*;
//! use service_logger::info;
//!
//! let logger = Logger::builder()
//!     .config(LoggerConfig::new().with_console(false))
//!     .build()
//!     .unwrap();
//!
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port);
//! info!(logger, meta = LogMeta::new().with_field("port", port), "Server ready");
//! ```

/// Log a formatted message at the given level.
///
/// ```
/// # use service_logger::prelude::*;
/// # let logger = Logger::builder().config(LoggerConfig::new().with_console(false)).build().unwrap();
/// use service_logger::log;
/// log!(logger, LogLevel::Warn, "Retry {} of {}", 1, 3);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, meta = $meta:expr, $($arg:tt)+) => {
        $logger.log($level, format!($($arg)+), $meta)
    };
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.log($level, format!($($arg)+), $crate::LogMeta::new())
    };
}

#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Debug, $($arg)+)
    };
}

#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Info, $($arg)+)
    };
}

#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Warn, $($arg)+)
    };
}

/// Log a formatted message at error level.
///
/// Attach an error through `meta = LogMeta::new().with_error(..)`, or call
/// [`Logger::error`](crate::Logger::error) directly.
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Error, $($arg)+)
    };
}
