//! Debug logging infrastructure and macros.
//!
//! This module exports macros for debug logging, which are no-ops that are
//! compiled away unless the crate's `logging` feature is enabled. When it is,
//! everything goes to the `log` facade at `trace` level, so any logger (the
//! `cppfilt` binary installs `env_logger`) can pick it up.
//!
//! The parse logging is formatted as an s-expression for easy navigation in
//! editors that support parentheses-based cursor movement.

#[cfg(feature = "logging")]
use crate::index_str::IndexStr;
#[cfg(feature = "logging")]
use std::cell::RefCell;

macro_rules! log {
    ( $fmt:expr ) => {
        if cfg!(feature = "logging") {
            ::log::trace!($fmt);
        }
    };
    ( $fmt:expr, $($x:tt)* ) => {
        if cfg!(feature = "logging") {
            ::log::trace!($fmt, $($x)*);
        }
    }
}

#[cfg(feature = "logging")]
thread_local! {
    static LOG_DEPTH: RefCell<usize> = RefCell::new(0);
}

/// Logs the opening of a production when constructed and its closing when
/// dropped.
pub struct AutoLogParse;

impl AutoLogParse {
    #[cfg(feature = "logging")]
    pub fn new(production: &'static str, input: IndexStr<'_>) -> AutoLogParse {
        LOG_DEPTH.with(|depth| {
            let indent: String = (0..*depth.borrow() * 4).map(|_| ' ').collect();
            log!(
                "{}({} @{} \"{}\"",
                indent,
                production,
                input.index(),
                String::from_utf8_lossy(input.as_ref())
            );
            *depth.borrow_mut() += 1;
        });
        AutoLogParse
    }

    #[cfg(not(feature = "logging"))]
    #[inline(always)]
    pub fn new<T>(_: &'static str, _: T) -> AutoLogParse {
        AutoLogParse
    }
}

#[cfg(feature = "logging")]
impl Drop for AutoLogParse {
    fn drop(&mut self) {
        LOG_DEPTH.with(|depth| {
            *depth.borrow_mut() -= 1;
            let indent: String = (0..*depth.borrow() * 4).map(|_| ' ').collect();
            log!("{})", indent);
        });
    }
}

/// Automatically log start and end parsing in an s-expression format, when the
/// `logging` feature is enabled.
macro_rules! log_parse {
    ( $production:expr , $input:expr ) => {
        let _log = $crate::logging::AutoLogParse::new($production, $input);
    };
}
