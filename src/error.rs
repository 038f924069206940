//! Custom `Error` and `Result` types for the `cxxfilt` crate.

use thiserror::Error;

/// Errors that can occur while decoding a mangled symbol.
///
/// Every variant that is tied to a position in the input carries the byte
/// offset at which decoding stopped.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq, Hash)]
pub enum Error {
    /// The input does not conform to the mangling grammar at `offset`. This
    /// covers malformed encodings, unresolved back references, truncated
    /// input (in which case `offset` is the input length), and trailing
    /// text after a complete symbol.
    #[error("mangled symbol is not well-formed at offset {offset}")]
    InvalidMangledName {
        /// Byte offset of the first byte that could not be decoded.
        offset: usize,
    },

    /// Productions or expanded back references nested deeper than the
    /// configured bound.
    #[error("encountered too much recursion when demangling symbol")]
    RecursionLimitExceeded,

    /// A recognized vendor or language extension that this decoder does not
    /// implement.
    #[error("unsupported mangling construct at offset {offset}")]
    UnsupportedConstruct {
        /// Byte offset at which the construct starts.
        offset: usize,
    },
}

impl Error {
    /// The byte offset this error refers to, if it refers to one.
    pub fn offset(&self) -> Option<usize> {
        match *self {
            Error::InvalidMangledName { offset } | Error::UnsupportedConstruct { offset } => {
                Some(offset)
            }
            Error::RecursionLimitExceeded => None,
        }
    }
}

/// A demangling result of `T` or a `cxxfilt::error::Error`.
pub type Result<T> = ::std::result::Result<T, Error>;
