//! Errors raised while encoding or decoding binary graph data.

use crate::strtable::Key;
use thiserror::Error;

/// Failure while reading or writing one of the binary formats.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("bad magic: expected {expected:?}, found {found:?}")]
    BadMagic { expected: Vec<u8>, found: Vec<u8> },

    #[error("malformed data: {0}")]
    Malformed(String),

    #[error("string key {0} is not in the string table")]
    UnknownString(Key),
}

impl CodecError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        CodecError::Malformed(msg.into())
    }
}

pub type Result<T, E = CodecError> = std::result::Result<T, E>;
