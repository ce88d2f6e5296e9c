use thiserror::Error;

use crate::lz::LzError;

/// Errors produced while decoding a stage definition buffer.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StageError {
    #[error("read of {width} bytes at offset {offset:#x} runs past end of buffer ({len} bytes)")]
    OutOfBounds {
        offset: usize,
        width: usize,
        len: usize,
    },
    #[error("unrecognized stage marker {0:02x?}")]
    UnrecognizedVariant([u8; 4]),
    #[error("decompression failed: {0}")]
    Lz(#[from] LzError),
}

impl StageError {
    /// Returns true if the input was not a stage this crate knows about, as
    /// opposed to a known stage that failed to decode.
    pub fn is_unrecognized(&self) -> bool {
        matches!(self, StageError::UnrecognizedVariant(_))
    }
}

pub type StageResult<T> = Result<T, StageError>;
