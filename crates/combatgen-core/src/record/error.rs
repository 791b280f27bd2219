use thiserror::Error;

use crate::record::frame::FrameError;

#[derive(Debug, Error)]
/// Error type for reading and writing simulation record files.
pub enum RecordError {
    #[error("failed to access record file: {0}")]
    Io(#[from] std::io::Error),

    #[error("framing error: {0}")]
    Frame(#[from] FrameError),

    #[error("bad magic bytes {found:?}, expected {expected:?}")]
    BadMagic { found: [u8; 4], expected: [u8; 4] },

    #[error("unsupported record format version {0}")]
    BadVersion(u32),

    #[error("unknown outcome byte {value} in battle {index}")]
    BadOutcome { index: usize, value: u8 },

    #[error("record payload truncated at offset {offset}")]
    Truncated { offset: usize },

    #[error("{count} trailing bytes after the last battle")]
    TrailingBytes { count: usize },

    #[error("string field is not valid UTF-8")]
    BadUtf8(#[from] std::string::FromUtf8Error),

    #[error("{what} length {len} does not fit the record format")]
    TooLong { what: &'static str, len: usize },
}
