use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("'{}' is not a binary .frm file", .path.display())]
    NotAFrm { path: PathBuf },

    #[error("out of bounds read of {len} bytes at offset {offset} (buffer size {size})")]
    OutOfBounds {
        offset: usize,
        len: usize,
        size: usize,
    },

    #[error("short buffer: wanted {wanted} bytes but only {remaining} remain")]
    ShortBuffer { wanted: usize, remaining: usize },

    #[error("unknown value {value:#x} for {field}")]
    UnknownEnum { field: &'static str, value: u32 },

    #[error("no character set registered for id {0}")]
    CharsetUnresolved(u16),

    #[error("filter command {command:?} failed: {reason}")]
    FilterCommandFailed { command: String, reason: String },

    #[error("{kind} section arrived before any database was selected")]
    NoDatabase { kind: &'static str },

    #[error("malformed .frm: {0}")]
    InvalidFrm(String),

    #[error("malformed dump: {0}")]
    InvalidDump(String),

    #[error("invalid path filter: {0}")]
    BadRegex(#[from] regex::Error),

    #[error("invalid UTF-8 in {context}")]
    InvalidUtf8 { context: &'static str },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
