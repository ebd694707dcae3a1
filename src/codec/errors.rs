use thiserror::Error;

/// Raised when a value cannot be turned into (or read back from) its
/// persisted text form.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("invalid page entry {entry:?} at position {position}")]
    InvalidPage { position: usize, entry: String },
    #[error("page entry {entry:?} at position {position} is out of range")]
    PageOutOfRange { position: usize, entry: String },
}
