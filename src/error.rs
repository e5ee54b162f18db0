//! Error type shared by every stage of the build and query pipeline.

/// Errors that can arise while building, serializing, or querying a TRIE.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Malformed or ill-ordered input: empty key, embedded null byte,
    /// mismatched key/value counts, a duplicate key, or keys fed to the
    /// DAWG builder out of ascending order.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// A traversal or array access went past the end of `units`, `labels`,
    /// or a bit vector. Indicates a corrupt array or a builder bug.
    #[error("index out of bounds")]
    IndexOutOfBounds,
    /// An offset grew to `1<<29` or beyond, which the unit encoding cannot
    /// represent.
    #[error("offset overflow")]
    OffsetOverflow,
    /// Underlying file read, write, or mmap failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// The serialized length header was unreadable or inconsistent with
    /// the actual file size.
    #[error("broken header")]
    BrokenHeader,
}

pub type Result<T> = std::result::Result<T, Error>;
