use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    IOError(#[from] std::io::Error),

    #[error("Not implemented")]
    NotImplemented,

    #[error("File ID delta over- or under-flows")]
    FileIdDeltaOverflow,

    #[error("File has incorrect magic - possibly wrong file format")]
    BadMagic,

    #[error("Failed precondition")]
    FailedPrecondition,

    #[error("Config parser syntax error")]
    ConfigSyntax,

    #[error("Config parser parameter type mismatch")]
    ConfigTypeMismatch,

    #[error("Block index {0} is out of range, must be less than {1}")]
    BlockIndexOutOfRange(u64, u64),

    #[error("Data checksum mismatch")]
    ChecksumMismatch,

    #[error("integrity check failed for {what}: expected {expected}, got {actual}")]
    IntegrityError {
        expected: String,
        actual: String,
        what: String,
    },

    #[error("Unsupported BLTE encoding type: {0}")]
    UnsupportedBlteEncoding(u8),

    #[error("Archive index TOC is too large to address")]
    ArchiveIndexTocTooLarge,

    #[error("BLTE error: {0}")]
    Blte(#[from] blte::Error),

    #[error("{kind} not found: {key}")]
    NotFound { kind: &'static str, key: String },

    #[error("missing decryption key: {0}")]
    MissingKey(String),

    #[error("object store error: {0}")]
    Store(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("encoding key has unexpected length")]
    BadEncodingKeyLength,
}
