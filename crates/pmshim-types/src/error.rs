use thiserror::Error;

/// The error kinds raised anywhere in the resolve → fetch → dispatch
/// pipeline. Every variant except [`PmError::DevEnginesShape`] surfaces to
/// the user and exits non-zero; none are ever silently swallowed.
#[derive(Debug, Error)]
pub enum PmError {
    #[error("expected a semver version")]
    SpecSyntax,

    #[error("expected a semver version")]
    SpecRange,

    #[error("{0}")]
    DevEnginesShape(String),

    #[error("This project is configured to use {expected}")]
    NameMismatch { expected: String },

    #[error("{0}")]
    DevEnginesMismatch(String),

    #[error("Illegal use of URL for known package manager")]
    UrlForKnownTool,

    #[error("Mismatch hashes. Expected {expected}, got {actual}")]
    HashMismatch { expected: String, actual: String },

    #[error("Signature does not match")]
    SignatureFail,

    #[error("No compatible signature found")]
    NoCompatibleSignature,

    #[error("Network access disabled by the environment")]
    NetworkDisabled,

    #[error("cache root is read-only")]
    CacheReadonly,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    UrlParse(#[from] url::ParseError),

    #[error(transparent)]
    Semver(#[from] semver::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, PmError>;
