use thiserror::Error;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the grid core, the store adapters and configuration loading.
///
/// Library code never panics on bad input; every failure surfaces as one of these
/// variants with enough context to act on. A grid-shape mismatch during diffing is
/// deliberately absent: the change detector falls back to the full grid instead.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid user or API parameter (dimensions, registry contents, malformed snapshot).
    #[error("invalid parameter: {0}")]
    InvalidParam(String),

    /// A gas kind name or id that is not present in the registry.
    #[error("unknown gas kind: {0}")]
    UnknownKind(String),

    /// The backing snapshot store could not be read, written or cleared.
    #[error("store unavailable ({context}): {source}")]
    StoreUnavailable {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Snapshot encoding or decoding failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Layered configuration could not be built or deserialized.
    #[error("configuration error: {0}")]
    Config(#[from] ::config::ConfigError),
}

impl Error {
    /// Wrap a backend failure as [`Error::StoreUnavailable`].
    pub fn store<E>(context: impl Into<String>, source: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Error::StoreUnavailable {
            context: context.into(),
            source: source.into(),
        }
    }
}
