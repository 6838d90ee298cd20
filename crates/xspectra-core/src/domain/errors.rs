use std::path::PathBuf;

pub type XsResult<T> = Result<T, XsError>;

/// Failure taxonomy for deck generation.
///
/// `MissingAsset` and `MissingConfig` are recoverable: the pseudopotential
/// resolver catches them to fall through to the next resolution tier, and the
/// core-hole injector folds them into the generation report. Everything else
/// aborts the call.
#[derive(Debug, thiserror::Error)]
pub enum XsError {
    #[error("missing asset '{name}': {detail}")]
    MissingAsset { name: String, detail: String },

    #[error("missing configuration input '{name}': {detail}")]
    MissingConfig { name: String, detail: String },

    #[error("absorbing element '{element}' has no ionized pseudopotential entry")]
    UnresolvedAbsorber { element: String },

    #[error("invalid generation input: {0}")]
    InputValidation(String),

    #[error("filesystem operation failed at '{}': {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("archive entry '{name}' could not be processed: {detail}")]
    Codec { name: String, detail: String },
}

impl XsError {
    pub fn missing_asset(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::MissingAsset {
            name: name.into(),
            detail: detail.into(),
        }
    }

    pub fn missing_config(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::MissingConfig {
            name: name.into(),
            detail: detail.into(),
        }
    }

    pub fn input_validation(message: impl Into<String>) -> Self {
        Self::InputValidation(message.into())
    }

    pub fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Filesystem {
            path: path.into(),
            source,
        }
    }

    pub fn parse(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Parse {
            path: path.into(),
            source,
        }
    }

    pub fn codec(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Codec {
            name: name.into(),
            detail: detail.into(),
        }
    }

    /// Whether generation may continue with degraded inputs after this error.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::MissingAsset { .. } | Self::MissingConfig { .. })
    }
}
