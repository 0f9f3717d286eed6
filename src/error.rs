use std::fmt;
use std::path::PathBuf;

/// Error type returned by save and delete hooks.
pub type HookError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Which of the two injected hooks an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookKind {
    Save,
    Delete,
}

impl fmt::Display for HookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookKind::Save => write!(f, "save"),
            HookKind::Delete => write!(f, "delete"),
        }
    }
}

/// Errors that can occur when offering a checkpoint to a retainer.
#[derive(Debug, thiserror::Error)]
pub enum RetentionError {
    #[error("no {0} hook configured")]
    MissingHook(HookKind),

    #[error("score offered for {id} is NaN")]
    NanScore { id: String },

    #[error("checkpoint {0} is already retained")]
    DuplicateIdentifier(String),

    #[error("save hook failed for {id}: {source}")]
    Save {
        id: String,
        #[source]
        source: HookError,
    },

    #[error("delete hook failed for {id}: {source}")]
    Delete {
        id: String,
        #[source]
        source: HookError,
    },
}

impl RetentionError {
    /// Recover the error returned by a failing hook, untouched.
    pub fn into_hook_error(self) -> Option<HookError> {
        match self {
            RetentionError::Save { source, .. } | RetentionError::Delete { source, .. } => {
                Some(source)
            }
            _ => None,
        }
    }

    /// The hook that failed, if this error came from one.
    pub fn failed_hook(&self) -> Option<HookKind> {
        match self {
            RetentionError::Save { .. } => Some(HookKind::Save),
            RetentionError::Delete { .. } => Some(HookKind::Delete),
            _ => None,
        }
    }
}

/// Errors that can occur when reading or writing a retention manifest.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("failed to read manifest from {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write manifest to {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse manifest from {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("invalid max size {0} (expected >= 0, or -1 for unbounded)")]
    InvalidMaxSize(i64),

    #[error("max size {0} does not fit in a 64-bit signed integer")]
    MaxSizeOverflow(usize),

    #[error("config validation error: {0}")]
    Validation(String),
}
