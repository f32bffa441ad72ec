use std::path::PathBuf;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the library
#[derive(Debug)]
pub enum Error {
    /// A discovered source file could not be read. Aborts the whole run.
    ReadFailure { path: PathBuf, source: std::io::Error },
    IoError(std::io::Error),
    InvalidConfig(String),
    SerializationError(String),
    RenderError(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::ReadFailure { path, source } => {
                write!(f, "failed to read source file {}: {}", path.display(), source)
            }
            Error::IoError(e) => write!(f, "IO error: {}", e),
            Error::InvalidConfig(msg) => write!(f, "invalid configuration: {}", msg),
            Error::SerializationError(msg) => write!(f, "serialization error: {}", msg),
            Error::RenderError(msg) => write!(f, "render error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::ReadFailure { source, .. } => Some(source),
            Error::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IoError(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::SerializationError(format!("JSON serialization error: {}", err))
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::InvalidConfig(format!("YAML configuration error: {}", err))
    }
}

impl From<std::fmt::Error> for Error {
    fn from(err: std::fmt::Error) -> Self {
        Error::RenderError(err.to_string())
    }
}
