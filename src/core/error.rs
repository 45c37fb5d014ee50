//! Error types for grid construction and placement configuration

use thiserror::Error;

/// Main error type for the crate
#[derive(Debug, Error)]
pub enum Error {
    #[error("vertex buffer length {len} is not a multiple of stride {stride}")]
    StrideMismatch { len: usize, stride: usize },

    #[error("invalid vertex layout: {0}")]
    InvalidLayout(String),

    #[error("index count {0} is not a multiple of 3")]
    IndexCount(usize),

    #[error("index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("asset '{0}' is not known to the asset table")]
    UnresolvedAsset(String),

    #[error("unknown species '{0}'")]
    UnknownSpecies(String),

    #[error("species id space exhausted, cannot register '{0}'")]
    TooManySpecies(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Shorthand for configuration errors.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::InvalidConfig(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = Error::StrideMismatch { len: 23, stride: 11 };
        assert_eq!(err.to_string(), "vertex buffer length 23 is not a multiple of stride 11");

        let err = Error::config("resolution must be > 0");
        assert_eq!(err.to_string(), "invalid configuration: resolution must be > 0");
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
