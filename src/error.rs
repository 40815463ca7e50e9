// file: src/error.rs
// description: Custom error types and result type aliases
// reference: https://docs.rs/thiserror

use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Flash configuration error: {0}")]
    FlashConfig(String),

    #[error("Failed to mount file system: {0}")]
    Mount(String),

    #[error("File does not exist: {path}")]
    NotFound { path: String },

    #[error("File did not open correctly: {path}")]
    OpenFailed { path: String },

    #[error("Failed to read any bytes from file: {path}")]
    EmptyRead { path: String },

    #[error("Failed to write any bytes to file: {path}")]
    WriteFailed { path: String },

    #[error(
        "Internal char buffer too small for {path} ({size} bytes, buffer holds {capacity}), raise char_buffer_size if required"
    )]
    BufferTooSmall {
        path: String,
        size: usize,
        capacity: usize,
    },

    #[error("Not enough space on flash for {path}: {needed} bytes needed, {available} available")]
    NoSpace {
        path: String,
        needed: usize,
        available: usize,
    },

    #[error("Invalid flash path: {0}")]
    InvalidPath(String),

    #[error("Failed to parse JSON for {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },

    #[error("JSON document capacity exceeded for {path}: {needed} bytes, capacity {capacity}")]
    JsonCapacity {
        path: String,
        needed: usize,
        capacity: usize,
    },

    #[error("File contents are not valid UTF-8: {path}")]
    Utf8 { path: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Attach the file path to a path-less codec failure.
    pub(crate) fn at(self, path: &str) -> Self {
        match self {
            StoreError::Json { source, .. } => StoreError::Json {
                path: path.to_string(),
                source,
            },
            StoreError::JsonCapacity {
                needed, capacity, ..
            } => StoreError::JsonCapacity {
                path: path.to_string(),
                needed,
                capacity,
            },
            StoreError::Utf8 { .. } => StoreError::Utf8 {
                path: path.to_string(),
            },
            StoreError::BufferTooSmall { size, capacity, .. } => StoreError::BufferTooSmall {
                path: path.to_string(),
                size,
                capacity,
            },
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_at_fills_path() {
        let err = StoreError::Utf8 {
            path: String::new(),
        }
        .at("/a.txt");
        assert_eq!(err.to_string(), "File contents are not valid UTF-8: /a.txt");
    }

    #[test]
    fn test_at_leaves_other_variants() {
        let err = StoreError::NotFound {
            path: "/x".to_string(),
        }
        .at("/y");
        assert!(matches!(err, StoreError::NotFound { path } if path == "/x"));
    }
}
