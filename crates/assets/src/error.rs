/// Errors from tile loading and decoding.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    /// No authored asset exists at the requested path.
    #[error("resource not found: {0}")]
    NotFound(String),
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// Buffer is shorter than the declared resolution requires.
    #[error("incomplete data: expected {expected} bytes, got {actual}")]
    IncompleteData { expected: usize, actual: usize },
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),
    #[error("image decode error: {0}")]
    Image(String),
}

impl AssetError {
    /// Whether retrying the same request could succeed.
    ///
    /// Only raw I/O failures qualify; a missing tile or a malformed buffer
    /// stays missing or malformed.
    pub fn is_transient(&self) -> bool {
        matches!(self, AssetError::Io { .. })
    }

    /// Whether the failure means there is no tile at the requested coordinate.
    pub fn is_not_found(&self) -> bool {
        matches!(self, AssetError::NotFound(_))
    }

    pub(crate) fn from_io(path: impl Into<String>, err: std::io::Error) -> Self {
        let path = path.into();
        if err.kind() == std::io::ErrorKind::NotFound {
            AssetError::NotFound(path)
        } else {
            AssetError::Io { path, source: err }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[test]
    fn io_not_found_maps_to_not_found() {
        let err = AssetError::from_io("a/b.raw", Error::new(ErrorKind::NotFound, "gone"));
        assert!(err.is_not_found());
        assert!(!err.is_transient());
    }

    #[test]
    fn other_io_is_transient() {
        let err = AssetError::from_io("a/b.raw", Error::new(ErrorKind::Interrupted, "eintr"));
        assert!(err.is_transient());
        assert!(err.to_string().contains("a/b.raw"));
    }
}
