//! Storage error types
//!
//! Storage failures are never retried or swallowed; they propagate to the
//! caller of the operation that triggered them.

/// Persistence failure
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Backing store cannot be reached
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// Write would exceed the store quota
    #[error("quota exceeded writing {key}: needs {needed} bytes, limit {limit}")]
    QuotaExceeded {
        /// Record key
        key: String,
        /// Bytes the store would hold after the write
        needed: usize,
        /// Configured limit
        limit: usize,
    },

    /// Record exists but does not decode
    #[error("corrupt record {key}: {source}")]
    Corrupt {
        /// Record key
        key: String,
        /// Decode failure
        #[source]
        source: serde_json::Error,
    },

    /// Record could not be encoded
    #[error("cannot encode record {key}: {source}")]
    Encode {
        /// Record key
        key: String,
        /// Encode failure
        #[source]
        source: serde_json::Error,
    },

    /// Filesystem failure
    #[error("io error on {key}: {source}")]
    Io {
        /// Record key
        key: String,
        /// Underlying failure
        #[source]
        source: std::io::Error,
    },
}

impl StorageError {
    /// Wrap an io error for a record
    #[inline]
    pub fn io(key: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            key: key.into(),
            source,
        }
    }

    /// Whether the failure is about capacity rather than availability
    #[inline]
    #[must_use]
    pub fn is_quota(&self) -> bool {
        matches!(self, Self::QuotaExceeded { .. })
    }
}
