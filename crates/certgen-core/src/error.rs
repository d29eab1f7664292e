use thiserror::Error;

/// Result type alias for resolution operations
pub type Result<T> = std::result::Result<T, CertgenError>;

/// Errors that can occur while resolving a cluster description
#[derive(Error, Debug)]
pub enum CertgenError {
    /// The `cluster` block must name exactly one cluster
    #[error("only one cluster is supported per etcd block, found {count}")]
    MultipleClusters {
        /// Number of top-level keys found in the `cluster` block
        count: usize,
    },

    /// A required top-level section is absent
    #[error("missing required section `{0}`")]
    MissingSection(&'static str),

    /// The document does not match the expected shape
    #[error("malformed input: {0}")]
    MalformedInput(String),
}

impl CertgenError {
    /// Returns true if the error is a cluster-count violation
    #[must_use]
    pub const fn is_cluster_count(&self) -> bool {
        matches!(self, Self::MultipleClusters { .. })
    }
}

impl From<serde_yaml::Error> for CertgenError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::MalformedInput(err.to_string())
    }
}
