use thiserror::Error;

use crate::path::NodePath;

/// Errors raised while decoding a schema document into a node tree.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The document is not valid YAML/JSON; carries line and column.
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// The schema file could not be read.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// A node definition is malformed or violates its constraints.
    #[error("{path}: {message}")]
    InvalidNode { path: NodePath, message: String },
}

impl SchemaError {
    pub fn invalid(path: &NodePath, message: impl Into<String>) -> Self {
        SchemaError::InvalidNode {
            path: path.clone(),
            message: message.into(),
        }
    }
}

/// Convenience alias for results returned by schema construction.
pub type Result<T> = std::result::Result<T, SchemaError>;
