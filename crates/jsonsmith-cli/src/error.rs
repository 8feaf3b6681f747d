use std::path::PathBuf;

use thiserror::Error;

use jsonsmith_core::{SchemaError, ValidationReport};
use jsonsmith_generate::GenerationError;

/// Everything that can end a command unsuccessfully.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("{}: {source}", .path.display())]
    Schema {
        path: PathBuf,
        #[source]
        source: SchemaError,
    },
    #[error("invalid schema: {0}")]
    Validation(#[from] ValidationReport),
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error("file {0} is not provided")]
    MissingFile(String),
    #[error("unable to open output {}: {source}", .path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unable to write report {}: {source}", .path.display())]
    Report {
        path: PathBuf,
        #[source]
        source: GenerationError,
    },
    #[error("unable to read config {}: {source}", .path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unable to parse config {}: {source}", .path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("logging error: {0}")]
    Logging(String),
}

pub type CliResult<T> = std::result::Result<T, CliError>;
