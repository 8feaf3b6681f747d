use thiserror::Error;

use jsonsmith_core::{NodePath, PathSegment};

use crate::corpus::CorpusError;

/// Errors emitted while ingesting corpora or generating documents.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Corpus(#[from] CorpusError),
    #[error("unknown file {0:?}")]
    UnknownFile(String),
    #[error("file {0:?} is already registered")]
    DuplicateFile(String),
    #[error("{0} node has no choices")]
    NoChoices(&'static str),
    /// A failure inside a nested value, annotated with where it happened.
    #[error("{path}: {source}")]
    At {
        path: NodePath,
        #[source]
        source: Box<GenerationError>,
    },
    #[error("{}", join_errors(.0))]
    Multiple(Vec<GenerationError>),
}

impl GenerationError {
    /// Prefix the error's location with one more level of nesting.
    pub fn within(self, segment: PathSegment) -> Self {
        match self {
            GenerationError::At { mut path, source } => {
                path.push_front(segment);
                GenerationError::At { path, source }
            }
            other => GenerationError::At {
                path: NodePath::from(segment),
                source: Box::new(other),
            },
        }
    }

    /// Location of the failure, if it happened below the root value.
    pub fn path(&self) -> Option<&NodePath> {
        match self {
            GenerationError::At { path, .. } => Some(path),
            _ => None,
        }
    }

    /// Innermost error with any location annotation stripped.
    pub fn root_cause(&self) -> &GenerationError {
        match self {
            GenerationError::At { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Whether the error is the output sink being closed by the reader.
    pub fn is_broken_pipe(&self) -> bool {
        match self.root_cause() {
            GenerationError::Io(err) => err.kind() == std::io::ErrorKind::BrokenPipe,
            GenerationError::Json(err) => {
                err.io_error_kind() == Some(std::io::ErrorKind::BrokenPipe)
            }
            _ => false,
        }
    }

    /// Collapse collected errors: none, the single one, or an aggregate.
    pub fn collect(mut errors: Vec<GenerationError>) -> Result<(), GenerationError> {
        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(GenerationError::Multiple(errors)),
        }
    }
}

fn join_errors(errors: &[GenerationError]) -> String {
    errors
        .iter()
        .map(|err| err.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
