use std::path::Path;

use serde::{Serialize, Serializer};

use jsonsmith_core::Length;

use crate::errors::GenerationError;

/// How generated root values are laid out in the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Layout {
    /// Exactly one root value.
    Single,
    /// Root values wrapped in one JSON array.
    Array {
        #[serde(serialize_with = "length_as_text")]
        length: Length,
    },
    /// Newline-delimited root values; `None` streams until the sink closes.
    Stream { count: Option<u64> },
}

impl Layout {
    /// Stream layout from a signed count where any negative value means
    /// unbounded.
    pub fn stream(count: i64) -> Self {
        Layout::Stream {
            count: u64::try_from(count).ok(),
        }
    }
}

/// Options for the generation engine.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub layout: Layout,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            layout: Layout::Single,
        }
    }
}

/// Report for a generation run.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationReport {
    pub run_id: String,
    pub layout: Layout,
    /// Root values written in full.
    pub documents: u64,
    pub bytes_written: u64,
    pub duration_ms: u64,
    /// Whether the run ended because the reader closed the output.
    pub closed_by_reader: bool,
}

impl GenerationReport {
    pub fn new(run_id: String, layout: Layout) -> Self {
        Self {
            run_id,
            layout,
            documents: 0,
            bytes_written: 0,
            duration_ms: 0,
            closed_by_reader: false,
        }
    }

    /// Write the report as pretty-printed JSON.
    pub fn write_json(&self, path: &Path) -> Result<(), GenerationError> {
        std::fs::write(path, serde_json::to_vec_pretty(self)?)?;
        Ok(())
    }
}

fn length_as_text<S: Serializer>(length: &Length, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(length)
}
