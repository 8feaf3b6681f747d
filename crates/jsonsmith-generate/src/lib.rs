//! Streaming JSON generation for jsonsmith.
//!
//! This crate evaluates a value node tree against a run context (named
//! corpora sampled line by line, plus key ordering policy) and a caller
//! supplied random source, writing JSON text straight into an output sink.

pub mod context;
pub mod corpus;
pub mod engine;
pub mod errors;
pub mod generators;
pub mod model;
pub mod output;

pub use context::RunContext;
pub use corpus::{CorpusError, CorpusSampler, DEFAULT_CORPUS_CAPACITY, LineSource, SamplerMode};
pub use engine::{GenerationEngine, generate, generate_array, stream_generate};
pub use errors::GenerationError;
pub use model::{GenerateOptions, GenerationReport, Layout};
