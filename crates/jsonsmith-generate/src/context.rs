use std::borrow::Cow;
use std::collections::HashMap;
use std::path::Path;

use rand::Rng;
use tracing::{debug, warn};

use crate::corpus::{CorpusSampler, DEFAULT_CORPUS_CAPACITY, LineSource};
use crate::errors::GenerationError;

/// Per-run state shared by every generation call: named corpora and the
/// key ordering policy.
pub struct RunContext {
    sort_keys: bool,
    capacity: u64,
    samplers: HashMap<String, CorpusSampler>,
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new()
    }
}

impl RunContext {
    /// Empty context with key sorting enabled.
    pub fn new() -> Self {
        Self {
            sort_keys: true,
            capacity: DEFAULT_CORPUS_CAPACITY,
            samplers: HashMap::new(),
        }
    }

    /// Buffer capacity handed to samplers created by [`RunContext::set_file`].
    pub fn with_corpus_capacity(mut self, capacity: u64) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn set_key_sorting(&mut self, sort_keys: bool) {
        self.sort_keys = sort_keys;
    }

    pub fn key_sorting(&self) -> bool {
        self.sort_keys
    }

    /// Ingest the file at `path` under `name`. `-` reads stdin.
    pub fn set_file(&mut self, name: &str, path: &Path) -> Result<(), GenerationError> {
        let source = LineSource::open(path)?;
        self.set_source(name, source)
    }

    /// Ingest an already opened source under `name`.
    pub fn set_source(&mut self, name: &str, source: LineSource) -> Result<(), GenerationError> {
        if self.samplers.contains_key(name) {
            return Err(GenerationError::DuplicateFile(name.to_string()));
        }
        let mut sampler = CorpusSampler::with_capacity(name, self.capacity);
        sampler.ingest(source)?;
        self.samplers.insert(name.to_string(), sampler);
        Ok(())
    }

    pub fn sampler(&self, name: &str) -> Option<&CorpusSampler> {
        self.samplers.get(name)
    }

    /// Draw one line from the corpus registered as `name`.
    pub fn sample_from<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        name: &str,
    ) -> Result<Cow<'_, [u8]>, GenerationError> {
        let sampler = self
            .samplers
            .get(name)
            .ok_or_else(|| GenerationError::UnknownFile(name.to_string()))?;
        Ok(sampler.sample(rng)?)
    }

    /// Dispose every sampler, reporting all cleanup failures together.
    pub fn dispose(&mut self) -> Result<(), GenerationError> {
        let mut errors = Vec::new();
        for (name, sampler) in self.samplers.iter_mut() {
            debug!(corpus = %name, "disposing corpus");
            if let Err(err) = sampler.dispose() {
                errors.push(GenerationError::from(err));
            }
        }
        GenerationError::collect(errors)
    }
}

impl Drop for RunContext {
    fn drop(&mut self) {
        if let Err(err) = self.dispose() {
            warn!(error = %err, "failed to dispose run context");
        }
    }
}
