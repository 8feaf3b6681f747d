//! Uniform random line sampling over line-delimited corpora.
//!
//! A sampler scans its source once. Lines are kept in memory until the
//! buffer capacity would be exceeded; at that point the sampler spills to a
//! byte-offset index, either over the original file (when it can be read at
//! arbitrary offsets) or over a temporary copy (pipes and other streams).
//! The spill happens at most once and is never undone.

use std::borrow::Cow;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Seek, Write};
use std::path::{Path, PathBuf};

use rand::Rng;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info};

/// Bytes of line data a sampler keeps in memory before spilling.
pub const DEFAULT_CORPUS_CAPACITY: u64 = 1 << 24;

/// Errors raised while ingesting, sampling or disposing a corpus.
#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("unable to open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("unable to read corpus {name:?}: {source}")]
    Read {
        name: String,
        #[source]
        source: io::Error,
    },
    #[error("unable to create temporary file for corpus {name:?}: {source}")]
    Spool {
        name: String,
        #[source]
        source: io::Error,
    },
    #[error("unable to remove temporary copy of corpus {name:?}: {source}")]
    Cleanup {
        name: String,
        #[source]
        source: io::Error,
    },
    #[error("corpus {name:?} was already ingested")]
    AlreadyIngested { name: String },
    #[error("corpus {name:?} is {mode}, not ready for sampling")]
    Unavailable { name: String, mode: SamplerMode },
}

/// A line-delimited input handed to [`CorpusSampler::ingest`].
pub enum LineSource {
    /// Regular file: lines can be re-read later at known offsets.
    Seekable(File),
    /// Forward-only input such as a pipe.
    Stream(Box<dyn Read>),
}

impl LineSource {
    /// Open `path`, classifying it by what it supports. `-` reads stdin.
    pub fn open(path: &Path) -> Result<Self, CorpusError> {
        if path == Path::new("-") {
            return Ok(LineSource::stream(io::stdin()));
        }
        let open_err = |source| CorpusError::Open {
            path: path.to_path_buf(),
            source,
        };
        let file = File::open(path).map_err(open_err)?;
        let metadata = file.metadata().map_err(open_err)?;
        if metadata.is_file() {
            Ok(LineSource::Seekable(file))
        } else {
            Ok(LineSource::Stream(Box::new(file)))
        }
    }

    pub fn stream(reader: impl Read + 'static) -> Self {
        LineSource::Stream(Box::new(reader))
    }
}

/// Observable state of a sampler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplerMode {
    Unopened,
    Buffering,
    SpilledSeekable,
    SpilledCopied,
    Disposed,
}

impl std::fmt::Display for SamplerMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            SamplerMode::Unopened => "unopened",
            SamplerMode::Buffering => "buffering",
            SamplerMode::SpilledSeekable => "spilled (seekable)",
            SamplerMode::SpilledCopied => "spilled (copied)",
            SamplerMode::Disposed => "disposed",
        };
        f.write_str(label)
    }
}

/// Uniform random line retrieval from one named source.
pub struct CorpusSampler {
    name: String,
    capacity: u64,
    state: SamplerState,
}

enum SamplerState {
    Unopened,
    Buffering(LineBuffer),
    SpilledSeekable(IndexedLines<File>),
    SpilledCopied(IndexedLines<Spool>),
    Disposed,
}

impl CorpusSampler {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_capacity(name, DEFAULT_CORPUS_CAPACITY)
    }

    /// Sampler that spills once more than `capacity` bytes of lines are seen.
    pub fn with_capacity(name: impl Into<String>, capacity: u64) -> Self {
        Self {
            name: name.into(),
            capacity,
            state: SamplerState::Unopened,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mode(&self) -> SamplerMode {
        match self.state {
            SamplerState::Unopened => SamplerMode::Unopened,
            SamplerState::Buffering(_) => SamplerMode::Buffering,
            SamplerState::SpilledSeekable(_) => SamplerMode::SpilledSeekable,
            SamplerState::SpilledCopied(_) => SamplerMode::SpilledCopied,
            SamplerState::Disposed => SamplerMode::Disposed,
        }
    }

    /// Number of ingested lines.
    pub fn len(&self) -> usize {
        match &self.state {
            SamplerState::Buffering(buffer) => buffer.lines.len(),
            SamplerState::SpilledSeekable(lines) => lines.index.len(),
            SamplerState::SpilledCopied(lines) => lines.index.len(),
            SamplerState::Unopened | SamplerState::Disposed => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Location of the temporary copy, when the sampler spilled a stream.
    pub fn spool_path(&self) -> Option<&Path> {
        match &self.state {
            SamplerState::SpilledCopied(lines) => Some(lines.backing.path()),
            _ => None,
        }
    }

    /// Scan `source` once, left to right. A sampler can ingest only once.
    pub fn ingest(&mut self, source: LineSource) -> Result<(), CorpusError> {
        if !matches!(self.state, SamplerState::Unopened) {
            return Err(CorpusError::AlreadyIngested {
                name: self.name.clone(),
            });
        }
        self.state = SamplerState::Buffering(LineBuffer::default());

        match source {
            LineSource::Seekable(mut file) => {
                file.rewind().map_err(|source| self.read_error(source))?;
                let reader = file.try_clone().map_err(|source| self.read_error(source))?;
                let mut origin = Some(file);
                self.scan(BufReader::new(reader), &mut origin)?;
            }
            LineSource::Stream(reader) => {
                self.scan(BufReader::new(reader), &mut None)?;
            }
        }

        if let SamplerState::SpilledCopied(lines) = &mut self.state {
            lines
                .backing
                .flush()
                .map_err(|source| CorpusError::Spool {
                    name: self.name.clone(),
                    source,
                })?;
        }

        debug!(
            corpus = %self.name,
            lines = self.len(),
            mode = %self.mode(),
            "corpus ingested"
        );
        Ok(())
    }

    /// Return one ingested line chosen uniformly at random, without its
    /// line delimiter. An empty corpus yields an empty line.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Cow<'_, [u8]>, CorpusError> {
        match &self.state {
            SamplerState::Buffering(buffer) => Ok(Cow::Borrowed(buffer.pick(rng))),
            SamplerState::SpilledSeekable(lines) => lines
                .pick(rng)
                .map(Cow::Owned)
                .map_err(|source| self.read_error(source)),
            SamplerState::SpilledCopied(lines) => lines
                .pick(rng)
                .map(Cow::Owned)
                .map_err(|source| self.read_error(source)),
            SamplerState::Unopened | SamplerState::Disposed => Err(CorpusError::Unavailable {
                name: self.name.clone(),
                mode: self.mode(),
            }),
        }
    }

    /// Release handles and remove the temporary copy, if any. Idempotent.
    pub fn dispose(&mut self) -> Result<(), CorpusError> {
        match std::mem::replace(&mut self.state, SamplerState::Disposed) {
            SamplerState::SpilledCopied(lines) => {
                lines
                    .backing
                    .remove()
                    .map_err(|source| CorpusError::Cleanup {
                        name: self.name.clone(),
                        source,
                    })
            }
            _ => Ok(()),
        }
    }

    fn scan<R: BufRead>(&mut self, mut reader: R, origin: &mut Option<File>) -> Result<(), CorpusError> {
        let mut line = Vec::new();
        loop {
            line.clear();
            let read = reader
                .read_until(b'\n', &mut line)
                .map_err(|source| self.read_error(source))?;
            if read == 0 {
                return Ok(());
            }
            self.push_line(&line, origin)?;
        }
    }

    fn push_line(&mut self, line: &[u8], origin: &mut Option<File>) -> Result<(), CorpusError> {
        if let SamplerState::Buffering(buffer) = &mut self.state {
            if buffer.fits(line.len(), self.capacity) {
                buffer.push(line);
                return Ok(());
            }
            let buffer = std::mem::take(buffer);
            self.state = spill(&self.name, buffer, origin.take())?;
        }

        let mode = self.mode();
        match &mut self.state {
            SamplerState::SpilledSeekable(lines) => {
                lines.index.push(line.len());
                Ok(())
            }
            SamplerState::SpilledCopied(lines) => {
                lines.append(line).map_err(|source| CorpusError::Spool {
                    name: self.name.clone(),
                    source,
                })
            }
            SamplerState::Unopened | SamplerState::Buffering(_) | SamplerState::Disposed => {
                Err(CorpusError::Unavailable {
                    name: self.name.clone(),
                    mode,
                })
            }
        }
    }

    fn read_error(&self, source: io::Error) -> CorpusError {
        CorpusError::Read {
            name: self.name.clone(),
            source,
        }
    }
}

/// The one-way buffering to spilled transition.
///
/// With the original file at hand the buffered lines only need offsets;
/// otherwise they are copied into a fresh spool first.
fn spill(name: &str, buffer: LineBuffer, origin: Option<File>) -> Result<SamplerState, CorpusError> {
    let mut index = LineIndex::with_capacity(buffer.lines.len());
    match origin {
        Some(file) => {
            for line in &buffer.lines {
                index.push(line.len());
            }
            info!(
                corpus = %name,
                lines = index.len(),
                bytes = buffer.size,
                "corpus spilled to offset index over source file"
            );
            Ok(SamplerState::SpilledSeekable(IndexedLines {
                index,
                backing: file,
            }))
        }
        None => {
            let spool = Spool::create(name).map_err(|source| CorpusError::Spool {
                name: name.to_string(),
                source,
            })?;
            let mut lines = IndexedLines {
                index,
                backing: spool,
            };
            for line in &buffer.lines {
                lines.append(line).map_err(|source| CorpusError::Spool {
                    name: name.to_string(),
                    source,
                })?;
            }
            info!(
                corpus = %name,
                lines = lines.index.len(),
                bytes = buffer.size,
                spool = %lines.backing.path().display(),
                "corpus spilled to temporary copy"
            );
            Ok(SamplerState::SpilledCopied(lines))
        }
    }
}

/// In-memory lines, each stored with its delimiter.
#[derive(Default)]
struct LineBuffer {
    lines: Vec<Vec<u8>>,
    size: u64,
}

impl LineBuffer {
    fn fits(&self, len: usize, capacity: u64) -> bool {
        self.size.saturating_add(len as u64) <= capacity
    }

    fn push(&mut self, line: &[u8]) {
        self.size += line.len() as u64;
        self.lines.push(line.to_vec());
    }

    fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> &[u8] {
        if self.lines.is_empty() {
            return &[];
        }
        let idx = rng.random_range(0..self.lines.len());
        trim_line_ending(&self.lines[idx])
    }
}

/// End offsets of every line, delimiter included.
struct LineIndex {
    ends: Vec<u64>,
}

impl LineIndex {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            ends: Vec::with_capacity(capacity),
        }
    }

    fn len(&self) -> usize {
        self.ends.len()
    }

    fn push(&mut self, len: usize) {
        let start = self.ends.last().copied().unwrap_or(0);
        self.ends.push(start + len as u64);
    }

    /// Byte range `[start, end)` of line `idx`.
    fn span(&self, idx: usize) -> (u64, u64) {
        let start = if idx == 0 { 0 } else { self.ends[idx - 1] };
        (start, self.ends[idx])
    }
}

/// Something that exposes a file readable at arbitrary offsets.
trait Backing {
    fn file(&self) -> &File;
}

impl Backing for File {
    fn file(&self) -> &File {
        self
    }
}

struct IndexedLines<B> {
    index: LineIndex,
    backing: B,
}

impl<B: Backing> IndexedLines<B> {
    fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> io::Result<Vec<u8>> {
        if self.index.len() == 0 {
            return Ok(Vec::new());
        }
        let (start, end) = self.index.span(rng.random_range(0..self.index.len()));
        let mut buf = vec![0_u8; (end - start) as usize];
        read_exact_at(self.backing.file(), &mut buf, start)?;
        let trimmed = trim_line_ending(&buf).len();
        buf.truncate(trimmed);
        Ok(buf)
    }
}

impl IndexedLines<Spool> {
    fn append(&mut self, line: &[u8]) -> io::Result<()> {
        self.backing.write_line(line)?;
        self.index.push(line.len());
        Ok(())
    }
}

/// Temporary copy of a forward-only source. Removed on dispose or drop.
struct Spool {
    writer: BufWriter<NamedTempFile>,
}

impl Spool {
    fn create(name: &str) -> io::Result<Self> {
        let prefix: String = name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        let file = tempfile::Builder::new()
            .prefix(&format!("jsonsmith-{prefix}-"))
            .tempfile()?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }

    fn path(&self) -> &Path {
        self.writer.get_ref().path()
    }

    fn write_line(&mut self, line: &[u8]) -> io::Result<()> {
        self.writer.write_all(line)?;
        if !line.ends_with(b"\n") {
            self.writer.write_all(b"\n")?;
        }
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    fn remove(self) -> io::Result<()> {
        let (file, _unflushed) = self.writer.into_parts();
        file.close()
    }
}

impl Backing for Spool {
    fn file(&self) -> &File {
        self.writer.get_ref().as_file()
    }
}

fn trim_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

#[cfg(unix)]
fn read_exact_at(file: &File, buf: &mut [u8], offset: u64) -> io::Result<()> {
    use std::os::unix::fs::FileExt;
    file.read_exact_at(buf, offset)
}

#[cfg(not(unix))]
fn read_exact_at(mut file: &File, buf: &mut [u8], offset: u64) -> io::Result<()> {
    file.seek(io::SeekFrom::Start(offset))?;
    file.read_exact(buf)
}
