use std::io::Write;
use std::time::Instant;

use rand::Rng;
use tracing::{debug, info, warn};

use jsonsmith_core::{Length, Node, PathSegment};

use crate::context::RunContext;
use crate::errors::GenerationError;
use crate::generators::{draw_length, write_value};
use crate::model::{GenerateOptions, GenerationReport, Layout};
use crate::output::CountingWriter;

/// Write exactly one JSON value for `node`.
///
/// Output is produced incrementally; on failure the sink may hold a
/// truncated value.
pub fn generate<R, W>(
    node: &Node,
    ctx: &RunContext,
    rng: &mut R,
    out: &mut W,
) -> Result<(), GenerationError>
where
    R: Rng + ?Sized,
    W: Write + ?Sized,
{
    write_value(node, ctx, rng, out)
}

/// Write a JSON array of independently generated `node` values whose size
/// is drawn from `length`. Returns the number of values written.
pub fn generate_array<R, W>(
    node: &Node,
    length: Length,
    ctx: &RunContext,
    rng: &mut R,
    out: &mut W,
) -> Result<u64, GenerationError>
where
    R: Rng + ?Sized,
    W: Write + ?Sized,
{
    let count = draw_length(length, rng);
    out.write_all(b"[")?;
    for idx in 0..count {
        if idx > 0 {
            out.write_all(b",")?;
        }
        write_value(node, ctx, rng, out)
            .map_err(|err| err.within(PathSegment::Index(idx as usize)))?;
    }
    out.write_all(b"]")?;
    Ok(count)
}

/// Write newline-delimited `node` values, flushing after each one.
///
/// A negative `count` streams until writing fails, typically because the
/// reader closed the sink.
pub fn stream_generate<R, W>(
    node: &Node,
    ctx: &RunContext,
    rng: &mut R,
    out: &mut W,
    count: i64,
) -> Result<(), GenerationError>
where
    R: Rng + ?Sized,
    W: Write + ?Sized,
{
    let mut written = 0;
    stream_values(node, ctx, rng, out, u64::try_from(count).ok(), &mut written)
}

fn stream_values<R, W>(
    node: &Node,
    ctx: &RunContext,
    rng: &mut R,
    out: &mut W,
    count: Option<u64>,
    written: &mut u64,
) -> Result<(), GenerationError>
where
    R: Rng + ?Sized,
    W: Write + ?Sized,
{
    while count.is_none_or(|count| *written < count) {
        write_value(node, ctx, rng, out)?;
        out.write_all(b"\n")?;
        out.flush()?;
        *written += 1;
    }
    Ok(())
}

/// Entry point for one generation run over a root node.
#[derive(Debug, Clone, Default)]
pub struct GenerationEngine {
    options: GenerateOptions,
}

impl GenerationEngine {
    pub fn new(options: GenerateOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &GenerateOptions {
        &self.options
    }

    /// Generate into `out` with the configured layout.
    ///
    /// When a stream is cut short because the reader closed the output, the
    /// run still succeeds and the report is marked `closed_by_reader`.
    pub fn run<R, W>(
        &self,
        node: &Node,
        ctx: &RunContext,
        rng: &mut R,
        out: W,
    ) -> Result<GenerationReport, GenerationError>
    where
        R: Rng + ?Sized,
        W: Write,
    {
        let start = Instant::now();
        let run_id = uuid::Uuid::new_v4().to_string();
        let layout = self.options.layout;
        let mut report = GenerationReport::new(run_id.clone(), layout);
        let mut out = CountingWriter::new(out);

        info!(
            run_id = %run_id,
            layout = ?layout,
            sort_keys = ctx.key_sorting(),
            root = node.type_name(),
            "generation started"
        );

        let outcome = match layout {
            Layout::Single => generate(node, ctx, rng, &mut out).map(|()| report.documents = 1),
            Layout::Array { length } => generate_array(node, length, ctx, rng, &mut out)
                .map(|count| report.documents = count),
            Layout::Stream { count } => {
                stream_values(node, ctx, rng, &mut out, count, &mut report.documents)
            }
        }
        .and_then(|()| out.flush().map_err(GenerationError::from));

        report.bytes_written = out.bytes_written();
        report.duration_ms = start.elapsed().as_millis() as u64;

        match outcome {
            Ok(()) => {
                info!(
                    run_id = %run_id,
                    documents = report.documents,
                    bytes_written = report.bytes_written,
                    duration_ms = report.duration_ms,
                    "generation completed"
                );
                Ok(report)
            }
            Err(err) if err.is_broken_pipe() && matches!(layout, Layout::Stream { .. }) => {
                report.closed_by_reader = true;
                debug!(
                    run_id = %run_id,
                    documents = report.documents,
                    "output closed by reader"
                );
                Ok(report)
            }
            Err(err) => {
                warn!(run_id = %run_id, error = %err, "generation failed");
                Err(err)
            }
        }
    }
}
