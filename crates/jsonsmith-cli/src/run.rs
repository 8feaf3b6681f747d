use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{info, warn};

use jsonsmith_core::Schema;
use jsonsmith_generate::{
    DEFAULT_CORPUS_CAPACITY, GenerateOptions, GenerationEngine, Layout, RunContext,
};

use crate::args::{GenerateArgs, ValidateArgs};
use crate::error::{CliError, CliResult};
use crate::settings::Settings;

pub const DEFAULT_OUTPUT_BUFFER: usize = 1024;

/// Effective generation parameters after merging flags over settings over
/// defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct RunPlan {
    pub schema: PathBuf,
    pub files: BTreeMap<String, PathBuf>,
    pub sort_keys: bool,
    pub output: Option<PathBuf>,
    pub output_buffer: usize,
    pub corpus_buffer: u64,
    pub layout: Layout,
    pub seed: Option<u64>,
    pub report: Option<PathBuf>,
}

impl RunPlan {
    pub fn resolve(args: GenerateArgs, settings: Settings) -> Self {
        let mut files = settings.files;
        files.extend(args.files);

        let layout = match (args.array, args.stream) {
            (Some(length), _) => Layout::Array { length },
            (None, Some(count)) => Layout::stream(count.unwrap_or(-1)),
            (None, None) => Layout::Single,
        };

        Self {
            schema: args.schema,
            files,
            sort_keys: !args.no_sort && settings.sort_keys.unwrap_or(true),
            output: args.output,
            output_buffer: args
                .output_buffer
                .or(settings.output_buffer_bytes)
                .unwrap_or(DEFAULT_OUTPUT_BUFFER),
            corpus_buffer: args
                .corpus_buffer
                .or(settings.corpus_buffer_bytes)
                .unwrap_or(DEFAULT_CORPUS_CAPACITY),
            layout,
            seed: args.seed.or(settings.seed),
            report: args.report,
        }
    }
}

pub fn run_validate(args: ValidateArgs) -> CliResult<()> {
    let schema = load_schema(&args.schema)?;
    let warnings = schema.validate()?;
    for issue in &warnings {
        eprintln!("warning: {issue}");
    }
    println!("{}: ok", args.schema.display());
    Ok(())
}

pub fn run_generate(plan: RunPlan) -> CliResult<()> {
    let schema = load_schema(&plan.schema)?;
    for issue in schema.validate()? {
        warn!(code = %issue.code, "{issue}");
    }

    let bindings = bind_files(&schema, &plan.files)?;
    let mut ctx = RunContext::new().with_corpus_capacity(plan.corpus_buffer);
    ctx.set_key_sorting(plan.sort_keys);
    for (name, path) in bindings {
        info!(file = %name, path = %path.display(), "ingesting corpus");
        ctx.set_file(name, path)?;
    }

    let seed = plan.seed.unwrap_or_else(|| rand::rng().random());
    info!(seed, "random source seeded");
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let sink = open_output(plan.output.as_deref(), plan.output_buffer)?;
    let report = GenerationEngine::new(GenerateOptions {
        layout: plan.layout,
    })
    .run(&schema.root, &ctx, &mut rng, sink)?;
    ctx.dispose()?;

    info!(
        run_id = %report.run_id,
        documents = report.documents,
        bytes_written = report.bytes_written,
        closed_by_reader = report.closed_by_reader,
        "run finished"
    );
    if let Some(path) = &plan.report {
        report
            .write_json(path)
            .map_err(|source| CliError::Report {
                path: path.clone(),
                source,
            })?;
        info!(path = %path.display(), "report written");
    }
    Ok(())
}

fn load_schema(path: &Path) -> CliResult<Schema> {
    Schema::from_path(path).map_err(|source| CliError::Schema {
        path: path.to_path_buf(),
        source,
    })
}

/// Pair each declared file with its bound path, in declaration order.
fn bind_files<'a>(
    schema: &'a Schema,
    files: &'a BTreeMap<String, PathBuf>,
) -> CliResult<Vec<(&'a str, &'a Path)>> {
    let mut bound = Vec::with_capacity(schema.files.len());
    let mut stdin_user: Option<&str> = None;
    for name in &schema.files {
        let path = files
            .get(name)
            .ok_or_else(|| CliError::MissingFile(name.clone()))?;
        if path.as_path() == Path::new("-") {
            if let Some(previous) = stdin_user {
                return Err(CliError::InvalidConfig(format!(
                    "files {previous} and {name} cannot both read stdin"
                )));
            }
            stdin_user = Some(name.as_str());
        }
        bound.push((name.as_str(), path.as_path()));
    }
    for name in files.keys() {
        if !schema.files.contains(name) {
            warn!(file = %name, "file is bound but not declared by the schema");
        }
    }
    Ok(bound)
}

fn open_output(path: Option<&Path>, buffer: usize) -> CliResult<Box<dyn Write>> {
    let target: Box<dyn Write> = match path {
        Some(path) => Box::new(File::create(path).map_err(|source| CliError::Output {
            path: path.to_path_buf(),
            source,
        })?),
        None => Box::new(io::stdout()),
    };
    if buffer == 0 {
        Ok(target)
    } else {
        Ok(Box::new(BufWriter::with_capacity(buffer, target)))
    }
}
