use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use serde::Deserialize;

use jsonsmith_core::Length;

#[derive(Parser, Debug)]
#[command(
    name = "jsonsmith",
    version,
    about = "Generate random JSON documents from a YAML schema"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
    /// TOML settings file; command-line flags take precedence.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
    /// Raise log verbosity (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
    /// Log line format on stderr or in the log file.
    #[arg(long, global = true, value_enum)]
    pub log_format: Option<LogFormat>,
    /// Append logs to this file instead of stderr.
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate documents from a schema.
    Generate(GenerateArgs),
    /// Decode and validate a schema without generating.
    Validate(ValidateArgs),
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Schema file (YAML or JSON).
    #[arg(value_name = "SCHEMA")]
    pub schema: PathBuf,
    /// Bind a declared file name to a path; `-` reads stdin.
    #[arg(short = 'f', long = "file", value_name = "NAME=PATH", value_parser = parse_binding)]
    pub files: Vec<(String, PathBuf)>,
    /// Keep object fields in declaration order instead of sorting keys.
    #[arg(short = 'n', long = "nosort")]
    pub no_sort: bool,
    /// Write output to a file instead of stdout.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
    /// Output buffer size in bytes; 0 disables buffering.
    #[arg(long = "output-buff-size", value_name = "BYTES")]
    pub output_buffer: Option<usize>,
    /// Wrap root values in an array of N or MIN,MAX elements.
    #[arg(short, long, value_name = "LEN", conflicts_with = "stream")]
    pub array: Option<Length>,
    /// Emit newline-delimited root values; no count or a negative one streams forever.
    #[arg(
        short,
        long,
        value_name = "COUNT",
        num_args = 0..=1,
        allow_negative_numbers = true
    )]
    pub stream: Option<Option<i64>>,
    /// Seed for the random source; drawn at random when absent.
    #[arg(long)]
    pub seed: Option<u64>,
    /// Bytes of each corpus kept in memory before spilling to disk.
    #[arg(long = "corpus-buffer", value_name = "BYTES")]
    pub corpus_buffer: Option<u64>,
    /// Write the JSON run report to this path.
    #[arg(long, value_name = "PATH")]
    pub report: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Schema file (YAML or JSON).
    #[arg(value_name = "SCHEMA")]
    pub schema: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Parse `NAME=PATH`.
pub fn parse_binding(raw: &str) -> Result<(String, PathBuf), String> {
    let Some((name, path)) = raw.split_once('=') else {
        return Err(format!("expected NAME=PATH, got {raw:?}"));
    };
    if name.is_empty() {
        return Err("file name must not be empty".to_string());
    }
    if path.is_empty() {
        return Err(format!("file {name} has an empty path"));
    }
    Ok((name.to_string(), PathBuf::from(path)))
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("jsonsmith").chain(args.iter().copied()))
    }

    fn generate_args(args: &[&str]) -> GenerateArgs {
        match parse(args).expect("valid arguments").command {
            Command::Generate(args) => args,
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn bindings_split_on_first_equals() {
        assert_eq!(
            parse_binding("names=data/a=b.txt"),
            Ok(("names".to_string(), PathBuf::from("data/a=b.txt")))
        );
        assert!(parse_binding("names").is_err());
        assert!(parse_binding("=x").is_err());
        assert!(parse_binding("x=").is_err());
    }

    #[test]
    fn stream_count_is_optional_and_may_be_negative() {
        assert_eq!(generate_args(&["generate", "s.yaml"]).stream, None);
        assert_eq!(generate_args(&["generate", "s.yaml", "-s"]).stream, Some(None));
        assert_eq!(
            generate_args(&["generate", "s.yaml", "--stream", "5"]).stream,
            Some(Some(5))
        );
        assert_eq!(
            generate_args(&["generate", "s.yaml", "-s", "-1"]).stream,
            Some(Some(-1))
        );
    }

    #[test]
    fn array_accepts_fixed_and_ranged_lengths() {
        let fixed = generate_args(&["generate", "s.yaml", "-a", "4"]);
        assert_eq!(fixed.array, Some(Length::fixed(4)));
        let ranged = generate_args(&["generate", "s.yaml", "--array", "2,9"]);
        assert_eq!(ranged.array, Length::new(2, 9).ok());
        assert!(parse(&["generate", "s.yaml", "-a", "9,2"]).is_err());
    }

    #[test]
    fn array_and_stream_conflict() {
        assert!(parse(&["generate", "s.yaml", "-a", "3", "-s", "3"]).is_err());
    }

    #[test]
    fn repeated_files_and_global_flags() {
        let cli = parse(&[
            "-vv",
            "generate",
            "s.yaml",
            "-f",
            "names=names.txt",
            "--file",
            "cities=-",
            "-n",
            "--config",
            "jsonsmith.toml",
            "--report",
            "report.json",
        ])
        .expect("valid arguments");
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config, Some(PathBuf::from("jsonsmith.toml")));
        let Command::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        assert!(args.no_sort);
        assert_eq!(args.report, Some(PathBuf::from("report.json")));
        assert_eq!(
            args.files,
            vec![
                ("names".to_string(), PathBuf::from("names.txt")),
                ("cities".to_string(), PathBuf::from("-")),
            ]
        );
    }
}
