use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::args::LogFormat;
use crate::error::{CliError, CliResult};

/// Optional settings file. Every key may be omitted.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub sort_keys: Option<bool>,
    pub output_buffer_bytes: Option<usize>,
    pub corpus_buffer_bytes: Option<u64>,
    pub seed: Option<u64>,
    pub log_format: Option<LogFormat>,
    /// Declared file name to path. Relative paths resolve against the
    /// directory holding the settings file.
    pub files: BTreeMap<String, PathBuf>,
}

impl Settings {
    pub fn parse(content: &str, path: &Path) -> CliResult<Self> {
        toml::from_str(content).map_err(|source| CliError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Load settings from `path`, or defaults when no file was given.
pub fn load_settings(path: Option<&Path>) -> CliResult<Settings> {
    let Some(path) = path else {
        return Ok(Settings::default());
    };
    let content = std::fs::read_to_string(path).map_err(|source| CliError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    let mut settings = Settings::parse(&content, path)?;

    let base = path.parent().unwrap_or_else(|| Path::new(""));
    for file in settings.files.values_mut() {
        if file.is_relative() && file.as_path() != Path::new("-") {
            *file = base.join(&*file);
        }
    }
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn parses_every_key() {
        let settings = Settings::parse(
            r#"
sort_keys = false
output_buffer_bytes = 0
corpus_buffer_bytes = 4096
seed = 42
log_format = "json"

[files]
names = "/data/names.txt"
"#,
            Path::new("jsonsmith.toml"),
        )
        .expect("valid settings");

        assert_eq!(settings.sort_keys, Some(false));
        assert_eq!(settings.output_buffer_bytes, Some(0));
        assert_eq!(settings.corpus_buffer_bytes, Some(4096));
        assert_eq!(settings.seed, Some(42));
        assert_eq!(settings.log_format, Some(LogFormat::Json));
        assert_eq!(
            settings.files.get("names"),
            Some(&PathBuf::from("/data/names.txt"))
        );
    }

    #[test]
    fn empty_document_is_all_defaults() {
        let settings = Settings::parse("", Path::new("jsonsmith.toml")).expect("valid");
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = Settings::parse("sortkeys = true", Path::new("jsonsmith.toml"))
            .expect_err("typo rejected");
        assert!(matches!(err, CliError::ConfigParse { .. }));
    }

    #[test]
    fn relative_files_resolve_against_settings_dir() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("jsonsmith.toml");
        let mut file = std::fs::File::create(&path).expect("create");
        writeln!(file, "[files]\nnames = \"corpora/names.txt\"\nfeed = \"-\"").expect("write");

        let settings = load_settings(Some(&path)).expect("load");
        assert_eq!(
            settings.files.get("names"),
            Some(&dir.path().join("corpora/names.txt"))
        );
        assert_eq!(settings.files.get("feed"), Some(&PathBuf::from("-")));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = load_settings(Some(Path::new("/no/such/jsonsmith.toml"))).expect_err("missing");
        assert!(matches!(err, CliError::ConfigRead { .. }));
    }
}
