use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use strum::IntoEnumIterator;

use crate::checks::CheckKind;
use crate::engine::EngineOptions;
use crate::store::InputFormat;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ValidateConfig {
    pub schema: Vec<PathBuf>,
    pub data: Vec<PathBuf>,
    /// Forced input syntax; inferred per file from its extension when unset.
    pub input_format: Option<InputFormat>,
    pub output: OutputFormat,
    pub checks: BTreeSet<CheckKind>,
    pub parallel: bool,
    pub implicit_datatype_disjointness: bool,
    pub fail_on_violations: bool,
}

impl ValidateConfig {
    pub fn from_args(args: CliArgs) -> Result<Self> {
        let CliArgs {
            config,
            schema: cli_schema,
            data: cli_data,
            input_format: cli_input_format,
            format: cli_format,
            checks: cli_checks,
            no_parallel,
            implicit_datatype_disjointness,
            no_fail,
        } = args;

        let file_config = if let Some(path) = config.as_ref() {
            load_config_file(path)?
        } else {
            PartialConfig::default()
        };

        let PartialConfig {
            schema: file_schema,
            data: file_data,
            input_format: file_input_format,
            format: file_format,
            checks: file_checks,
            parallel: file_parallel,
            implicit_datatype_disjointness: file_implicit,
            fail_on_violations: file_fail,
        } = file_config;

        // Relative paths in a config file are relative to that file.
        let base = config
            .as_ref()
            .and_then(|path| path.parent())
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let from_file = |paths: Vec<PathBuf>| -> Vec<PathBuf> {
            paths
                .into_iter()
                .map(|path| if path.is_absolute() { path } else { base.join(path) })
                .collect()
        };

        let schema = non_empty(cli_schema)
            .or_else(|| file_schema.map(from_file))
            .unwrap_or_default();
        let data = non_empty(cli_data)
            .or_else(|| file_data.map(from_file))
            .unwrap_or_default();

        anyhow::ensure!(!schema.is_empty(), "at least one schema file must be provided");
        anyhow::ensure!(!data.is_empty(), "at least one data file must be provided");

        let checks: BTreeSet<CheckKind> = non_empty(cli_checks)
            .or(file_checks)
            .map(|checks| checks.into_iter().collect())
            .unwrap_or_else(|| CheckKind::iter().collect());

        anyhow::ensure!(!checks.is_empty(), "at least one check must be enabled");

        let parallel = if no_parallel {
            false
        } else {
            file_parallel.unwrap_or(true)
        };

        let implicit_datatype_disjointness =
            implicit_datatype_disjointness || file_implicit.unwrap_or(false);

        let fail_on_violations = if no_fail {
            false
        } else {
            file_fail.unwrap_or(true)
        };

        Ok(Self {
            schema,
            data,
            input_format: cli_input_format.or(file_input_format),
            output: cli_format.or(file_format).unwrap_or_default(),
            checks,
            parallel,
            implicit_datatype_disjointness,
            fail_on_violations,
        })
    }

    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            checks: self.checks.clone(),
            parallel: self.parallel,
            implicit_datatype_disjointness: self.implicit_datatype_disjointness,
        }
    }
}

fn non_empty<T>(values: Option<Vec<T>>) -> Option<Vec<T>> {
    values.filter(|values| !values.is_empty())
}

#[derive(Parser, Debug, Default, Clone)]
#[command(
    name = "rdf-validate",
    about = "Check an RDF data graph against the rules of an RDFS/OWL schema graph",
    version
)]
pub struct CliArgs {
    #[arg(
        long,
        env = "RDF_VALIDATE_CONFIG",
        value_name = "FILE",
        help = "Path to a configuration file (YAML or JSON)"
    )]
    pub config: Option<PathBuf>,

    #[arg(
        long,
        env = "RDF_VALIDATE_SCHEMA",
        value_name = "FILE",
        num_args = 1..,
        value_delimiter = ',',
        help = "Schema graph file(s); several files are merged"
    )]
    pub schema: Option<Vec<PathBuf>>,

    #[arg(
        long,
        env = "RDF_VALIDATE_DATA",
        value_name = "FILE",
        num_args = 1..,
        value_delimiter = ',',
        help = "Data graph file(s); several files are merged"
    )]
    pub data: Option<Vec<PathBuf>>,

    #[arg(
        long,
        env = "RDF_VALIDATE_INPUT_FORMAT",
        value_enum,
        value_name = "SYNTAX",
        help = "RDF syntax of every input file (default: from the file extension)"
    )]
    pub input_format: Option<InputFormat>,

    #[arg(
        long,
        env = "RDF_VALIDATE_FORMAT",
        value_enum,
        value_name = "FORMAT",
        help = "Report format (text or json)"
    )]
    pub format: Option<OutputFormat>,

    #[arg(
        long,
        env = "RDF_VALIDATE_CHECKS",
        value_enum,
        value_name = "CHECK",
        value_delimiter = ',',
        help = "Comma-separated list of checks to run (default: all)"
    )]
    pub checks: Option<Vec<CheckKind>>,

    #[arg(
        long,
        env = "RDF_VALIDATE_NO_PARALLEL",
        help = "Check every focus on the calling thread"
    )]
    pub no_parallel: bool,

    #[arg(
        long,
        env = "RDF_VALIDATE_IMPLICIT_DATATYPE_DISJOINTNESS",
        help = "Treat datatypes as disjoint from every ordinary class"
    )]
    pub implicit_datatype_disjointness: bool,

    #[arg(
        long,
        env = "RDF_VALIDATE_NO_FAIL",
        help = "Exit with status 0 even when violations are found"
    )]
    pub no_fail: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PartialConfig {
    schema: Option<Vec<PathBuf>>,
    data: Option<Vec<PathBuf>>,
    input_format: Option<InputFormat>,
    format: Option<OutputFormat>,
    checks: Option<Vec<CheckKind>>,
    parallel: Option<bool>,
    implicit_datatype_disjointness: Option<bool>,
    fail_on_violations: Option<bool>,
}

fn load_config_file(path: &Path) -> Result<PartialConfig> {
    if !path.exists() {
        anyhow::bail!("config file {:?} does not exist", path);
    }
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {:?}", path))?;
    let ext = path
        .extension()
        .and_then(|os| os.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let parsed = match ext.as_str() {
        "yaml" | "yml" => serde_yaml::from_str(&contents)
            .with_context(|| format!("failed to parse YAML config {:?}", path))?,
        "json" => serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse JSON config {:?}", path))?,
        other => anyhow::bail!("unsupported config extension: {other}"),
    };
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn args() -> CliArgs {
        CliArgs {
            schema: Some(vec![PathBuf::from("schema.ttl")]),
            data: Some(vec![PathBuf::from("data.ttl")]),
            ..CliArgs::default()
        }
    }

    fn config_file(ext: &str, body: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(&format!(".{ext}"))
            .tempfile()
            .unwrap();
        file.write_all(body.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults() {
        let config = ValidateConfig::from_args(args()).unwrap();
        assert_eq!(config.output, OutputFormat::Text);
        assert_eq!(config.checks.len(), 4);
        assert!(config.parallel);
        assert!(!config.implicit_datatype_disjointness);
        assert!(config.fail_on_violations);
        assert_eq!(config.input_format, None);
        assert_eq!(config.engine_options(), EngineOptions::default());
    }

    #[test]
    fn inputs_are_required() {
        let missing = ValidateConfig::from_args(CliArgs {
            data: None,
            ..args()
        });
        assert!(missing.is_err());
    }

    #[test]
    fn file_values_fill_gaps_and_cli_wins() {
        let file = config_file(
            "yaml",
            "schema: [ontology.ttl]\nformat: json\nchecks: [disjointness]\nparallel: false\n",
        );
        let config = ValidateConfig::from_args(CliArgs {
            config: Some(file.path().to_path_buf()),
            schema: None,
            format: Some(OutputFormat::Text),
            ..args()
        })
        .unwrap();

        let dir = file.path().parent().unwrap();
        assert_eq!(config.schema, vec![dir.join("ontology.ttl")]);
        assert_eq!(config.data, vec![PathBuf::from("data.ttl")]);
        assert_eq!(config.output, OutputFormat::Text);
        assert_eq!(
            config.checks,
            [CheckKind::Disjointness].into_iter().collect::<BTreeSet<_>>()
        );
        assert!(!config.parallel);
    }

    #[test]
    fn json_config() {
        let file = config_file(
            "json",
            r#"{"implicit_datatype_disjointness": true, "fail_on_violations": false, "input_format": "n-triples"}"#,
        );
        let config = ValidateConfig::from_args(CliArgs {
            config: Some(file.path().to_path_buf()),
            ..args()
        })
        .unwrap();
        assert!(config.implicit_datatype_disjointness);
        assert!(!config.fail_on_violations);
        assert_eq!(config.input_format, Some(InputFormat::NTriples));
    }

    #[test]
    fn bad_config_files_are_rejected() {
        let toml = config_file("toml", "format = 'json'");
        let err = ValidateConfig::from_args(CliArgs {
            config: Some(toml.path().to_path_buf()),
            ..args()
        })
        .unwrap_err();
        assert!(err.to_string().contains("unsupported config extension"));

        let unknown = config_file("yaml", "workers: 4\n");
        assert!(
            ValidateConfig::from_args(CliArgs {
                config: Some(unknown.path().to_path_buf()),
                ..args()
            })
            .is_err()
        );

        let missing = ValidateConfig::from_args(CliArgs {
            config: Some(PathBuf::from("/nonexistent/rdf-validate.yaml")),
            ..args()
        });
        assert!(missing.is_err());
    }

    #[test]
    fn parses_command_line() {
        let cli = CliArgs::try_parse_from([
            "rdf-validate",
            "--schema",
            "a.ttl",
            "b.ttl",
            "--data",
            "d.ttl",
            "--checks",
            "domain-range,cardinality",
            "--format",
            "json",
            "--no-parallel",
        ])
        .unwrap();
        let config = ValidateConfig::from_args(cli).unwrap();
        assert_eq!(config.schema.len(), 2);
        assert_eq!(config.output, OutputFormat::Json);
        assert_eq!(config.checks.len(), 2);
        assert!(!config.parallel);
    }
}
