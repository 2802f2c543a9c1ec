pub mod checks;
pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod model;
pub mod report;
pub mod resolver;
pub mod schema;
pub mod store;
pub mod violation;
pub mod vocab;

pub use checks::{CheckKind, Checker};
pub use config::{CliArgs, OutputFormat, ValidateConfig};
pub use engine::{EngineOptions, ValidationEngine, validate};
pub use error::GraphLoadError;
pub use logging::{LoggingConfig, init_logging};
pub use model::{Literal, Object, Resource, Triple, TypeSet};
pub use report::{ValidationReport, render_json, render_text};
pub use resolver::TypeResolver;
pub use schema::SchemaIndex;
pub use store::{GraphStore, InputFormat, UnionView};
pub use violation::{Violation, ViolationKind, ViolationSet};

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Process exit status of a CLI run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Clean,
    Violations,
}

impl Outcome {
    pub fn exit_code(self) -> u8 {
        match self {
            Outcome::Clean => 0,
            Outcome::Violations => 1,
        }
    }
}

/// Loads the configured graphs, validates, and prints the report to stdout.
pub fn run_cli(config: ValidateConfig) -> Result<Outcome> {
    let schema = load_inputs("schema", &config.schema, config.input_format)?;
    let data = load_inputs("data", &config.data, config.input_format)?;

    let engine = ValidationEngine::new(config.engine_options());
    let report = engine.run(&data, &schema);

    let rendered = match config.output {
        OutputFormat::Text => render_text(&report),
        OutputFormat::Json => render_json(&report).context("failed to serialize report")?,
    };
    println!("{}", rendered.trim_end());

    if report.is_valid() || !config.fail_on_violations {
        Ok(Outcome::Clean)
    } else {
        Ok(Outcome::Violations)
    }
}

fn load_inputs(
    role: &str,
    paths: &[PathBuf],
    format: Option<InputFormat>,
) -> Result<oxigraph::model::Graph> {
    let graph = store::load_graphs(paths.iter().map(PathBuf::as_path), format)
        .with_context(|| format!("failed to load {role} graph"))?;
    tracing::info!(role, files = paths.len(), triples = graph.len(), "graph loaded");
    Ok(graph)
}
