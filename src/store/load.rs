//! Parsing serialized RDF into in-memory graphs.
//!
//! Named graphs in TriG or N-Quads input are folded into one default graph;
//! validation only cares about the statements, not where they were filed.

use clap::ValueEnum;
use oxigraph::io::{RdfFormat, RdfParser};
use oxigraph::model::{Graph, TripleRef};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::GraphLoadError;

/// Serialization formats accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InputFormat {
    Turtle,
    NTriples,
    NQuads,
    Trig,
    RdfXml,
}

impl InputFormat {
    pub fn rdf_format(self) -> RdfFormat {
        match self {
            InputFormat::Turtle => RdfFormat::Turtle,
            InputFormat::NTriples => RdfFormat::NTriples,
            InputFormat::NQuads => RdfFormat::NQuads,
            InputFormat::Trig => RdfFormat::TriG,
            InputFormat::RdfXml => RdfFormat::RdfXml,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "ttl" | "turtle" => Some(InputFormat::Turtle),
            "nt" => Some(InputFormat::NTriples),
            "nq" => Some(InputFormat::NQuads),
            "trig" => Some(InputFormat::Trig),
            "rdf" | "owl" | "xml" => Some(InputFormat::RdfXml),
            _ => None,
        }
    }
}

fn read_into(
    graph: &mut Graph,
    reader: impl Read,
    format: InputFormat,
    origin: &str,
) -> Result<usize, GraphLoadError> {
    let mut added = 0;
    for quad in RdfParser::from_format(format.rdf_format()).for_reader(reader) {
        let quad = quad.map_err(|source| GraphLoadError::Parse {
            origin: origin.to_string(),
            source,
        })?;
        if graph.insert(TripleRef::new(
            quad.subject.as_ref(),
            quad.predicate.as_ref(),
            quad.object.as_ref(),
        )) {
            added += 1;
        }
    }
    Ok(added)
}

/// Parses an in-memory document.
pub fn parse_graph(text: &str, format: InputFormat) -> Result<Graph, GraphLoadError> {
    let mut graph = Graph::new();
    read_into(&mut graph, text.as_bytes(), format, "<inline>")?;
    Ok(graph)
}

/// Loads one file. The format is taken from `format` or, failing that, from
/// the file extension.
pub fn load_graph(path: &Path, format: Option<InputFormat>) -> Result<Graph, GraphLoadError> {
    load_graphs(std::iter::once(path), format)
}

/// Loads several files into a single graph.
pub fn load_graphs<'a>(
    paths: impl IntoIterator<Item = &'a Path>,
    format: Option<InputFormat>,
) -> Result<Graph, GraphLoadError> {
    let mut graph = Graph::new();
    for path in paths {
        let format = format
            .or_else(|| InputFormat::from_path(path))
            .ok_or_else(|| GraphLoadError::UnknownFormat(path.to_path_buf()))?;
        let file = File::open(path).map_err(|source| GraphLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let added = read_into(
            &mut graph,
            BufReader::new(file),
            format,
            &path.display().to_string(),
        )?;
        tracing::debug!(path = %path.display(), ?format, triples = added, "loaded graph file");
    }
    Ok(graph)
}
