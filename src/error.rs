//! Error types for the edges of the validator.
//!
//! Validation itself has no failure mode: a run either finds violations or
//! it does not. Errors only arise while getting graphs into memory.

use oxigraph::io::RdfParseError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading or parsing a graph.
#[derive(Error, Debug)]
pub enum GraphLoadError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot infer RDF format of {}; pass an explicit input format", .0.display())]
    UnknownFormat(PathBuf),

    #[error("failed to parse {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: RdfParseError,
    },
}
