//! Constraint checkers
//!
//! Every checker follows the same two-step shape so the engine can drive
//! them uniformly (and in parallel):
//!
//! 1. [`Checker::targets`] enumerates the focus set: the triples or
//!    resources the checker cares about.
//! 2. [`Checker::check`] examines one focus and returns the violations it
//!    found. It reads the graphs and the schema index and nothing else, so
//!    any two focuses can be checked concurrently.
//!
//! ```text
//! Checker
//!     ├── PropertyConstraintChecker  (rdfs:domain / rdfs:range, per triple)
//!     ├── DisjointnessChecker        (owl:disjointWith, per resource)
//!     ├── DatatypeChecker            (literal value spaces, per triple)
//!     └── CardinalityChecker         (owl cardinality restrictions, per resource)
//! ```

pub mod cardinality;
pub mod datatype;
pub mod disjoint;
pub mod lexical;
pub mod property;

pub use cardinality::CardinalityChecker;
pub use datatype::DatatypeChecker;
pub use disjoint::DisjointnessChecker;
pub use property::PropertyConstraintChecker;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::model::{Resource, Triple};
use crate::resolver::TypeResolver;
use crate::schema::SchemaIndex;
use crate::store::GraphStore;
use crate::violation::Violation;

/// The checks a validation run can perform.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
    ValueEnum,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum CheckKind {
    DomainRange,
    Disjointness,
    Datatype,
    Cardinality,
}

/// What a checker looks at in one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Focus {
    Triple(Triple),
    Resource(Resource),
}

/// Read-only state shared by all checkers during one run.
pub struct CheckContext<'a> {
    pub data: &'a dyn GraphStore,
    pub schema: &'a dyn GraphStore,
    pub index: &'a SchemaIndex,
    pub resolver: &'a TypeResolver<'a>,
}

pub trait Checker: Send + Sync {
    fn kind(&self) -> CheckKind;

    fn targets(&self, ctx: &CheckContext<'_>) -> Vec<Focus>;

    fn check(&self, ctx: &CheckContext<'_>, focus: &Focus) -> Vec<Violation>;
}
