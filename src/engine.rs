//! Validation orchestration.
//!
//! One run builds the schema index and a fresh type resolver, then lets each
//! enabled checker walk its focus set. Per-focus checks are independent, so
//! with `parallel` on they are spread over rayon's pool and the partial
//! results are folded back together by set union.

use std::collections::BTreeSet;
use std::time::Instant;

use rayon::prelude::*;
use strum::IntoEnumIterator;

use crate::checks::{
    CardinalityChecker, CheckContext, CheckKind, Checker, DatatypeChecker, DisjointnessChecker,
    Focus, PropertyConstraintChecker,
};
use crate::report::{CheckStats, RunStats, ValidationReport};
use crate::resolver::TypeResolver;
use crate::schema::SchemaIndex;
use crate::store::{GraphStore, UnionView};
use crate::violation::ViolationSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
    /// Checks to run; checks not listed are skipped entirely.
    pub checks: BTreeSet<CheckKind>,
    pub parallel: bool,
    /// Treat datatypes as disjoint from ordinary classes.
    pub implicit_datatype_disjointness: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            checks: CheckKind::iter().collect(),
            parallel: true,
            implicit_datatype_disjointness: false,
        }
    }
}

pub struct ValidationEngine {
    options: EngineOptions,
    checkers: Vec<Box<dyn Checker>>,
}

impl Default for ValidationEngine {
    fn default() -> Self {
        Self::new(EngineOptions::default())
    }
}

impl ValidationEngine {
    pub fn new(options: EngineOptions) -> Self {
        let checkers = options
            .checks
            .iter()
            .map(|kind| -> Box<dyn Checker> {
                match kind {
                    CheckKind::DomainRange => Box::new(PropertyConstraintChecker),
                    CheckKind::Disjointness => Box::new(DisjointnessChecker::new(
                        options.implicit_datatype_disjointness,
                    )),
                    CheckKind::Datatype => Box::new(DatatypeChecker),
                    CheckKind::Cardinality => Box::new(CardinalityChecker),
                }
            })
            .collect();

        Self { options, checkers }
    }

    /// Every violation of the schema's rules found in `data`.
    pub fn validate(&self, data: &dyn GraphStore, schema: &dyn GraphStore) -> ViolationSet {
        self.run(data, schema).violations
    }

    /// Like [`validate`](Self::validate), with per-check statistics.
    pub fn run(&self, data: &dyn GraphStore, schema: &dyn GraphStore) -> ValidationReport {
        let started = Instant::now();
        let span = tracing::info_span!(
            "validate",
            data_triples = data.len(),
            schema_triples = schema.len(),
            parallel = self.options.parallel,
        );
        let _entered = span.enter();

        let index = SchemaIndex::build(schema);
        let union = UnionView::new(data, schema);
        let resolver = TypeResolver::new(&union);
        let ctx = CheckContext {
            data,
            schema,
            index: &index,
            resolver: &resolver,
        };

        let mut violations = ViolationSet::new();
        let mut checks = Vec::with_capacity(self.checkers.len());

        for checker in &self.checkers {
            let check_started = Instant::now();
            let targets = checker.targets(&ctx);
            let found = self.evaluate(checker.as_ref(), &ctx, &targets);

            tracing::debug!(
                check = %checker.kind(),
                targets = targets.len(),
                violations = found.len(),
                "check finished"
            );

            checks.push(CheckStats {
                check: checker.kind(),
                targets: targets.len(),
                violations: found.len(),
                duration_ms: check_started.elapsed().as_millis() as u64,
            });
            violations.merge(found);
        }

        let stats = RunStats {
            data_triples: data.len(),
            schema_triples: schema.len(),
            declared_properties: index.properties().count(),
            disjoint_pairs: index.disjoint_pair_count(),
            checks,
            resolver: resolver.stats(),
            duration_ms: started.elapsed().as_millis() as u64,
        };

        tracing::info!(
            violations = violations.len(),
            duration_ms = stats.duration_ms,
            "validation finished"
        );

        ValidationReport { violations, stats }
    }

    fn evaluate(
        &self,
        checker: &dyn Checker,
        ctx: &CheckContext<'_>,
        targets: &[Focus],
    ) -> ViolationSet {
        if self.options.parallel {
            targets
                .par_iter()
                .fold(ViolationSet::new, |mut found, focus| {
                    found.extend(checker.check(ctx, focus));
                    found
                })
                .reduce(ViolationSet::new, |mut left, right| {
                    left.merge(right);
                    left
                })
        } else {
            targets
                .iter()
                .flat_map(|focus| checker.check(ctx, focus))
                .collect()
        }
    }
}

/// Validates `data` against `schema` with the default options.
pub fn validate(data: &dyn GraphStore, schema: &dyn GraphStore) -> ViolationSet {
    ValidationEngine::default().validate(data, schema)
}
