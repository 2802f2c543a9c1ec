//! Disjoint class membership.
//!
//! A resource's resolved types are compared pairwise. Since the type set is
//! already deduplicated and ordered, every unordered pair is visited exactly
//! once and comes out canonicalized; repeated `rdf:type` triples or
//! disjointness asserted in both directions cannot double a violation.

use super::{CheckContext, CheckKind, Checker, Focus};
use crate::model::Resource;
use crate::schema::DisjointPair;
use crate::violation::Violation;

/// Anonymous classes and `owl:Restriction` nodes reached through
/// `rdfs:subClassOf` take no part in implicit datatype disjointness.
fn is_named_class(ctx: &CheckContext<'_>, class: &Resource) -> bool {
    !class.is_blank() && !ctx.index.is_restriction(class)
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DisjointnessChecker {
    /// Treat datatypes as disjoint from every ordinary class.
    pub implicit_datatype_disjointness: bool,
}

impl DisjointnessChecker {
    pub fn new(implicit_datatype_disjointness: bool) -> Self {
        Self {
            implicit_datatype_disjointness,
        }
    }

    fn pair_is_disjoint(&self, ctx: &CheckContext<'_>, a: &Resource, b: &Resource) -> bool {
        if ctx.index.are_disjoint(a, b) {
            return true;
        }
        self.implicit_datatype_disjointness
            && is_named_class(ctx, a)
            && is_named_class(ctx, b)
            && ctx.index.is_datatype(a) != ctx.index.is_datatype(b)
    }

    pub fn check_resource(&self, ctx: &CheckContext<'_>, resource: &Resource) -> Vec<Violation> {
        let types = ctx.resolver.types_of(resource);
        if types.len() < 2 {
            return Vec::new();
        }

        let classes: Vec<&Resource> = types.iter().collect();
        let mut violations = Vec::new();
        for (index, first) in classes.iter().enumerate() {
            for second in &classes[index + 1..] {
                if !self.pair_is_disjoint(ctx, first, second) {
                    continue;
                }
                if let Some(classes) = DisjointPair::new((*first).clone(), (*second).clone()) {
                    violations.push(Violation::DisjointClassMembership {
                        resource: resource.clone(),
                        classes,
                    });
                }
            }
        }
        violations
    }
}

impl Checker for DisjointnessChecker {
    fn kind(&self) -> CheckKind {
        CheckKind::Disjointness
    }

    fn targets(&self, ctx: &CheckContext<'_>) -> Vec<Focus> {
        if ctx.index.disjoint_pair_count() == 0 && !self.implicit_datatype_disjointness {
            return Vec::new();
        }
        ctx.data
            .typed_resources()
            .into_iter()
            .map(Focus::Resource)
            .collect()
    }

    fn check(&self, ctx: &CheckContext<'_>, focus: &Focus) -> Vec<Violation> {
        match focus {
            Focus::Resource(resource) => self.check_resource(ctx, resource),
            Focus::Triple(_) => Vec::new(),
        }
    }
}
