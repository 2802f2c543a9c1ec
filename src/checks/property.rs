//! Domain and range checks for property assertions.
//!
//! Each declared domain and each declared class range is an independent
//! constraint: a triple is checked against every one of them and fails
//! each one separately. Undeclared predicates are never checked.

use super::{CheckContext, CheckKind, Checker, Focus};
use crate::model::{Object, Triple};
use crate::violation::Violation;
use crate::vocab::rdf;

#[derive(Debug, Default, Clone, Copy)]
pub struct PropertyConstraintChecker;

impl PropertyConstraintChecker {
    pub fn check_triple(&self, ctx: &CheckContext<'_>, triple: &Triple) -> Vec<Violation> {
        let Some(declaration) = ctx.index.property(&triple.predicate) else {
            return Vec::new();
        };
        let mut violations = Vec::new();

        if !declaration.domains.is_empty() {
            let subject_types = ctx.resolver.types_of(&triple.subject);
            for domain in &declaration.domains {
                if !subject_types.contains(domain) {
                    violations.push(Violation::DomainMismatch {
                        triple: triple.clone(),
                        expected: domain.clone(),
                    });
                }
            }
        }

        // Literal objects carry no class membership; datatype ranges are
        // the datatype checker's concern.
        if let Object::Resource(object) = &triple.object {
            if !declaration.class_ranges.is_empty() {
                let object_types = ctx.resolver.types_of(object);
                for range in &declaration.class_ranges {
                    if !object_types.contains(range) {
                        violations.push(Violation::RangeMismatch {
                            triple: triple.clone(),
                            expected: range.clone(),
                        });
                    }
                }
            }
        }

        violations
    }
}

impl Checker for PropertyConstraintChecker {
    fn kind(&self) -> CheckKind {
        CheckKind::DomainRange
    }

    fn targets(&self, ctx: &CheckContext<'_>) -> Vec<Focus> {
        ctx.index
            .properties()
            .filter(|declaration| {
                !declaration.property.is(rdf::TYPE)
                    && (!declaration.domains.is_empty() || !declaration.class_ranges.is_empty())
            })
            .flat_map(|declaration| {
                ctx.data
                    .triples_with_predicate(declaration.property.as_str())
                    .into_iter()
                    .map(Focus::Triple)
            })
            .collect()
    }

    fn check(&self, ctx: &CheckContext<'_>, focus: &Focus) -> Vec<Violation> {
        match focus {
            Focus::Triple(triple) => self.check_triple(ctx, triple),
            Focus::Resource(_) => Vec::new(),
        }
    }
}
