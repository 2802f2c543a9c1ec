//! Cardinality restrictions.
//!
//! Bounds come from `owl:Restriction` nodes a resource's classes reach
//! through `rdfs:subClassOf`, plus an implicit "at most 1" for every
//! `owl:FunctionalProperty`. Values are counted in the data graph only.
//! Qualified restrictions count only values in their `owl:onClass` (by
//! resolved type) or `owl:onDataRange` (by literal conformance).

use std::collections::BTreeSet;

use ahash::AHashSet;

use super::datatype::literal_conforms;
use super::{CheckContext, CheckKind, Checker, Focus};
use crate::model::{Object, Resource};
use crate::schema::{CardinalityBound, CardinalityRestriction, Qualifier};
use crate::violation::Violation;
use crate::vocab::owl;

#[derive(Debug, Default, Clone, Copy)]
pub struct CardinalityChecker;

impl CardinalityChecker {
    fn bounds_for(
        &self,
        ctx: &CheckContext<'_>,
        resource: &Resource,
    ) -> BTreeSet<CardinalityRestriction> {
        let mut bounds = BTreeSet::new();

        for class in ctx.resolver.types_of(resource).iter() {
            bounds.extend(ctx.index.restrictions_for(class).iter().cloned());
        }

        for property in ctx.index.functional_properties() {
            if !ctx.data.objects_of(resource, property.as_str()).is_empty() {
                bounds.insert(CardinalityRestriction {
                    property: property.clone(),
                    bound: CardinalityBound::Max(1),
                    qualifier: None,
                });
            }
        }

        bounds
    }

    fn qualifies(&self, ctx: &CheckContext<'_>, qualifier: &Qualifier, value: &Object) -> bool {
        match (qualifier, value) {
            (Qualifier::Class(class), Object::Resource(resource)) => {
                class.is(owl::THING) || ctx.resolver.types_of(resource).contains(class)
            }
            (Qualifier::DataRange(datatype), Object::Literal(literal)) => {
                literal_conforms(literal, datatype)
            }
            _ => false,
        }
    }

    pub fn check_resource(&self, ctx: &CheckContext<'_>, resource: &Resource) -> Vec<Violation> {
        let mut violations = Vec::new();

        for restriction in self.bounds_for(ctx, resource) {
            let CardinalityRestriction {
                property,
                bound,
                qualifier,
            } = restriction;
            if property.is_blank() {
                continue;
            }
            let values = ctx.data.objects_of(resource, property.as_str());
            let actual = match &qualifier {
                Some(qualifier) => values
                    .iter()
                    .filter(|value| self.qualifies(ctx, qualifier, value))
                    .count(),
                None => values.len(),
            };
            if !bound.admits(actual) {
                violations.push(Violation::CardinalityMismatch {
                    resource: resource.clone(),
                    property,
                    bound,
                    qualifier,
                    actual,
                });
            }
        }

        violations
    }
}

impl Checker for CardinalityChecker {
    fn kind(&self) -> CheckKind {
        CheckKind::Cardinality
    }

    fn targets(&self, ctx: &CheckContext<'_>) -> Vec<Focus> {
        let mut seen = AHashSet::new();
        let mut targets = Vec::new();

        if ctx.index.has_restrictions() {
            for resource in ctx.data.typed_resources() {
                if seen.insert(resource.clone()) {
                    targets.push(Focus::Resource(resource));
                }
            }
        }

        for property in ctx.index.functional_properties() {
            for triple in ctx.data.triples_with_predicate(property.as_str()) {
                if seen.insert(triple.subject.clone()) {
                    targets.push(Focus::Resource(triple.subject));
                }
            }
        }

        targets
    }

    fn check(&self, ctx: &CheckContext<'_>, focus: &Focus) -> Vec<Violation> {
        match focus {
            Focus::Resource(resource) => self.check_resource(ctx, resource),
            Focus::Triple(_) => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::test_support::{ex, run};
    use crate::violation::ViolationKind;

    const SCHEMA: &str = r#"
        :Person a owl:Class ;
            rdfs:subClassOf [
                a owl:Restriction ;
                owl:onProperty :name ;
                owl:minCardinality "1"^^xsd:nonNegativeInteger
            ] , [
                a owl:Restriction ;
                owl:onProperty :parent ;
                owl:maxCardinality "2"^^xsd:nonNegativeInteger
            ] .
        :Employee rdfs:subClassOf :Person .
        :ssn a owl:DatatypeProperty, owl:FunctionalProperty .
    "#;

    fn mismatch(resource: &str, property: &str, bound: CardinalityBound, actual: usize) -> Violation {
        Violation::CardinalityMismatch {
            resource: ex(resource),
            property: ex(property),
            bound,
            qualifier: None,
            actual,
        }
    }

    #[test]
    fn satisfied_restrictions_pass() {
        let found = run(
            &CardinalityChecker,
            r#":alice a :Person ; :name "Alice" ; :parent :p1, :p2 ."#,
            SCHEMA,
        );
        assert!(found.is_empty(), "{found:?}");
    }

    #[test]
    fn missing_value_breaks_minimum() {
        let found = run(&CardinalityChecker, ":bob a :Person .", SCHEMA);
        assert_eq!(found.len(), 1);
        assert!(found.contains(&mismatch("bob", "name", CardinalityBound::Min(1), 0)));
    }

    #[test]
    fn too_many_values_break_maximum() {
        let found = run(
            &CardinalityChecker,
            r#":carol a :Person ; :name "Carol" ; :parent :p1, :p2, :p3 ."#,
            SCHEMA,
        );
        assert_eq!(found.len(), 1);
        assert!(found.contains(&mismatch("carol", "parent", CardinalityBound::Max(2), 3)));
    }

    #[test]
    fn restrictions_are_inherited() {
        let found = run(&CardinalityChecker, ":dave a :Employee .", SCHEMA);
        assert!(found.contains(&mismatch("dave", "name", CardinalityBound::Min(1), 0)));
    }

    #[test]
    fn functional_property_allows_one_value() {
        let ok = run(&CardinalityChecker, r#":x :ssn "123" ."#, SCHEMA);
        assert!(ok.is_empty());

        let found = run(&CardinalityChecker, r#":x :ssn "123", "456" ."#, SCHEMA);
        assert_eq!(found.count_of(ViolationKind::CardinalityMismatch), 1);
        assert!(found.contains(&mismatch("x", "ssn", CardinalityBound::Max(1), 2)));
    }

    #[test]
    fn exact_cardinality() {
        let schema = r#"
            :Pair rdfs:subClassOf [ owl:onProperty :member ; owl:cardinality 2 ] .
        "#;
        let found = run(&CardinalityChecker, ":solo a :Pair ; :member :a .", schema);
        assert!(found.contains(&mismatch("solo", "member", CardinalityBound::Exact(2), 1)));

        let ok = run(&CardinalityChecker, ":duo a :Pair ; :member :a, :b .", schema);
        assert!(ok.is_empty());
    }

    #[test]
    fn untyped_resources_without_functional_values_are_skipped() {
        let found = run(&CardinalityChecker, ":x :parent :a, :b, :c .", SCHEMA);
        assert!(found.is_empty());
    }

    const PET_SCHEMA: &str = r#"
        :Owner rdfs:subClassOf [
            a owl:Restriction ;
            owl:onProperty :hasPet ;
            owl:qualifiedCardinality 1 ;
            owl:onClass :Dog
        ] .
        :Puppy rdfs:subClassOf :Dog .
    "#;

    #[test]
    fn qualified_cardinality_counts_only_the_qualifying_class() {
        let found = run(
            &CardinalityChecker,
            ":o a :Owner ; :hasPet :d, :c . :d a :Dog . :c a :Cat .",
            PET_SCHEMA,
        );
        assert!(found.is_empty(), "{found:?}");

        let inferred = run(
            &CardinalityChecker,
            ":o a :Owner ; :hasPet :p, :c . :p a :Puppy . :c a :Cat .",
            PET_SCHEMA,
        );
        assert!(inferred.is_empty(), "{inferred:?}");
    }

    #[test]
    fn qualified_cardinality_reports_qualifying_count() {
        let found = run(
            &CardinalityChecker,
            ":o a :Owner ; :hasPet :c . :c a :Cat .",
            PET_SCHEMA,
        );
        let expected = Violation::CardinalityMismatch {
            resource: ex("o"),
            property: ex("hasPet"),
            bound: CardinalityBound::Exact(1),
            qualifier: Some(Qualifier::Class(ex("Dog"))),
            actual: 0,
        };
        assert_eq!(found.len(), 1);
        assert!(found.contains(&expected));
        assert_eq!(
            expected.to_string(),
            "<http://example.com/o> has 0 value(s) for <http://example.com/hasPet> \
             in <http://example.com/Dog>, expected exactly 1"
        );
    }

    #[test]
    fn data_range_qualifier_counts_conforming_literals() {
        let schema = r#"
            :Sensor rdfs:subClassOf [
                owl:onProperty :reading ;
                owl:maxQualifiedCardinality 1 ;
                owl:onDataRange xsd:integer
            ] .
        "#;
        let ok = run(
            &CardinalityChecker,
            r#":s a :Sensor ; :reading 4, "n/a" ."#,
            schema,
        );
        assert!(ok.is_empty(), "{ok:?}");

        let found = run(&CardinalityChecker, ":s a :Sensor ; :reading 4, 5 .", schema);
        assert_eq!(found.count_of(ViolationKind::CardinalityMismatch), 1);
    }
}
