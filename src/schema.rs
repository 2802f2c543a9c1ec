//! Schema Index
//!
//! Everything the checkers need from the schema graph, extracted once per
//! validation run into plain value structs:
//!
//! - [`PropertyDeclaration`]: domains, ranges and kind of each declared predicate
//! - [`DisjointPair`]: canonicalized class pairs from `owl:disjointWith` and
//!   `owl:AllDisjointClasses`
//! - [`CardinalityRestriction`]: `owl:onProperty` restrictions, optionally
//!   qualified by `owl:onClass` / `owl:onDataRange`, and
//!   `owl:FunctionalProperty` declarations
//! - declared datatypes (`rdfs:Datatype`), used to tell class ranges from
//!   datatype ranges

use ahash::{AHashMap, AHashSet};
use oxigraph::model::NamedNodeRef;
use serde::Serialize;
use std::fmt;

use crate::model::{Object, Resource};
use crate::store::GraphStore;
use crate::vocab::{XSD_NS, owl, rdf, rdfs};

/// Two distinct classes declared mutually exclusive, stored in canonical order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct DisjointPair {
    first: Resource,
    second: Resource,
}

impl DisjointPair {
    /// Canonicalizes `a`/`b`; returns `None` when both name the same class.
    pub fn new(a: Resource, b: Resource) -> Option<Self> {
        match a.cmp(&b) {
            std::cmp::Ordering::Less => Some(Self { first: a, second: b }),
            std::cmp::Ordering::Greater => Some(Self { first: b, second: a }),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn first(&self) -> &Resource {
        &self.first
    }

    pub fn second(&self) -> &Resource {
        &self.second
    }
}

/// Allowed number of values of one property per subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CardinalityBound {
    Min(u64),
    Max(u64),
    Exact(u64),
}

impl CardinalityBound {
    pub fn admits(&self, count: usize) -> bool {
        let count = count as u64;
        match *self {
            CardinalityBound::Min(min) => count >= min,
            CardinalityBound::Max(max) => count <= max,
            CardinalityBound::Exact(exact) => count == exact,
        }
    }
}

impl fmt::Display for CardinalityBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CardinalityBound::Min(n) => write!(f, "at least {n}"),
            CardinalityBound::Max(n) => write!(f, "at most {n}"),
            CardinalityBound::Exact(n) => write!(f, "exactly {n}"),
        }
    }
}

/// Which values of the restricted property a qualified cardinality counts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Qualifier {
    /// `owl:onClass`: resources that are instances of the class.
    Class(Resource),
    /// `owl:onDataRange`: literals that conform to the datatype.
    DataRange(Resource),
}

impl fmt::Display for Qualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Qualifier::Class(class) => write!(f, "{class}"),
            Qualifier::DataRange(datatype) => write!(f, "{datatype}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct CardinalityRestriction {
    pub property: Resource,
    pub bound: CardinalityBound,
    /// `None` counts every value.
    pub qualifier: Option<Qualifier>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    /// Values are resources (`owl:ObjectProperty`, or a class range).
    Object,
    /// Values are literals (`owl:DatatypeProperty`, or a datatype range).
    Datatype,
    Unspecified,
}

/// What the schema says about one predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDeclaration {
    pub property: Resource,
    pub kind: PropertyKind,
    pub domains: Vec<Resource>,
    /// Ranges that name classes; checked against the object's types.
    pub class_ranges: Vec<Resource>,
    /// Ranges that name datatypes; checked against literal values.
    pub datatype_ranges: Vec<Resource>,
}

const PROPERTY_TYPES: &[NamedNodeRef<'static>] = &[
    rdf::PROPERTY,
    owl::OBJECT_PROPERTY,
    owl::DATATYPE_PROPERTY,
    owl::FUNCTIONAL_PROPERTY,
];

/// Cardinality predicate, bound constructor, and whether it is qualified.
const CARDINALITY_PREDICATES: &[(NamedNodeRef<'static>, fn(u64) -> CardinalityBound, bool)] = &[
    (owl::CARDINALITY, CardinalityBound::Exact, false),
    (owl::MIN_CARDINALITY, CardinalityBound::Min, false),
    (owl::MAX_CARDINALITY, CardinalityBound::Max, false),
    (owl::QUALIFIED_CARDINALITY, CardinalityBound::Exact, true),
    (owl::MIN_QUALIFIED_CARDINALITY, CardinalityBound::Min, true),
    (owl::MAX_QUALIFIED_CARDINALITY, CardinalityBound::Max, true),
];

fn is_builtin_datatype(resource: &Resource) -> bool {
    resource.in_namespace(XSD_NS)
        || resource.is(rdfs::LITERAL)
        || resource.is(rdf::LANG_STRING)
        || resource.is(rdf::XML_LITERAL)
}

fn qualifier_of(schema: &dyn GraphStore, restriction: &Resource) -> Option<Qualifier> {
    if let Some(class) = schema
        .resource_objects_of(restriction, owl::ON_CLASS.as_str())
        .into_iter()
        .next()
    {
        return Some(Qualifier::Class(class));
    }
    schema
        .resource_objects_of(restriction, owl::ON_DATA_RANGE.as_str())
        .into_iter()
        .next()
        .map(Qualifier::DataRange)
}

fn cardinality_values(
    schema: &dyn GraphStore,
    restriction: &Resource,
    predicate: NamedNodeRef<'_>,
) -> Vec<u64> {
    schema
        .objects_of(restriction, predicate.as_str())
        .into_iter()
        .filter_map(|value| {
            let literal = value.as_literal()?;
            match literal.lexical.trim().parse::<u64>() {
                Ok(n) => Some(n),
                Err(_) => {
                    tracing::warn!(
                        restriction = %restriction,
                        predicate = predicate.as_str(),
                        value = %literal,
                        "skipping cardinality that is not a non-negative integer"
                    );
                    None
                }
            }
        })
        .collect()
}

fn sorted_unique(mut resources: Vec<Resource>) -> Vec<Resource> {
    resources.sort();
    resources.dedup();
    resources
}

/// Per-run index of schema facts.
#[derive(Debug, Default)]
pub struct SchemaIndex {
    properties: AHashMap<Resource, PropertyDeclaration>,
    disjoint: AHashSet<DisjointPair>,
    restrictions: AHashMap<Resource, Vec<CardinalityRestriction>>,
    restriction_nodes: AHashSet<Resource>,
    functional: Vec<Resource>,
    datatypes: AHashSet<Resource>,
}

impl SchemaIndex {
    pub fn build(schema: &dyn GraphStore) -> Self {
        let datatypes: AHashSet<Resource> = schema
            .subjects_with(rdf::TYPE.as_str(), &Resource::from(rdfs::DATATYPE))
            .into_iter()
            .collect();

        let mut index = Self {
            datatypes,
            ..Self::default()
        };

        index.collect_properties(schema);
        index.collect_disjointness(schema);
        index.collect_restrictions(schema);

        tracing::debug!(
            properties = index.properties.len(),
            disjoint_pairs = index.disjoint.len(),
            restrictions = index.restrictions.len(),
            functional = index.functional.len(),
            "indexed schema"
        );

        index
    }

    fn collect_properties(&mut self, schema: &dyn GraphStore) {
        let mut candidates: AHashSet<Resource> = AHashSet::new();
        for predicate in [rdfs::DOMAIN, rdfs::RANGE] {
            candidates.extend(
                schema
                    .triples_with_predicate(predicate.as_str())
                    .into_iter()
                    .map(|triple| triple.subject),
            );
        }
        for property_type in PROPERTY_TYPES {
            candidates.extend(
                schema.subjects_with(rdf::TYPE.as_str(), &Resource::from(*property_type)),
            );
        }

        for property in candidates {
            let types = schema.asserted_types(&property);
            let domains = sorted_unique(schema.declared_domains(&property));
            let declared_kind = if types.iter().any(|t| t.is(owl::DATATYPE_PROPERTY)) {
                Some(PropertyKind::Datatype)
            } else if types.iter().any(|t| t.is(owl::OBJECT_PROPERTY)) {
                Some(PropertyKind::Object)
            } else {
                None
            };

            // Every range of a datatype property names a datatype, declared
            // as one or not.
            let (datatype_ranges, class_ranges): (Vec<_>, Vec<_>) = sorted_unique(
                schema.declared_ranges(&property),
            )
            .into_iter()
            .partition(|range| {
                declared_kind == Some(PropertyKind::Datatype) || self.is_datatype(range)
            });

            let kind = if let Some(kind) = declared_kind {
                kind
            } else if !datatype_ranges.is_empty() {
                PropertyKind::Datatype
            } else if !class_ranges.is_empty() {
                PropertyKind::Object
            } else {
                PropertyKind::Unspecified
            };

            if types.iter().any(|t| t.is(owl::FUNCTIONAL_PROPERTY)) {
                self.functional.push(property.clone());
            }

            self.properties.insert(
                property.clone(),
                PropertyDeclaration {
                    property,
                    kind,
                    domains,
                    class_ranges,
                    datatype_ranges,
                },
            );
        }
        self.functional.sort();
    }

    fn collect_disjointness(&mut self, schema: &dyn GraphStore) {
        for (a, b) in schema.disjointness_assertions() {
            if let Some(pair) = DisjointPair::new(a, b) {
                self.disjoint.insert(pair);
            }
        }
    }

    fn collect_restrictions(&mut self, schema: &dyn GraphStore) {
        self.restriction_nodes
            .extend(schema.subjects_with(rdf::TYPE.as_str(), &Resource::from(owl::RESTRICTION)));

        for on_property in schema.triples_with_predicate(owl::ON_PROPERTY.as_str()) {
            let restriction = on_property.subject;
            self.restriction_nodes.insert(restriction.clone());
            let Object::Resource(property) = on_property.object else {
                continue;
            };
            let qualifier = qualifier_of(schema, &restriction);

            for (predicate, make_bound, qualified) in CARDINALITY_PREDICATES {
                let values = cardinality_values(schema, &restriction, *predicate);
                if values.is_empty() {
                    continue;
                }
                let qualifier = match (*qualified, &qualifier) {
                    (false, _) => None,
                    (true, Some(qualifier)) => Some(qualifier.clone()),
                    (true, None) => {
                        tracing::warn!(
                            restriction = %restriction,
                            predicate = predicate.as_str(),
                            "skipping qualified cardinality without owl:onClass or owl:onDataRange"
                        );
                        continue;
                    }
                };
                let restrictions = self.restrictions.entry(restriction.clone()).or_default();
                for n in values {
                    restrictions.push(CardinalityRestriction {
                        property: property.clone(),
                        bound: make_bound(n),
                        qualifier: qualifier.clone(),
                    });
                }
            }
        }
    }

    pub fn property(&self, predicate: &Resource) -> Option<&PropertyDeclaration> {
        self.properties.get(predicate)
    }

    pub fn properties(&self) -> impl Iterator<Item = &PropertyDeclaration> {
        self.properties.values()
    }

    pub fn is_datatype(&self, resource: &Resource) -> bool {
        is_builtin_datatype(resource) || self.datatypes.contains(resource)
    }

    /// Whether the schema declares `a` and `b` disjoint, in either direction.
    pub fn are_disjoint(&self, a: &Resource, b: &Resource) -> bool {
        DisjointPair::new(a.clone(), b.clone())
            .is_some_and(|pair| self.disjoint.contains(&pair))
    }

    pub fn disjoint_pair_count(&self) -> usize {
        self.disjoint.len()
    }

    /// Restrictions attached to `class` (normally a restriction node that
    /// classes reach through `rdfs:subClassOf`).
    pub fn restrictions_for(&self, class: &Resource) -> &[CardinalityRestriction] {
        self.restrictions
            .get(class)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Whether `class` is an anonymous `owl:Restriction` node rather than a
    /// named class.
    pub fn is_restriction(&self, class: &Resource) -> bool {
        self.restriction_nodes.contains(class)
    }

    pub fn has_restrictions(&self) -> bool {
        !self.restrictions.is_empty()
    }

    pub fn functional_properties(&self) -> &[Resource] {
        &self.functional
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{InputFormat, parse_graph};
    use crate::vocab::xsd;

    fn index(body: &str) -> SchemaIndex {
        let schema = parse_graph(
            &format!(
                r#"
                @prefix : <http://example.com/> .
                @prefix owl: <http://www.w3.org/2002/07/owl#> .
                @prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
                @prefix xsd: <http://www.w3.org/2001/XMLSchema#> .
                {body}
                "#
            ),
            InputFormat::Turtle,
        )
        .unwrap();
        SchemaIndex::build(&schema)
    }

    fn ex(local: &str) -> Resource {
        Resource::iri(format!("http://example.com/{local}"))
    }

    #[test]
    fn disjoint_pair_is_canonical() {
        let forward = DisjointPair::new(ex("A"), ex("B")).unwrap();
        let backward = DisjointPair::new(ex("B"), ex("A")).unwrap();
        assert_eq!(forward, backward);
        assert_eq!(forward.first(), &ex("A"));
        assert!(DisjointPair::new(ex("A"), ex("A")).is_none());
    }

    #[test]
    fn bounds_admit_counts() {
        assert!(CardinalityBound::Min(1).admits(1));
        assert!(!CardinalityBound::Min(1).admits(0));
        assert!(CardinalityBound::Max(2).admits(0));
        assert!(!CardinalityBound::Max(2).admits(3));
        assert!(CardinalityBound::Exact(1).admits(1));
        assert!(!CardinalityBound::Exact(1).admits(2));
    }

    #[test]
    fn splits_class_and_datatype_ranges() {
        let schema = index(
            r#"
            :Temp a rdfs:Datatype .
            :p rdfs:domain :A, :B ; rdfs:range :C, xsd:integer, :Temp .
            "#,
        );
        let declaration = schema.property(&ex("p")).unwrap();
        assert_eq!(declaration.domains, vec![ex("A"), ex("B")]);
        assert_eq!(declaration.class_ranges, vec![ex("C")]);
        assert_eq!(
            declaration.datatype_ranges,
            vec![ex("Temp"), xsd::INTEGER.into()]
        );
        assert_eq!(declaration.kind, PropertyKind::Datatype);
    }

    #[test]
    fn explicit_property_type_wins() {
        let schema = index(":p a owl:ObjectProperty . :q rdfs:range :C .");
        assert_eq!(schema.property(&ex("p")).unwrap().kind, PropertyKind::Object);
        assert_eq!(schema.property(&ex("q")).unwrap().kind, PropertyKind::Object);
        assert!(schema.property(&ex("unknown")).is_none());
    }

    #[test]
    fn disjointness_either_direction() {
        let schema = index(":A owl:disjointWith :B . :B owl:disjointWith :A .");
        assert!(schema.are_disjoint(&ex("A"), &ex("B")));
        assert!(schema.are_disjoint(&ex("B"), &ex("A")));
        assert!(!schema.are_disjoint(&ex("A"), &ex("A")));
        assert_eq!(schema.disjoint_pair_count(), 1);
    }

    #[test]
    fn collects_restrictions_and_functional_properties() {
        let schema = index(
            r#"
            :Person rdfs:subClassOf [
                a owl:Restriction ;
                owl:onProperty :name ;
                owl:minCardinality "1"^^xsd:nonNegativeInteger ;
                owl:maxCardinality "2"^^xsd:nonNegativeInteger
            ] .
            :ssn a owl:FunctionalProperty .
            "#,
        );
        assert!(schema.has_restrictions());
        assert_eq!(schema.functional_properties(), &[ex("ssn")]);
    }

    #[test]
    fn malformed_cardinality_is_skipped() {
        let schema = index(r#"_:r owl:onProperty :name ; owl:cardinality "many" ."#);
        assert!(!schema.has_restrictions());
    }

    #[test]
    fn datatype_property_ranges_are_datatypes() {
        let schema = index(":celsius a owl:DatatypeProperty ; rdfs:range :Celsius .");
        let declaration = schema.property(&ex("celsius")).unwrap();
        assert_eq!(declaration.kind, PropertyKind::Datatype);
        assert!(declaration.class_ranges.is_empty());
        assert_eq!(declaration.datatype_ranges, vec![ex("Celsius")]);
    }

    #[test]
    fn qualified_cardinality_keeps_its_class() {
        let schema = index(
            r#"
            :Owner rdfs:subClassOf _:r .
            _:r a owl:Restriction ;
                owl:onProperty :hasPet ;
                owl:qualifiedCardinality 1 ;
                owl:onClass :Dog .
            "#,
        );
        let restriction = schema
            .restrictions
            .keys()
            .next()
            .cloned()
            .unwrap();
        assert!(schema.is_restriction(&restriction));
        assert!(!schema.is_restriction(&ex("Owner")));
        assert_eq!(
            schema.restrictions_for(&restriction),
            &[CardinalityRestriction {
                property: ex("hasPet"),
                bound: CardinalityBound::Exact(1),
                qualifier: Some(Qualifier::Class(ex("Dog"))),
            }]
        );
    }

    #[test]
    fn qualified_cardinality_without_qualifier_is_skipped() {
        let schema = index("_:r owl:onProperty :hasPet ; owl:maxQualifiedCardinality 2 .");
        assert!(!schema.has_restrictions());
    }
}
