//! Graph Store capability
//!
//! The validator never touches a concrete triple index directly. Everything
//! it needs from a graph goes through [`GraphStore`]: a handful of pattern
//! primitives that an index must answer, plus the schema/data queries the
//! checkers use, which are provided on top of those primitives.
//!
//! ```text
//! GraphStore
//!     ├── triples_with_predicate   (a) property assertions
//!     ├── asserted_types           (b) rdf:type memberships
//!     ├── superclasses             (c) rdfs:subClassOf edges
//!     ├── disjointness_assertions  (d) owl:disjointWith / owl:AllDisjointClasses
//!     └── declared_domains/ranges  (e) rdfs:domain / rdfs:range
//! ```
//!
//! [`memory`] implements the trait for oxigraph's in-memory `Graph`, and
//! [`load`] parses serialized RDF into one.

pub mod load;
pub mod memory;

pub use load::{InputFormat, load_graph, load_graphs, parse_graph};

use ahash::AHashSet;

use crate::model::{Object, Resource, Triple};
use crate::vocab::{owl, rdf, rdfs};

/// Read-only triple-pattern queries over one graph.
///
/// Predicates are always IRIs, so they are passed as plain `&str`.
pub trait GraphStore: Send + Sync {
    /// All triples using `predicate`.
    fn triples_with_predicate(&self, predicate: &str) -> Vec<Triple>;

    /// Objects of `subject predicate ?o`.
    fn objects_of(&self, subject: &Resource, predicate: &str) -> Vec<Object>;

    /// Subjects of `?s predicate object`.
    fn subjects_with(&self, predicate: &str, object: &Resource) -> Vec<Resource>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resource-valued objects of `subject predicate ?o`; literals are dropped.
    fn resource_objects_of(&self, subject: &Resource, predicate: &str) -> Vec<Resource> {
        self.objects_of(subject, predicate)
            .into_iter()
            .filter_map(|object| match object {
                Object::Resource(resource) => Some(resource),
                Object::Literal(_) => None,
            })
            .collect()
    }

    fn asserted_types(&self, resource: &Resource) -> Vec<Resource> {
        self.resource_objects_of(resource, rdf::TYPE.as_str())
    }

    /// Direct superclasses of `class`. `owl:equivalentClass` counts as a
    /// subclass edge in both directions.
    fn superclasses(&self, class: &Resource) -> Vec<Resource> {
        let mut parents = self.resource_objects_of(class, rdfs::SUB_CLASS_OF.as_str());
        parents.extend(self.resource_objects_of(class, owl::EQUIVALENT_CLASS.as_str()));
        parents.extend(self.subjects_with(owl::EQUIVALENT_CLASS.as_str(), class));
        parents
    }

    /// Subjects of at least one `rdf:type` triple, each listed once.
    fn typed_resources(&self) -> Vec<Resource> {
        let mut seen = AHashSet::new();
        self.triples_with_predicate(rdf::TYPE.as_str())
            .into_iter()
            .filter_map(|triple| {
                seen.insert(triple.subject.clone())
                    .then_some(triple.subject)
            })
            .collect()
    }

    /// Every declared disjoint pair, in the direction it was written.
    ///
    /// Pairs come from `owl:disjointWith` and from every two members of an
    /// `owl:AllDisjointClasses` collection. Self pairs are kept; callers
    /// decide what to do with them.
    fn disjointness_assertions(&self) -> Vec<(Resource, Resource)> {
        let mut pairs: Vec<(Resource, Resource)> = self
            .triples_with_predicate(owl::DISJOINT_WITH.as_str())
            .into_iter()
            .filter_map(|triple| match triple.object {
                Object::Resource(other) => Some((triple.subject, other)),
                Object::Literal(_) => None,
            })
            .collect();

        let all_disjoint = Resource::from(owl::ALL_DISJOINT_CLASSES);
        for group in self.subjects_with(rdf::TYPE.as_str(), &all_disjoint) {
            for head in self.resource_objects_of(&group, owl::MEMBERS.as_str()) {
                let members: Vec<Resource> = self
                    .list_members(&head)
                    .into_iter()
                    .filter_map(|member| member.as_resource().cloned())
                    .collect();
                for (index, first) in members.iter().enumerate() {
                    for second in &members[index + 1..] {
                        pairs.push((first.clone(), second.clone()));
                    }
                }
            }
        }

        pairs
    }

    fn declared_domains(&self, predicate: &Resource) -> Vec<Resource> {
        self.resource_objects_of(predicate, rdfs::DOMAIN.as_str())
    }

    fn declared_ranges(&self, predicate: &Resource) -> Vec<Resource> {
        self.resource_objects_of(predicate, rdfs::RANGE.as_str())
    }

    /// Items of the RDF collection starting at `head`.
    ///
    /// Stops at `rdf:nil`, at a node without `rdf:first`, or when a node is
    /// revisited, so malformed or circular lists still terminate.
    fn list_members(&self, head: &Resource) -> Vec<Object> {
        let mut members = Vec::new();
        let mut visited = AHashSet::new();
        let mut current = head.clone();

        while !current.is(rdf::NIL) && visited.insert(current.clone()) {
            let Some(first) = self.objects_of(&current, rdf::FIRST.as_str()).into_iter().next() else {
                break;
            };
            members.push(first);
            match self.resource_objects_of(&current, rdf::REST.as_str()).into_iter().next() {
                Some(rest) => current = rest,
                None => break,
            }
        }

        members
    }
}

/// Read-only view over the union of two graphs.
///
/// Used for type-membership and subclass facts, which may live in either
/// the data graph or, for self-describing fixtures, the schema graph. The
/// data graph is always queried first; the schema graph only adds.
pub struct UnionView<'g> {
    primary: &'g dyn GraphStore,
    secondary: &'g dyn GraphStore,
}

impl<'g> UnionView<'g> {
    pub fn new(primary: &'g dyn GraphStore, secondary: &'g dyn GraphStore) -> Self {
        Self { primary, secondary }
    }
}

impl GraphStore for UnionView<'_> {
    fn triples_with_predicate(&self, predicate: &str) -> Vec<Triple> {
        let mut triples = self.primary.triples_with_predicate(predicate);
        triples.extend(self.secondary.triples_with_predicate(predicate));
        triples
    }

    fn objects_of(&self, subject: &Resource, predicate: &str) -> Vec<Object> {
        let mut objects = self.primary.objects_of(subject, predicate);
        objects.extend(self.secondary.objects_of(subject, predicate));
        objects
    }

    fn subjects_with(&self, predicate: &str, object: &Resource) -> Vec<Resource> {
        let mut subjects = self.primary.subjects_with(predicate, object);
        subjects.extend(self.secondary.subjects_with(predicate, object));
        subjects
    }

    fn len(&self) -> usize {
        self.primary.len() + self.secondary.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::parse_graph;

    const PREFIXES: &str = r#"
        @prefix : <http://example.com/> .
        @prefix owl: <http://www.w3.org/2002/07/owl#> .
        @prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
    "#;

    fn graph(body: &str) -> oxigraph::model::Graph {
        parse_graph(&format!("{PREFIXES}{body}"), InputFormat::Turtle).unwrap()
    }

    fn ex(local: &str) -> Resource {
        Resource::iri(format!("http://example.com/{local}"))
    }

    #[test]
    fn all_disjoint_classes_expands_to_pairs() {
        let schema = graph("[] a owl:AllDisjointClasses ; owl:members ( :A :B :C ) .");
        let mut pairs = schema.disjointness_assertions();
        pairs.sort();
        assert_eq!(
            pairs,
            vec![(ex("A"), ex("B")), (ex("A"), ex("C")), (ex("B"), ex("C"))]
        );
    }

    #[test]
    fn equivalent_class_links_both_ways() {
        let schema = graph(":A owl:equivalentClass :B .");
        assert_eq!(schema.superclasses(&ex("A")), vec![ex("B")]);
        assert_eq!(schema.superclasses(&ex("B")), vec![ex("A")]);
    }

    #[test]
    fn typed_resources_are_listed_once() {
        let data = graph(":x a :A, :B . :y a :A .");
        let mut typed = data.typed_resources();
        typed.sort();
        assert_eq!(typed, vec![ex("x"), ex("y")]);
    }

    #[test]
    fn union_view_sees_both_graphs() {
        let data = graph(":x a :A .");
        let schema = graph(":x a :B .");
        let union = UnionView::new(&data, &schema);
        let mut types = union.asserted_types(&ex("x"));
        types.sort();
        assert_eq!(types, vec![ex("A"), ex("B")]);
        assert_eq!(union.len(), 2);
    }

    #[test]
    fn empty_list_has_no_members() {
        let schema = graph("[] a owl:AllDisjointClasses ; owl:members () .");
        assert!(schema.disjointness_assertions().is_empty());
    }
}
