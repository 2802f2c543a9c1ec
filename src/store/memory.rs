//! [`GraphStore`] over oxigraph's in-memory [`Graph`].

use oxigraph::model::{BlankNodeRef, Graph, NamedNodeRef, NamedOrBlankNodeRef, TermRef};

use super::GraphStore;
use crate::model::{Literal, Object, Resource, Triple};

pub(crate) fn resource_from_node(node: NamedOrBlankNodeRef<'_>) -> Resource {
    match node {
        NamedOrBlankNodeRef::NamedNode(node) => Resource::iri(node.as_str()),
        NamedOrBlankNodeRef::BlankNode(node) => Resource::blank(node.as_str()),
    }
}

/// Converts an oxigraph term. Quoted triples have no counterpart and yield `None`.
pub(crate) fn object_from_term(term: TermRef<'_>) -> Option<Object> {
    match term {
        TermRef::NamedNode(node) => Some(Object::Resource(Resource::iri(node.as_str()))),
        TermRef::BlankNode(node) => Some(Object::Resource(Resource::blank(node.as_str()))),
        TermRef::Literal(literal) => Some(Object::Literal(match literal.language() {
            Some(language) => Literal::language_tagged(literal.value(), language),
            None => Literal::typed(literal.value(), Resource::iri(literal.datatype().as_str())),
        })),
        #[allow(unreachable_patterns)]
        _ => None,
    }
}

fn node_ref(resource: &Resource) -> NamedOrBlankNodeRef<'_> {
    match resource {
        Resource::Iri(iri) => NamedOrBlankNodeRef::NamedNode(NamedNodeRef::new_unchecked(iri)),
        Resource::Blank(id) => NamedOrBlankNodeRef::BlankNode(BlankNodeRef::new_unchecked(id)),
    }
}

fn term_ref(resource: &Resource) -> TermRef<'_> {
    match resource {
        Resource::Iri(iri) => TermRef::NamedNode(NamedNodeRef::new_unchecked(iri)),
        Resource::Blank(id) => TermRef::BlankNode(BlankNodeRef::new_unchecked(id)),
    }
}

impl GraphStore for Graph {
    fn triples_with_predicate(&self, predicate: &str) -> Vec<Triple> {
        let predicate_ref = NamedNodeRef::new_unchecked(predicate);
        let predicate = Resource::iri(predicate);
        self.triples_for_predicate(predicate_ref)
            .filter_map(|triple| {
                Some(Triple {
                    subject: resource_from_node(triple.subject),
                    predicate: predicate.clone(),
                    object: object_from_term(triple.object)?,
                })
            })
            .collect()
    }

    fn objects_of(&self, subject: &Resource, predicate: &str) -> Vec<Object> {
        self.objects_for_subject_predicate(node_ref(subject), NamedNodeRef::new_unchecked(predicate))
            .filter_map(object_from_term)
            .collect()
    }

    fn subjects_with(&self, predicate: &str, object: &Resource) -> Vec<Resource> {
        self.subjects_for_predicate_object(NamedNodeRef::new_unchecked(predicate), term_ref(object))
            .map(resource_from_node)
            .collect()
    }

    fn len(&self) -> usize {
        Graph::len(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{InputFormat, parse_graph};
    use crate::vocab::xsd;

    fn sample() -> Graph {
        parse_graph(
            r#"
            @prefix : <http://example.com/> .
            @prefix xsd: <http://www.w3.org/2001/XMLSchema#> .
            :alice :knows :bob, _:someone ;
                :age "42"^^xsd:integer ;
                :name "Alice"@en .
            "#,
            InputFormat::Turtle,
        )
        .unwrap()
    }

    #[test]
    fn converts_literals_with_datatype_and_language() {
        let graph = sample();
        let alice = Resource::iri("http://example.com/alice");

        let ages = graph.objects_of(&alice, "http://example.com/age");
        assert_eq!(
            ages,
            vec![Object::Literal(Literal::typed("42", xsd::INTEGER.into()))]
        );

        let names = graph.objects_of(&alice, "http://example.com/name");
        assert_eq!(names, vec![Object::Literal(Literal::language_tagged("Alice", "en"))]);
    }

    #[test]
    fn blank_node_objects_stay_blank() {
        let graph = sample();
        let knows = graph.triples_with_predicate("http://example.com/knows");
        assert_eq!(knows.len(), 2);
        assert!(
            knows
                .iter()
                .any(|triple| matches!(&triple.object, Object::Resource(r) if r.is_blank()))
        );
    }

    #[test]
    fn subjects_of_predicate_object() {
        let graph = sample();
        let bob = Resource::iri("http://example.com/bob");
        assert_eq!(
            graph.subjects_with("http://example.com/knows", &bob),
            vec![Resource::iri("http://example.com/alice")]
        );
        assert_eq!(GraphStore::len(&graph), 4);
    }

    #[test]
    fn unknown_subject_has_no_objects() {
        let graph = sample();
        let nobody = Resource::iri("http://example.com/nobody");
        assert!(graph.objects_of(&nobody, "http://example.com/knows").is_empty());
    }
}
