//! Value types shared by the store, the resolver and the checkers.
//!
//! Resources are cheap to clone: identifiers live behind an `Arc<str>` so a
//! resource handed from the store to a violation record is a reference
//! copy, not a string copy.

use oxigraph::model::NamedNodeRef;
use serde::{Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::vocab::{rdf, xsd};

/// An IRI or blank node naming an individual, class or property.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Resource {
    Iri(Arc<str>),
    Blank(Arc<str>),
}

impl Resource {
    pub fn iri(iri: impl AsRef<str>) -> Self {
        Resource::Iri(Arc::from(iri.as_ref()))
    }

    pub fn blank(id: impl AsRef<str>) -> Self {
        Resource::Blank(Arc::from(id.as_ref()))
    }

    /// Identifier without the `<>` or `_:` decoration.
    pub fn as_str(&self) -> &str {
        match self {
            Resource::Iri(iri) => iri,
            Resource::Blank(id) => id,
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, Resource::Blank(_))
    }

    /// True when this resource is the vocabulary term `term`.
    pub fn is(&self, term: NamedNodeRef<'_>) -> bool {
        matches!(self, Resource::Iri(own) if &**own == term.as_str())
    }

    pub fn in_namespace(&self, namespace: &str) -> bool {
        matches!(self, Resource::Iri(own) if own.starts_with(namespace))
    }
}

impl From<NamedNodeRef<'_>> for Resource {
    fn from(term: NamedNodeRef<'_>) -> Self {
        Resource::iri(term.as_str())
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::Iri(iri) => write!(f, "<{iri}>"),
            Resource::Blank(id) => write!(f, "_:{id}"),
        }
    }
}

impl Serialize for Resource {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A literal value as written in the graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Literal {
    pub lexical: Arc<str>,
    pub datatype: Resource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<Arc<str>>,
}

impl Literal {
    pub fn simple(lexical: impl AsRef<str>) -> Self {
        Self::typed(lexical, xsd::STRING.into())
    }

    pub fn typed(lexical: impl AsRef<str>, datatype: Resource) -> Self {
        Self {
            lexical: Arc::from(lexical.as_ref()),
            datatype,
            language: None,
        }
    }

    pub fn language_tagged(lexical: impl AsRef<str>, language: impl AsRef<str>) -> Self {
        Self {
            lexical: Arc::from(lexical.as_ref()),
            datatype: rdf::LANG_STRING.into(),
            language: Some(Arc::from(language.as_ref())),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", &*self.lexical)?;
        match &self.language {
            Some(language) => write!(f, "@{language}"),
            None if self.datatype.is(xsd::STRING) => Ok(()),
            None => write!(f, "^^{}", self.datatype),
        }
    }
}

/// Object position of a triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum Object {
    Resource(Resource),
    Literal(Literal),
}

impl Object {
    pub fn as_resource(&self) -> Option<&Resource> {
        match self {
            Object::Resource(resource) => Some(resource),
            Object::Literal(_) => None,
        }
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Object::Literal(literal) => Some(literal),
            Object::Resource(_) => None,
        }
    }
}

impl From<Resource> for Object {
    fn from(resource: Resource) -> Self {
        Object::Resource(resource)
    }
}

impl From<Literal> for Object {
    fn from(literal: Literal) -> Self {
        Object::Literal(literal)
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Object::Resource(resource) => resource.fmt(f),
            Object::Literal(literal) => literal.fmt(f),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Triple {
    pub subject: Resource,
    pub predicate: Resource,
    pub object: Object,
}

impl Triple {
    pub fn new(subject: Resource, predicate: Resource, object: impl Into<Object>) -> Self {
        Self {
            subject,
            predicate,
            object: object.into(),
        }
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} .", self.subject, self.predicate, self.object)
    }
}

/// Every class a resource belongs to, asserted or inferred.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeSet(BTreeSet<Resource>);

impl TypeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, class: Resource) -> bool {
        self.0.insert(class)
    }

    pub fn contains(&self, class: &Resource) -> bool {
        self.0.contains(class)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Classes in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = &Resource> {
        self.0.iter()
    }
}

impl FromIterator<Resource> for TypeSet {
    fn from_iter<I: IntoIterator<Item = Resource>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
