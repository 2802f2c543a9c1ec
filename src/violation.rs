//! Violation records and the deduplicated set the engine returns.

use serde::Serialize;
use std::collections::BTreeSet;
use std::collections::btree_set;
use std::fmt;
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::model::{Resource, Triple};
use crate::schema::{CardinalityBound, DisjointPair, Qualifier};

/// Coarse classification of a [`Violation`], used for filtering and counts.
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
    Serialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    DomainMismatch,
    RangeMismatch,
    DisjointClassMembership,
    DatatypeMismatch,
    CardinalityMismatch,
}

/// One detected inconsistency between the data graph and the schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    /// The subject of `triple` is not an instance of the declared domain.
    DomainMismatch { triple: Triple, expected: Resource },
    /// The object of `triple` is not an instance of the declared range class.
    RangeMismatch { triple: Triple, expected: Resource },
    /// `resource` belongs to both classes of a disjoint pair.
    DisjointClassMembership {
        resource: Resource,
        classes: DisjointPair,
    },
    /// The literal object of `triple` is outside the declared datatype.
    DatatypeMismatch { triple: Triple, expected: Resource },
    /// `resource` uses `property` a number of times the bound does not admit.
    /// With a qualifier, only the qualifying values are counted.
    CardinalityMismatch {
        resource: Resource,
        property: Resource,
        bound: CardinalityBound,
        #[serde(skip_serializing_if = "Option::is_none")]
        qualifier: Option<Qualifier>,
        actual: usize,
    },
}

impl Violation {
    pub fn kind(&self) -> ViolationKind {
        match self {
            Violation::DomainMismatch { .. } => ViolationKind::DomainMismatch,
            Violation::RangeMismatch { .. } => ViolationKind::RangeMismatch,
            Violation::DisjointClassMembership { .. } => ViolationKind::DisjointClassMembership,
            Violation::DatatypeMismatch { .. } => ViolationKind::DatatypeMismatch,
            Violation::CardinalityMismatch { .. } => ViolationKind::CardinalityMismatch,
        }
    }

    /// The resource a reader should look at first.
    pub fn focus(&self) -> &Resource {
        match self {
            Violation::DomainMismatch { triple, .. } | Violation::DatatypeMismatch { triple, .. } => {
                &triple.subject
            }
            Violation::RangeMismatch { triple, .. } => match triple.object.as_resource() {
                Some(object) => object,
                None => &triple.subject,
            },
            Violation::DisjointClassMembership { resource, .. }
            | Violation::CardinalityMismatch { resource, .. } => resource,
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::DomainMismatch { triple, expected } => write!(
                f,
                "subject {} of `{}` is not an instance of domain {}",
                triple.subject, triple, expected
            ),
            Violation::RangeMismatch { triple, expected } => write!(
                f,
                "object {} of `{}` is not an instance of range {}",
                triple.object, triple, expected
            ),
            Violation::DisjointClassMembership { resource, classes } => write!(
                f,
                "{} is an instance of disjoint classes {} and {}",
                resource,
                classes.first(),
                classes.second()
            ),
            Violation::DatatypeMismatch { triple, expected } => write!(
                f,
                "literal {} of `{}` is not a valid {}",
                triple.object, triple, expected
            ),
            Violation::CardinalityMismatch {
                resource,
                property,
                bound,
                qualifier,
                actual,
            } => {
                write!(f, "{resource} has {actual} value(s) for {property}")?;
                if let Some(qualifier) = qualifier {
                    write!(f, " in {qualifier}")?;
                }
                write!(f, ", expected {bound}")
            }
        }
    }
}

/// Deduplicated, order-irrelevant collection of violations.
///
/// Iteration follows the structural order of [`Violation`], so printed
/// output is stable between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ViolationSet(BTreeSet<Violation>);

impl ViolationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when an equal violation was already present.
    pub fn insert(&mut self, violation: Violation) -> bool {
        self.0.insert(violation)
    }

    pub fn merge(&mut self, other: ViolationSet) {
        if self.0.len() < other.0.len() {
            let mut other = other;
            std::mem::swap(self, &mut other);
            self.0.extend(other.0);
        } else {
            self.0.extend(other.0);
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, violation: &Violation) -> bool {
        self.0.contains(violation)
    }

    pub fn iter(&self) -> btree_set::Iter<'_, Violation> {
        self.0.iter()
    }

    pub fn of_kind(&self, kind: ViolationKind) -> impl Iterator<Item = &Violation> {
        self.0.iter().filter(move |violation| violation.kind() == kind)
    }

    pub fn count_of(&self, kind: ViolationKind) -> usize {
        self.of_kind(kind).count()
    }

    /// The distinct kinds present, in kind order.
    pub fn kinds(&self) -> BTreeSet<ViolationKind> {
        self.0.iter().map(Violation::kind).collect()
    }
}

impl Extend<Violation> for ViolationSet {
    fn extend<I: IntoIterator<Item = Violation>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl FromIterator<Violation> for ViolationSet {
    fn from_iter<I: IntoIterator<Item = Violation>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for ViolationSet {
    type Item = Violation;
    type IntoIter = btree_set::IntoIter<Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ViolationSet {
    type Item = &'a Violation;
    type IntoIter = btree_set::Iter<'a, Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
