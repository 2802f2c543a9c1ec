//! Type-Closure Resolver
//!
//! Computes the complete set of classes a resource belongs to: its asserted
//! `rdf:type`s plus every class reachable over subclass edges. The closure is
//! an explicit worklist with a visited set, so cyclic or adversarial
//! hierarchies terminate; each class is expanded at most once.
//!
//! Results are memoized for the lifetime of the resolver, which the engine
//! scopes to a single validation run. The memo table is read-mostly and
//! shared across rayon workers.

use ahash::{AHashMap, AHashSet};
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::model::{Resource, TypeSet};
use crate::store::GraphStore;

/// Memo table counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResolverStats {
    pub cached: usize,
    pub hits: u64,
    pub misses: u64,
}

pub struct TypeResolver<'g> {
    graph: &'g dyn GraphStore,
    cache: RwLock<AHashMap<Resource, Arc<TypeSet>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<'g> TypeResolver<'g> {
    /// `graph` answers both type-membership and subclass queries; the engine
    /// passes a union of the data and schema graphs.
    pub fn new(graph: &'g dyn GraphStore) -> Self {
        Self {
            graph,
            cache: RwLock::new(AHashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// All classes `resource` is an instance of. Empty when it has no
    /// asserted type.
    pub fn types_of(&self, resource: &Resource) -> Arc<TypeSet> {
        if let Some(types) = self.cache.read().get(resource) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Arc::clone(types);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let types = Arc::new(self.resolve(resource));

        // Another worker may have resolved the same resource meanwhile; both
        // results are identical, keep whichever landed first.
        let mut cache = self.cache.write();
        Arc::clone(cache.entry(resource.clone()).or_insert(types))
    }

    fn resolve(&self, resource: &Resource) -> TypeSet {
        let mut visited: AHashSet<Resource> = AHashSet::new();
        let mut worklist: VecDeque<Resource> = VecDeque::new();

        for class in self.graph.asserted_types(resource) {
            if visited.insert(class.clone()) {
                worklist.push_back(class);
            }
        }

        while let Some(class) = worklist.pop_front() {
            for parent in self.graph.superclasses(&class) {
                if visited.insert(parent.clone()) {
                    worklist.push_back(parent);
                }
            }
        }

        visited.into_iter().collect()
    }

    pub fn stats(&self) -> ResolverStats {
        ResolverStats {
            cached: self.cache.read().len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}
