use crate::{
    codec::WireObject,
    predicate::PredicateFactory,
    query::order::{EntryComparator, VALUE_COMPARATOR_TYPE_ID, ValueComparator},
    request::ClusterFactory,
    value::ValueFactory,
};
use std::collections::HashMap;

///
/// Factory ids.
///
/// One id per object family. The predicate family's ids are fixed by the
/// wire contract with existing peers; the remaining ids are this client's
/// registry constants.
///

pub mod factory_id {
    pub const CLUSTER: i32 = 0;
    pub const PREDICATE: i32 = -32;
    pub const COMPARATOR: i32 = -33;
    pub const VALUE: i32 = -50;
}

///
/// WireObjectFactory
///
/// Maps a `type_id` to an empty instance ready for `read_from`.
///

pub trait WireObjectFactory {
    fn create(&self, type_id: i32) -> Option<Box<dyn WireObject>>;
}

/// Constructor for an empty comparator instance.
pub type ComparatorCtor = fn() -> Box<dyn EntryComparator>;

///
/// FactoryRegistry
///
/// Keyed by `factory_id`; each factory resolves type ids within its family.
/// Comparators live in a parallel table because trait objects cannot be
/// recovered through the concrete-type downcast path.
///

pub struct FactoryRegistry {
    objects: HashMap<i32, Box<dyn WireObjectFactory>>,
    comparators: HashMap<(i32, i32), ComparatorCtor>,
}

impl FactoryRegistry {
    /// An empty registry with no registered families.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            objects: HashMap::new(),
            comparators: HashMap::new(),
        }
    }

    /// The standard client registry: predicates, values, cluster requests,
    /// and the built-in value comparator.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register(factory_id::PREDICATE, Box::new(PredicateFactory));
        registry.register(factory_id::VALUE, Box::new(ValueFactory));
        registry.register(factory_id::CLUSTER, Box::new(ClusterFactory));
        registry.register_comparator(
            factory_id::COMPARATOR,
            VALUE_COMPARATOR_TYPE_ID,
            || Box::new(ValueComparator::default()),
        );
        registry
    }

    /// Register (or replace) the factory for one object family.
    pub fn register(&mut self, factory_id: i32, factory: Box<dyn WireObjectFactory>) {
        self.objects.insert(factory_id, factory);
    }

    /// Register (or replace) a comparator constructor for one tag pair.
    pub fn register_comparator(&mut self, factory_id: i32, type_id: i32, ctor: ComparatorCtor) {
        self.comparators.insert((factory_id, type_id), ctor);
    }

    pub(crate) fn create(&self, factory_id: i32, type_id: i32) -> Option<Box<dyn WireObject>> {
        self.objects.get(&factory_id)?.create(type_id)
    }

    pub(crate) fn create_comparator(
        &self,
        factory_id: i32,
        type_id: i32,
    ) -> Option<Box<dyn EntryComparator>> {
        self.comparators.get(&(factory_id, type_id)).map(|ctor| ctor())
    }
}

impl Default for FactoryRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl std::fmt::Debug for FactoryRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FactoryRegistry")
            .field("object_families", &self.objects.len())
            .field("comparators", &self.comparators.len())
            .finish()
    }
}

///
/// TESTS
///
