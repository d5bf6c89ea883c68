use crate::error::RuntimeError;
use dashmap::DashMap;
use std::any::{Any, TypeId};
use std::sync::Arc;

/// User-supplied conversion between a domain value and its string form.
pub trait TypeAdapter<T>: Send + Sync {
    fn serialize(&self, value: &T) -> String;
    fn deserialize(&self, raw: &str) -> Result<T, RuntimeError>;
}

/// Construct-once store of adapter instances, keyed by adapter type.
///
/// Owned by the generated adapter factory; without a configured factory,
/// generated code constructs a fresh adapter at every use site and this
/// cache is not involved.
#[derive(Default)]
pub struct AdapterCache {
    entries: DashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl AdapterCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_create<A, F>(&self, make: F) -> Arc<A>
    where
        A: Any + Send + Sync,
        F: FnOnce() -> A,
    {
        let entry = self
            .entries
            .entry(TypeId::of::<A>())
            .or_insert_with(|| Arc::new(make()) as Arc<dyn Any + Send + Sync>)
            .clone();
        entry
            .downcast::<A>()
            .ok()
            .expect("adapter cache entry type")
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
