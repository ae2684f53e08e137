//! Identity cache for one transformation run
//!
//! Maps an (object identity, declared type) pair to the ID the run assigned to
//! it. Identity is the object's arena handle, never its contents: two equal
//! but distinct objects get two IDs, and one object seen under two declared
//! types gets two IDs as well.
//!
//! Rules check [`ObjectGraphCache::get_id`] before calling
//! [`ObjectGraphCache::add_object`]. Returning the existing ID instead of
//! descending again is what terminates cycles.

use crate::graph::ObjectId;
use crate::types::TypeName;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

/// Engine-assigned identifier of an emitted node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Id(u64);

impl Id {
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Run-scoped map from (object, declared type) to assigned ID
#[derive(Debug, Default)]
pub struct ObjectGraphCache {
    ids: HashMap<(ObjectId, TypeName), Id>,
    next: u64,
}

impl ObjectGraphCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the pair already received an ID in this run
    pub fn exists_object(&self, object: ObjectId, declared_type: &TypeName) -> bool {
        self.ids.contains_key(&(object, declared_type.clone()))
    }

    /// The ID previously assigned to the pair
    ///
    /// `None` means the pair was never added; rules must treat that as "not
    /// yet visited" and call [`add_object`](Self::add_object).
    pub fn get_id(&self, object: ObjectId, declared_type: &TypeName) -> Option<Id> {
        self.ids.get(&(object, declared_type.clone())).copied()
    }

    /// Assign a fresh ID to the pair
    ///
    /// Not idempotent: adding the same pair twice allocates two IDs and the
    /// later one replaces the earlier in the map.
    pub fn add_object(&mut self, object: ObjectId, declared_type: &TypeName) -> Id {
        self.next += 1;
        let id = Id(self.next);
        debug!(%object, declared_type = %declared_type, %id, "assigned id");
        self.ids.insert((object, declared_type.clone()), id);
        id
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn string() -> TypeName {
        TypeName::from("string")
    }

    #[test]
    fn test_add_then_lookup() {
        let mut cache = ObjectGraphCache::new();
        let object = ObjectId::new(0);
        assert!(!cache.exists_object(object, &string()));
        assert_eq!(cache.get_id(object, &string()), None);

        let id = cache.add_object(object, &string());
        assert!(cache.exists_object(object, &string()));
        assert_eq!(cache.get_id(object, &string()), Some(id));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_ids_are_monotonic_from_one() {
        let mut cache = ObjectGraphCache::new();
        let first = cache.add_object(ObjectId::new(3), &string());
        let second = cache.add_object(ObjectId::new(7), &string());
        assert_eq!(first.to_string(), "1");
        assert_eq!(second.to_string(), "2");
    }

    #[test]
    fn test_declared_type_is_part_of_identity() {
        let mut cache = ObjectGraphCache::new();
        let object = ObjectId::new(0);
        let as_string = cache.add_object(object, &string());
        let as_other = cache.add_object(object, &TypeName::from("Name"));
        assert_ne!(as_string, as_other);
        assert_eq!(cache.get_id(object, &string()), Some(as_string));
    }

    #[test]
    fn test_add_object_is_not_idempotent() {
        let mut cache = ObjectGraphCache::new();
        let object = ObjectId::new(0);
        let first = cache.add_object(object, &string());
        let second = cache.add_object(object, &string());
        assert_ne!(first, second);
        assert_eq!(cache.get_id(object, &string()), Some(second));
        assert_eq!(cache.len(), 1);
    }
}
