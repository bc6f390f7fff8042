//! Real-time position pipeline: catalog → driver → buffer → {store, detector}.

pub mod buffer;
pub mod closest;
pub mod driver;
pub mod lod;
pub mod store;

use std::collections::HashMap;

use bevy::prelude::*;

use crate::data::{ObjectId, TrackedObject};

pub use buffer::{PositionBuffer, PositionLookup, PositionSample};
pub use closest::{find_closest, CadenceGate, Closest, ClosestResult, ClosestTracker};
pub use driver::{propagate_object, PropagationDriver, TickReport};
pub use store::{ObservableStore, ObservedState, SubscriptionId, SyncThrottle};

/// The session's tracked objects in catalog order. Slots are stable until
/// the next [`Catalog::replace`].
#[derive(Resource, Debug, Default)]
pub struct Catalog {
    objects: Vec<TrackedObject>,
    index: HashMap<ObjectId, usize>,
    generation: u64,
}

impl Catalog {
    pub fn new(objects: Vec<TrackedObject>) -> Self {
        let mut catalog = Self::default();
        catalog.replace(objects);
        catalog
    }

    /// Swap in a new snapshot. Duplicate ids keep their first slot.
    pub fn replace(&mut self, objects: Vec<TrackedObject>) {
        self.index.clear();
        for (slot, object) in objects.iter().enumerate() {
            self.index.entry(object.id).or_insert(slot);
        }
        self.objects = objects;
        self.generation += 1;
    }

    pub fn objects(&self) -> &[TrackedObject] {
        &self.objects
    }

    pub fn get(&self, id: ObjectId) -> Option<&TrackedObject> {
        self.slot_of(id).map(|slot| &self.objects[slot])
    }

    pub fn slot_of(&self, id: ObjectId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Bumped by every `replace`.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::OrbitalElements;

    fn object(id: u64, name: &str) -> TrackedObject {
        TrackedObject {
            id: ObjectId(id),
            name: name.to_string(),
            elements: OrbitalElements::new("1", "2"),
            classification: None,
        }
    }

    #[test]
    fn replace_reindexes_and_bumps_generation() {
        let mut catalog = Catalog::new(vec![object(5, "a"), object(9, "b")]);
        assert_eq!(catalog.slot_of(ObjectId(9)), Some(1));
        assert_eq!(catalog.generation(), 1);

        catalog.replace(vec![object(9, "b")]);
        assert_eq!(catalog.slot_of(ObjectId(9)), Some(0));
        assert!(!catalog.contains(ObjectId(5)));
        assert_eq!(catalog.generation(), 2);
        assert_eq!(catalog.get(ObjectId(9)).unwrap().name, "b");
    }
}
