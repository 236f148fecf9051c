use std::mem;

use serde::{Serialize, Serializer};

/// A stored value together with the stamp that orders it among its peers.
#[derive(Debug)]
pub(crate) struct Entry<V> {
    pub(crate) value: V,
    pub(crate) stamp: u64,
}

impl<V> Entry<V> {
    pub(crate) fn new(value: V, stamp: u64) -> Self {
        Self { value, stamp }
    }

    /// Replace the value and move the entry to the most recent position.
    /// The old value is dropped after both fields are written.
    pub(crate) fn touch(&mut self, value: V, stamp: u64) {
        self.stamp = stamp;
        let old = mem::replace(&mut self.value, value);
        drop(old);
    }
}

// The stamp is bookkeeping only; an entry serializes as its bare value.
impl<V: Serialize> Serialize for Entry<V> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.value.serialize(serializer)
    }
}
