use std::hash::Hash;

use ahash::RandomState;
use hashbrown::HashMap;
use vs_core::{Name, NameRef};

pub type FastHashMap<K, V> = HashMap<K, V, RandomState>;

pub fn fast_hasher() -> RandomState {
    RandomState::with_seeds(0, 0, 0, 0)
}

pub fn fast_map_new<K: Eq + Hash, V>() -> FastHashMap<K, V> {
    HashMap::with_hasher(fast_hasher())
}

/// Borrowed lookup key for maps keyed by [`Name`]; hashes identically.
#[derive(Hash, Clone, Copy)]
pub(crate) struct NameKey<'a>(NameRef<'a>);

impl<'a> NameKey<'a> {
    pub(crate) fn new(name: &'a str) -> Self {
        NameKey(NameRef(name))
    }
}

impl indexmap::Equivalent<Name> for NameKey<'_> {
    fn equivalent(&self, key: &Name) -> bool {
        *key == self.0.0
    }
}

impl hashbrown::Equivalent<Name> for NameKey<'_> {
    fn equivalent(&self, key: &Name) -> bool {
        *key == self.0.0
    }
}
