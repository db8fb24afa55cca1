//! Associative arrays with case-insensitive keys.
//!
//! Entries live in power-of-two sized buckets of chained entries selected by
//! [`key_hash`]. Alongside the table the array tracks numeric extents so that
//! matrix-style operations can check their shape without a scan.

mod arith;
mod delimited;
mod extent;
mod matrix;
mod setops;

use std::cmp::Ordering;
use std::fmt;

use crate::convert::parse_index;
use crate::name::{Name, eq_ignore_case, key_hash};
use crate::value::Value;

pub use arith::{ArithOp, Operand, Reduction};
pub use extent::{Extent, Extents, KeyIndices, key_indices};

use extent::ExtentState;

pub const TABLE_SIZE: usize = 8;

#[derive(Clone)]
struct Entry {
    hash: u32,
    key: Name,
    value: Value,
}

#[derive(Clone)]
pub struct Array {
    buckets: Vec<Vec<Entry>>,
    count: usize,
    key_bytes: usize,
    extents: ExtentState,
}

impl Array {
    pub fn new() -> Self {
        Self::with_table_size(TABLE_SIZE)
    }

    /// `size` is rounded up to a power of two.
    pub fn with_table_size(size: usize) -> Self {
        let size = size.max(1).next_power_of_two();
        Self {
            buckets: (0..size).map(|_| Vec::new()).collect(),
            count: 0,
            key_bytes: 0,
            extents: ExtentState::Empty,
        }
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn table_size(&self) -> usize {
        self.buckets.len()
    }

    /// Total byte length of all keys.
    pub fn key_bytes(&self) -> usize {
        self.key_bytes
    }

    #[inline]
    fn bucket_of(&self, hash: u32) -> usize {
        hash as usize & (self.buckets.len() - 1)
    }

    fn find(&self, key: &str) -> Option<(usize, usize)> {
        let hash = key_hash(key);
        let bucket = self.bucket_of(hash);
        self.buckets[bucket]
            .iter()
            .position(|e| e.hash == hash && eq_ignore_case(e.key.as_str(), key))
            .map(|slot| (bucket, slot))
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.find(key).is_some()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.find(key)
            .map(|(b, s)| &self.buckets[b][s].value)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        let (b, s) = self.find(key)?;
        Some(&mut self.buckets[b][s].value)
    }

    /// Finds `key`, creating an entry holding `None` when absent and
    /// `create` is set.
    pub fn lookup(&mut self, key: &str, create: bool) -> Option<&mut Value> {
        if let Some((b, s)) = self.find(key) {
            return Some(&mut self.buckets[b][s].value);
        }
        if !create {
            return None;
        }
        let (b, s) = self.create(Name::new(key), Value::None);
        Some(&mut self.buckets[b][s].value)
    }

    /// The value slot for `key`, created empty if absent. The stored key
    /// keeps the spelling of the first insertion.
    pub fn entry(&mut self, key: &Name) -> &mut Value {
        let (b, s) = match self.find(key.as_str()) {
            Some(pos) => pos,
            None => self.create(key.clone(), Value::None),
        };
        &mut self.buckets[b][s].value
    }

    /// Stores `value` under `key`, returning the previous value.
    pub fn insert(&mut self, key: impl Into<Name>, value: Value) -> Option<Value> {
        let key = key.into();
        match self.find(key.as_str()) {
            Some((b, s)) => Some(std::mem::replace(&mut self.buckets[b][s].value, value)),
            None => {
                self.create(key, value);
                None
            }
        }
    }

    fn create(&mut self, key: Name, value: Value) -> (usize, usize) {
        self.extents.note_insert(key.as_str());
        self.key_bytes += key.len();
        self.count += 1;
        if self.count > self.buckets.len() {
            self.grow();
        }
        let hash = key_hash(key.as_str());
        let bucket = self.bucket_of(hash);
        let chain = &mut self.buckets[bucket];
        chain.push(Entry { hash, key, value });
        (bucket, chain.len() - 1)
    }

    fn grow(&mut self) {
        let new_size = self.buckets.len() * 2;
        tracing::debug!(from = self.buckets.len(), to = new_size, "array table resize");
        let old = std::mem::replace(
            &mut self.buckets,
            (0..new_size).map(|_| Vec::new()).collect(),
        );
        for entry in old.into_iter().flatten() {
            let bucket = self.bucket_of(entry.hash);
            self.buckets[bucket].push(entry);
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let (b, s) = self.find(key)?;
        let entry = self.buckets[b].swap_remove(s);
        self.count -= 1;
        self.key_bytes -= entry.key.len();
        self.extents = if self.count == 0 {
            ExtentState::Empty
        } else {
            ExtentState::Stale
        };
        Some(entry.value)
    }

    pub fn clear(&mut self) {
        for chain in &mut self.buckets {
            chain.clear();
        }
        self.count = 0;
        self.key_bytes = 0;
        self.extents = ExtentState::Empty;
    }

    /// Entries in table order. The borrow prevents mutation mid-iteration;
    /// take [`Array::keys`] first when the table must change while walking.
    pub fn iter(&self) -> impl Iterator<Item = (&Name, &Value)> + '_ {
        self.buckets
            .iter()
            .flatten()
            .map(|e| (&e.key, &e.value))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&Name, &mut Value)> + '_ {
        self.buckets
            .iter_mut()
            .flatten()
            .map(|e| (&e.key, &mut e.value))
    }

    pub fn keys(&self) -> Vec<Name> {
        self.iter().map(|(k, _)| k.clone()).collect()
    }

    /// Entries ordered by [`compare_keys`].
    pub fn sorted_entries(&self) -> Vec<(&Name, &Value)> {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_by(|a, b| compare_keys(a.0.as_str(), b.0.as_str()));
        entries
    }

    pub fn is_nested(&self) -> bool {
        self.iter().any(|(_, v)| v.is_array())
    }

    /// Per-dimension bounds, or `None` when the keys are not all index
    /// tuples of one arity.
    pub fn extents(&self) -> Option<Extents> {
        match &self.extents {
            ExtentState::Numeric(e) => Some(e.clone()),
            ExtentState::Stale => match self.rebuilt_extents() {
                ExtentState::Numeric(e) => Some(e),
                _ => None,
            },
            ExtentState::Empty | ExtentState::NonNumeric => None,
        }
    }

    fn rebuilt_extents(&self) -> ExtentState {
        ExtentState::rebuild(self.iter().map(|(k, _)| k.as_str()))
    }

    /// Recomputes cached extents after removals.
    pub fn refresh_extents(&mut self) {
        if self.extents == ExtentState::Stale {
            self.extents = self.rebuilt_extents();
        }
    }

    pub fn dimensions(&self) -> usize {
        self.extents().map_or(0, |e| e.len())
    }

    /// True unless the keys fill the whole box bounded by the extents.
    pub fn has_missing_elements(&self) -> bool {
        match self.extents() {
            Some(extents) => {
                let cells = extents
                    .iter()
                    .fold(1u64, |acc, e| acc.saturating_mul(e.size()));
                cells != self.count as u64
            }
            None => true,
        }
    }

    /// Dense index-keyed array.
    pub fn is_numeric(&self) -> bool {
        !self.has_missing_elements()
    }

    /// Keys are exactly `1..=len`, written without leading zeros.
    pub fn is_sequence(&self) -> bool {
        match self.extents() {
            Some(e) if e.len() == 1 => {
                e[0].min == 1
                    && e[0].max as usize == self.count
                    && self.iter().all(|(k, _)| !k.as_str().starts_with('0'))
            }
            _ => false,
        }
    }

    /// One `min,max` line per dimension; empty when not numeric.
    pub fn extents_text(&self) -> String {
        let Some(extents) = self.extents() else {
            return String::new();
        };
        extents
            .iter()
            .map(|e| format!("{},{}", e.min, e.max))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Index keys sort numerically before every other key; other keys compare
/// by their bytes.
pub fn compare_keys(a: &str, b: &str) -> Ordering {
    match (parse_index(a), parse_index(b)) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

impl Default for Array {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Array {
    fn eq(&self, other: &Self) -> bool {
        self.count == other.count
            && self
                .iter()
                .all(|(k, v)| other.get(k.as_str()).is_some_and(|o| o == v))
    }
}

impl fmt::Debug for Array {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.sorted_entries()).finish()
    }
}

impl<K: Into<Name>, V: Into<Value>> FromIterator<(K, V)> for Array {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut array = Array::new();
        for (k, v) in iter {
            array.insert(k, v.into());
        }
        array
    }
}
