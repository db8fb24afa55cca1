//! Numeric extent tracking for arrays keyed by `n[,n...]` indices.

use smallvec::SmallVec;

use crate::convert::parse_index;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Extent {
    pub min: u32,
    pub max: u32,
}

impl Extent {
    pub fn size(&self) -> u64 {
        (self.max - self.min) as u64 + 1
    }
}

pub type Extents = SmallVec<[Extent; 2]>;
pub type KeyIndices = SmallVec<[u32; 2]>;

/// Splits a key on commas; every component must be a non-negative integer.
pub fn key_indices(key: &str) -> Option<KeyIndices> {
    if key.is_empty() {
        return None;
    }
    key.split(',').map(parse_index).collect()
}

#[derive(Clone, Debug, PartialEq, Default)]
pub(crate) enum ExtentState {
    /// No entries yet.
    #[default]
    Empty,
    /// Some key is not an index tuple of the established arity.
    NonNumeric,
    /// A removal happened; recompute before use.
    Stale,
    Numeric(Extents),
}

impl ExtentState {
    pub(crate) fn note_insert(&mut self, key: &str) {
        match self {
            ExtentState::Empty => {
                *self = match key_indices(key) {
                    Some(ix) => ExtentState::Numeric(
                        ix.iter().map(|&i| Extent { min: i, max: i }).collect(),
                    ),
                    None => ExtentState::NonNumeric,
                };
            }
            ExtentState::Numeric(extents) => match key_indices(key) {
                Some(ix) if ix.len() == extents.len() => {
                    for (extent, i) in extents.iter_mut().zip(ix) {
                        extent.min = extent.min.min(i);
                        extent.max = extent.max.max(i);
                    }
                }
                _ => *self = ExtentState::NonNumeric,
            },
            ExtentState::NonNumeric | ExtentState::Stale => {}
        }
    }

    pub(crate) fn rebuild<'a>(keys: impl Iterator<Item = &'a str>) -> ExtentState {
        let mut state = ExtentState::Empty;
        for key in keys {
            state.note_insert(key);
            if state == ExtentState::NonNumeric {
                break;
            }
        }
        state
    }
}
