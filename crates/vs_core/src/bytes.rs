//! Byte buffer payload, shared until the first in-place edit.

use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

#[derive(Clone)]
pub enum Bytes {
    Shared(Rc<[u8]>),
    Mutable(Vec<u8>),
}

impl Bytes {
    pub fn new() -> Self {
        Bytes::Shared(Rc::from(&[][..]))
    }

    pub fn from_slice(bytes: &[u8]) -> Self {
        Bytes::Shared(Rc::from(bytes))
    }

    pub fn mutable(bytes: Vec<u8>) -> Self {
        Bytes::Mutable(bytes)
    }

    pub fn as_slice(&self) -> &[u8] {
        match self {
            Bytes::Shared(b) => b,
            Bytes::Mutable(b) => b,
        }
    }

    pub fn is_mutable(&self) -> bool {
        matches!(self, Bytes::Mutable(_))
    }

    pub fn make_mut(&mut self) -> &mut Vec<u8> {
        if let Bytes::Shared(b) = self {
            tracing::trace!(len = b.len(), "data copy-on-write");
            *self = Bytes::Mutable(b.to_vec());
        }
        match self {
            Bytes::Mutable(b) => b,
            Bytes::Shared(_) => unreachable!("data was promoted to mutable"),
        }
    }

    pub fn freeze(&mut self) {
        if let Bytes::Mutable(b) = self {
            let b = std::mem::take(b);
            *self = Bytes::Shared(Rc::from(b));
        }
    }

    pub fn share(&self) -> Bytes {
        match self {
            Bytes::Mutable(b) => Bytes::from_slice(b),
            Bytes::Shared(b) => Bytes::Shared(Rc::clone(b)),
        }
    }

    /// Replaces `count` bytes at `start`, clamped to the current length.
    pub fn splice(&mut self, start: usize, count: usize, with: &[u8]) {
        let len = self.len();
        let from = start.min(len);
        let to = from + count.min(len - from);
        self.make_mut().splice(from..to, with.iter().copied());
    }
}

impl Default for Bytes {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for Bytes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl PartialEq for Bytes {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl Eq for Bytes {}

impl fmt::Debug for Bytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bytes({:?})", self.as_slice())
    }
}

impl From<Vec<u8>> for Bytes {
    fn from(b: Vec<u8>) -> Self {
        Bytes::Shared(Rc::from(b))
    }
}

impl From<&[u8]> for Bytes {
    fn from(b: &[u8]) -> Self {
        Bytes::from_slice(b)
    }
}
