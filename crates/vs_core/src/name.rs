//! Case-preserving, case-insensitive names used for variables and array keys.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// Simple lowercase fold of a single character.
#[inline]
pub fn fold_char(c: char) -> char {
    if c.is_ascii() {
        c.to_ascii_lowercase()
    } else {
        c.to_lowercase().next().unwrap_or(c)
    }
}

pub fn eq_ignore_case(a: &str, b: &str) -> bool {
    if a.is_ascii() && b.is_ascii() {
        return a.eq_ignore_ascii_case(b);
    }
    a.chars().map(fold_char).eq(b.chars().map(fold_char))
}

/// Additive case-insensitive hash: `h = h + (h << 3) + lower(c)`.
pub fn key_hash(s: &str) -> u32 {
    s.chars().fold(0u32, |h, c| {
        h.wrapping_add(h << 3).wrapping_add(fold_char(c) as u32)
    })
}

#[derive(Clone)]
pub struct Name(Rc<str>);

impl Name {
    pub fn new(s: &str) -> Self {
        Name(Rc::from(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Exact (case-sensitive) comparison.
    pub fn same_spelling(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq for Name {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0) || eq_ignore_case(&self.0, &other.0)
    }
}

impl Eq for Name {}

impl PartialEq<str> for Name {
    fn eq(&self, other: &str) -> bool {
        eq_ignore_case(&self.0, other)
    }
}

impl PartialEq<&str> for Name {
    fn eq(&self, other: &&str) -> bool {
        eq_ignore_case(&self.0, other)
    }
}

impl Hash for Name {
    fn hash<H: Hasher>(&self, state: &mut H) {
        NameRef(&self.0).hash(state)
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Name {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Name {
    fn from(s: &str) -> Self {
        Name::new(s)
    }
}

impl From<String> for Name {
    fn from(s: String) -> Self {
        Name(Rc::from(s))
    }
}

/// Borrowed form of [`Name`] with the same hashing and equality, for
/// allocation-free lookups.
#[derive(Clone, Copy, Debug)]
pub struct NameRef<'a>(pub &'a str);

impl Hash for NameRef<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for c in self.0.chars() {
            state.write_u32(fold_char(c) as u32);
        }
        state.write_u8(0xff);
    }
}

impl PartialEq for NameRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        eq_ignore_case(self.0, other.0)
    }
}

impl Eq for NameRef<'_> {}
