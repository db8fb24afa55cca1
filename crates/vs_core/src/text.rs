//! Text payload with small string optimization and explicit mutability.
//!
//! A `Text` is either immutable (`Inline` or `Shared`) or uniquely owned and
//! growable (`Mutable`). Immutable text is cheap to clone; the first in-place
//! edit goes through [`Text::make_mut`], which is the only place a shared
//! buffer is copied.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::rc::Rc;
use std::str;

pub const INLINE_CAP: usize = 22;

#[derive(Clone)]
pub enum Text {
    Inline { len: u8, buf: [u8; INLINE_CAP] },
    Shared(Rc<str>),
    Mutable(String),
}

impl Text {
    pub fn new() -> Self {
        Self::Inline {
            len: 0,
            buf: [0u8; INLINE_CAP],
        }
    }

    pub fn from_str(s: &str) -> Self {
        if s.len() <= INLINE_CAP {
            let mut buf = [0u8; INLINE_CAP];
            buf[..s.len()].copy_from_slice(s.as_bytes());
            return Self::Inline {
                len: s.len() as u8,
                buf,
            };
        }
        Self::Shared(Rc::from(s))
    }

    /// Immutable text taking the contents of `s`.
    pub fn from_string(s: String) -> Self {
        if s.len() <= INLINE_CAP {
            return Self::from_str(&s);
        }
        Self::Shared(Rc::from(s))
    }

    /// Uniquely owned, growable text.
    pub fn mutable(s: String) -> Self {
        Self::Mutable(s)
    }

    /// Decodes native (Latin-1) bytes.
    pub fn from_native(bytes: &[u8]) -> Self {
        if bytes.is_ascii() {
            // ASCII is valid UTF-8 byte-for-byte.
            return Self::from_str(str::from_utf8(bytes).unwrap_or_default());
        }
        Self::from_string(bytes.iter().map(|&b| b as char).collect())
    }

    pub fn as_str(&self) -> &str {
        match self {
            Text::Inline { len, buf } => {
                let s = &buf[..*len as usize];
                // SAFETY: inline bytes are always copied from a `&str`.
                unsafe { str::from_utf8_unchecked(s) }
            }
            Text::Shared(data) => data,
            Text::Mutable(data) => data.as_str(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Text::Inline { len, .. } => *len as usize,
            Text::Shared(data) => data.len(),
            Text::Mutable(data) => data.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of Unicode characters (not bytes)
    pub fn char_count(&self) -> usize {
        let s = self.as_str();
        if s.is_ascii() { s.len() } else { s.chars().count() }
    }

    #[inline]
    pub fn is_mutable(&self) -> bool {
        matches!(self, Text::Mutable(_))
    }

    /// True when every character fits the native single-byte encoding.
    pub fn is_native(&self) -> bool {
        let s = self.as_str();
        s.is_ascii() || s.chars().all(|c| (c as u32) <= 0xFF)
    }

    /// Native (Latin-1) bytes; characters outside the encoding become `?`.
    pub fn to_native_bytes(&self) -> Vec<u8> {
        let s = self.as_str();
        if s.is_ascii() {
            return s.as_bytes().to_vec();
        }
        s.chars()
            .map(|c| if (c as u32) <= 0xFF { c as u32 as u8 } else { b'?' })
            .collect()
    }

    /// Returns the growable buffer, copying immutable contents first.
    pub fn make_mut(&mut self) -> &mut String {
        if !self.is_mutable() {
            tracing::trace!(len = self.len(), "text copy-on-write");
            *self = Text::Mutable(self.as_str().to_owned());
        }
        match self {
            Text::Mutable(s) => s,
            _ => unreachable!("text was promoted to mutable"),
        }
    }

    /// Turns a mutable buffer back into immutable text without copying twice.
    pub fn freeze(&mut self) {
        if let Text::Mutable(s) = self {
            let s = std::mem::take(s);
            *self = Text::from_string(s);
        }
    }

    /// An immutable copy that can be handed to other owners.
    pub fn share(&self) -> Text {
        match self {
            Text::Mutable(s) => Text::from_str(s),
            other => other.clone(),
        }
    }

    pub fn into_string(self) -> String {
        match self {
            Text::Inline { .. } => self.as_str().to_owned(),
            Text::Shared(data) => data.as_ref().to_owned(),
            Text::Mutable(s) => s,
        }
    }

    pub fn push_str(&mut self, s: &str) {
        if s.is_empty() && self.is_mutable() {
            return;
        }
        self.make_mut().push_str(s);
    }

    pub fn prepend_str(&mut self, s: &str) {
        self.make_mut().insert_str(0, s);
    }

    /// Replaces `count` characters starting at character `start`, clamped to
    /// the current length.
    pub fn replace_chars(&mut self, start: usize, count: usize, with: &str) {
        let s = self.as_str();
        let from = char_to_byte(s, start);
        let to = from + char_to_byte(&s[from..], count);
        self.make_mut().replace_range(from..to, with);
    }
}

fn char_to_byte(s: &str, chars: usize) -> usize {
    if s.is_ascii() {
        return chars.min(s.len());
    }
    s.char_indices().nth(chars).map(|(i, _)| i).unwrap_or(s.len())
}

impl Default for Text {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for Text {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.as_str()
    }
}

impl AsRef<str> for Text {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl PartialEq for Text {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for Text {}

impl PartialEq<str> for Text {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for Text {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl Hash for Text {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state)
    }
}

impl fmt::Debug for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

impl fmt::Display for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Text {
    fn from(s: &str) -> Self {
        Text::from_str(s)
    }
}

impl From<String> for Text {
    fn from(s: String) -> Self {
        Text::from_string(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replace_chars_counts_characters_not_bytes() {
        let mut t = Text::from_str("héllo");
        t.replace_chars(1, 2, "EL");
        assert_eq!(t.as_str(), "hELlo");
        assert!(t.is_mutable());
    }

    #[test]
    fn replace_chars_clamps_past_end() {
        let mut t = Text::from_str("abc");
        t.replace_chars(2, 10, "Z");
        assert_eq!(t.as_str(), "abZ");
        t.replace_chars(10, 1, "!");
        assert_eq!(t.as_str(), "abZ!");
    }

    #[test]
    fn freeze_keeps_contents() {
        let mut t = Text::mutable("x".repeat(40));
        t.freeze();
        assert!(matches!(t, Text::Shared(_)));
        assert_eq!(t.len(), 40);
    }
}
