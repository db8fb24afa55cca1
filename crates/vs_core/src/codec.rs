//! Binary persistence of values and arrays.
//!
//! Every multi-byte field is big-endian. Three layouts exist:
//!
//! - the value encoding: a type byte followed by a kind-specific payload;
//! - the legacy array stream: entries tagged with their size so readers can
//!   skip formats they do not know;
//! - the flat key stream: string-only entries with 2- or 4-byte value lengths
//!   depending on [`SAVE_LARGE`].

use std::io::{Read, Write};

use crate::array::Array;
use crate::errors::{StoreError, StoreResult, messages};
use crate::text::Text;
use crate::value::Value;

pub const SAVE_LARGE: u32 = 0x4000_0000;
pub const SAVE_ENCRYPTED: u32 = 0x8000_0000;
const SAVE_FLAGS: u32 = SAVE_LARGE | SAVE_ENCRYPTED;

/// Largest value a flat key stream can hold without [`SAVE_LARGE`].
const SMALL_VALUE_LIMIT: usize = u16::MAX as usize;
/// Key length byte counts the terminating NUL.
const MAX_KEY_LEN: usize = u8::MAX as usize - 1;
/// Upper bound on the table size preallocated from an untrusted count.
const MAX_PRESIZE: usize = 1 << 16;
/// Deepest array nesting a legacy stream may describe.
pub const MAX_DEPTH: usize = 1024;

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EncodedType {
    Undefined = 1,
    Empty = 2,
    String = 3,
    Number = 4,
    LegacyArray = 5,
    Array = 6,
}

impl TryFrom<u8> for EncodedType {
    type Error = StoreError;

    fn try_from(byte: u8) -> StoreResult<Self> {
        Ok(match byte {
            1 => EncodedType::Undefined,
            2 => EncodedType::Empty,
            3 => EncodedType::String,
            4 => EncodedType::Number,
            5 => EncodedType::LegacyArray,
            6 => EncodedType::Array,
            other => {
                return Err(StoreError::Serialization(format!("unknown value type {other}")));
            }
        })
    }
}

/// Per-entry format in the legacy array stream; written as `format + 1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum EntryFormat {
    Undefined = 0,
    String = 1,
    Number = 2,
    Both = 3,
    Array = 4,
}

impl EntryFormat {
    fn of(value: &Value) -> Self {
        match value {
            Value::None => EntryFormat::Undefined,
            Value::Int(_) | Value::UInt(_) | Value::Float(_) | Value::Double(_) => EntryFormat::Number,
            Value::Array(_) => EntryFormat::Array,
            Value::Boolean(_) | Value::String(_) | Value::Data(_) => EntryFormat::String,
        }
    }

    fn from_tag(tag: u8) -> Option<Self> {
        Some(match tag.checked_sub(1)? {
            0 => EntryFormat::Undefined,
            1 => EntryFormat::String,
            2 => EntryFormat::Number,
            3 => EntryFormat::Both,
            4 => EntryFormat::Array,
            _ => return None,
        })
    }
}

pub struct StreamWriter<W: Write> {
    inner: W,
}

impl<W: Write> StreamWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }

    pub fn write_u8(&mut self, v: u8) -> StoreResult<()> {
        Ok(self.inner.write_all(&[v])?)
    }

    pub fn write_u16(&mut self, v: u16) -> StoreResult<()> {
        Ok(self.inner.write_all(&v.to_be_bytes())?)
    }

    pub fn write_u32(&mut self, v: u32) -> StoreResult<()> {
        Ok(self.inner.write_all(&v.to_be_bytes())?)
    }

    pub fn write_f64(&mut self, v: f64) -> StoreResult<()> {
        Ok(self.inner.write_all(&v.to_be_bytes())?)
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> StoreResult<()> {
        Ok(self.inner.write_all(bytes)?)
    }

    /// `u32` length followed by the bytes.
    pub fn write_block(&mut self, bytes: &[u8]) -> StoreResult<()> {
        self.write_u32(block_len(bytes)?)?;
        self.write_bytes(bytes)
    }

    pub fn write_cstring(&mut self, bytes: &[u8]) -> StoreResult<()> {
        self.write_bytes(bytes)?;
        self.write_u8(0)
    }
}

pub struct StreamReader<R: Read> {
    inner: R,
}

impl<R: Read> StreamReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    fn read_array<const N: usize>(&mut self) -> StoreResult<[u8; N]> {
        let mut buf = [0u8; N];
        self.inner.read_exact(&mut buf)?;
        Ok(buf)
    }

    pub fn read_u8(&mut self) -> StoreResult<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_u16(&mut self) -> StoreResult<u16> {
        Ok(u16::from_be_bytes(self.read_array()?))
    }

    pub fn read_u32(&mut self) -> StoreResult<u32> {
        Ok(u32::from_be_bytes(self.read_array()?))
    }

    pub fn read_f64(&mut self) -> StoreResult<f64> {
        Ok(f64::from_be_bytes(self.read_array()?))
    }

    /// Exactly `len` bytes, without trusting `len` for the allocation.
    pub fn read_bytes(&mut self, len: usize) -> StoreResult<Vec<u8>> {
        let mut out = Vec::new();
        (&mut self.inner).take(len as u64).read_to_end(&mut out)?;
        if out.len() != len {
            return Err(StoreError::Serialization(messages::UNEXPECTED_EOF.to_string()));
        }
        Ok(out)
    }

    pub fn read_block(&mut self) -> StoreResult<Vec<u8>> {
        let len = self.read_u32()? as usize;
        self.read_bytes(len)
    }

    pub fn read_cstring(&mut self) -> StoreResult<Vec<u8>> {
        let mut out = Vec::new();
        loop {
            match self.read_u8()? {
                0 => return Ok(out),
                b => out.push(b),
            }
        }
    }

    pub fn skip(&mut self, len: usize) -> StoreResult<()> {
        let skipped = std::io::copy(&mut (&mut self.inner).take(len as u64), &mut std::io::sink())?;
        if skipped as usize != len {
            return Err(StoreError::Serialization(messages::UNEXPECTED_EOF.to_string()));
        }
        Ok(())
    }
}

fn block_len(bytes: &[u8]) -> StoreResult<u32> {
    u32::try_from(bytes.len())
        .map_err(|_| StoreError::Serialization(format!("block of {} bytes too large", bytes.len())))
}

fn key_bytes(key: &str) -> StoreResult<Vec<u8>> {
    let bytes = Text::from_str(key).to_native_bytes();
    if bytes.contains(&0) {
        return Err(StoreError::Serialization(format!("key {key:?} contains NUL")));
    }
    Ok(bytes)
}

fn native_value(bytes: &[u8]) -> Value {
    Value::String(Text::from_native(bytes))
}

pub fn encode_value(value: &Value) -> StoreResult<Vec<u8>> {
    let mut w = StreamWriter::new(Vec::new());
    write_value(&mut w, value)?;
    Ok(w.into_inner())
}

pub fn decode_value(bytes: &[u8]) -> StoreResult<Value> {
    read_value(&mut StreamReader::new(bytes))
}

pub fn write_value<W: Write>(w: &mut StreamWriter<W>, value: &Value) -> StoreResult<()> {
    match value {
        Value::None => w.write_u8(EncodedType::Undefined as u8),
        Value::Array(array) => {
            w.write_u8(EncodedType::LegacyArray as u8)?;
            array.save(w, false)
        }
        v if v.is_empty() => w.write_u8(EncodedType::Empty as u8),
        Value::Int(_) | Value::UInt(_) | Value::Float(_) | Value::Double(_) => {
            w.write_u8(EncodedType::Number as u8)?;
            w.write_f64(value.to_double()?)
        }
        Value::Boolean(_) | Value::String(_) | Value::Data(_) => {
            w.write_u8(EncodedType::String as u8)?;
            w.write_block(&value.to_native_bytes()?)
        }
    }
}

pub fn read_value<R: Read>(r: &mut StreamReader<R>) -> StoreResult<Value> {
    Ok(match EncodedType::try_from(r.read_u8()?)? {
        EncodedType::Undefined => Value::None,
        EncodedType::Empty => Value::empty_string(),
        EncodedType::String => native_value(&r.read_block()?),
        EncodedType::Number => Value::Double(r.read_f64()?),
        EncodedType::LegacyArray | EncodedType::Array => Value::array(Array::load(r)?),
    })
}

/// Payload of one legacy entry, computed once so the size tag is exact.
enum Payload<'a> {
    Nothing,
    Bytes(Vec<u8>),
    Number(f64),
    Array(&'a Array),
}

impl Payload<'_> {
    fn of(value: &Value) -> StoreResult<Payload<'_>> {
        Ok(match EntryFormat::of(value) {
            EntryFormat::Undefined => Payload::Nothing,
            EntryFormat::Number | EntryFormat::Both => Payload::Number(value.to_double()?),
            EntryFormat::Array => match value {
                Value::Array(a) => Payload::Array(a),
                _ => Payload::Nothing,
            },
            EntryFormat::String => Payload::Bytes(value.to_native_bytes()?),
        })
    }

    fn measure(&self) -> usize {
        match self {
            Payload::Nothing => 0,
            Payload::Bytes(b) => 4 + b.len(),
            Payload::Number(_) => 8,
            Payload::Array(a) => a.measure(false),
        }
    }
}

impl Array {
    fn saved_entries(&self, nested_only: bool) -> impl Iterator<Item = (&crate::Name, &Value)> {
        self.iter().filter(move |(_, v)| !nested_only || v.is_array())
    }

    /// Exact size in bytes of what [`Array::save`] writes.
    pub fn measure(&self, nested_only: bool) -> usize {
        let entries: usize = self
            .saved_entries(nested_only)
            .map(|(k, v)| {
                let key_len = Text::from_str(k.as_str()).to_native_bytes().len();
                let payload = Payload::of(v).map_or(0, |p| p.measure());
                1 + 4 + key_len + 1 + payload
            })
            .sum();
        4 + entries + 1
    }

    /// Writes the legacy array stream. With `nested_only`, only entries that
    /// hold arrays are written.
    #[tracing::instrument(level = "trace", skip_all, fields(len = self.len()))]
    pub fn save<W: Write>(&self, w: &mut StreamWriter<W>, nested_only: bool) -> StoreResult<()> {
        let count = self.saved_entries(nested_only).count();
        w.write_u32(u32::try_from(count).map_err(|_| StoreError::Range)?)?;
        for (key, value) in self.saved_entries(nested_only) {
            let key = key_bytes(key.as_str())?;
            let payload = Payload::of(value)?;
            let size = 4 + key.len() + 1 + payload.measure();
            w.write_u8(EntryFormat::of(value) as u8 + 1)?;
            w.write_u32(u32::try_from(size).map_err(|_| StoreError::Range)?)?;
            w.write_cstring(&key)?;
            match payload {
                Payload::Nothing => {}
                Payload::Bytes(b) => w.write_block(&b)?,
                Payload::Number(n) => w.write_f64(n)?,
                Payload::Array(a) => a.save(w, false)?,
            }
        }
        w.write_u8(0)
    }

    /// Reads a legacy array stream into a fresh array. On error the partial
    /// result is dropped.
    pub fn load<R: Read>(r: &mut StreamReader<R>) -> StoreResult<Array> {
        Self::load_nested(r, 0)
    }

    fn load_nested<R: Read>(r: &mut StreamReader<R>, depth: usize) -> StoreResult<Array> {
        let mut out = Array::new();
        out.merge_nested(r, depth)?;
        Ok(out)
    }

    /// Reads a legacy array stream, overwriting existing keys.
    pub fn merge_from<R: Read>(&mut self, r: &mut StreamReader<R>) -> StoreResult<()> {
        self.merge_nested(r, 0)
    }

    fn merge_nested<R: Read>(&mut self, r: &mut StreamReader<R>, depth: usize) -> StoreResult<()> {
        if depth >= MAX_DEPTH {
            return Err(StoreError::Serialization(messages::NESTING_TOO_DEEP.to_string()));
        }
        let count = r.read_u32()? as usize;
        if self.is_empty() && count > self.table_size() {
            *self = Array::with_table_size(count.min(MAX_PRESIZE));
        }
        loop {
            let tag = r.read_u8()?;
            if tag == 0 {
                return Ok(());
            }
            let size = r.read_u32()? as usize;
            let key = r.read_cstring()?;
            let value = match EntryFormat::from_tag(tag) {
                Some(EntryFormat::Undefined) => Value::None,
                Some(EntryFormat::String) => native_value(&r.read_block()?),
                Some(EntryFormat::Number | EntryFormat::Both) => Value::Double(r.read_f64()?),
                Some(EntryFormat::Array) => Value::array(Array::load_nested(r, depth + 1)?),
                None => {
                    let rest = size.checked_sub(key.len() + 1 + 4).ok_or_else(|| {
                        StoreError::Serialization(format!("entry size {size} smaller than its key"))
                    })?;
                    tracing::warn!(tag, skipped = rest, "skipping unknown array entry format");
                    r.skip(rest)?;
                    continue;
                }
            };
            self.insert(Text::from_native(&key).as_str(), value);
        }
    }

    /// Writes the flat key stream. Entries holding arrays are left out.
    pub fn save_keys<W: Write>(&self, w: &mut StreamWriter<W>) -> StoreResult<()> {
        let mut entries = Vec::new();
        for (key, value) in self.iter().filter(|(_, v)| !v.is_array()) {
            let key = key_bytes(key.as_str())?;
            if key.len() > MAX_KEY_LEN {
                return Err(StoreError::Serialization(messages::KEY_TOO_LONG.to_string()));
            }
            entries.push((key, value.to_native_bytes()?));
        }
        let large = entries.iter().any(|(_, v)| v.len() > SMALL_VALUE_LIMIT);
        let count = u32::try_from(entries.len())
            .ok()
            .filter(|c| c & SAVE_FLAGS == 0)
            .ok_or(StoreError::Range)?;
        w.write_u32(if large { count | SAVE_LARGE } else { count })?;
        for (key, value) in entries {
            w.write_u8(key.len() as u8 + 1)?;
            w.write_cstring(&key)?;
            if large {
                w.write_block(&value)?;
            } else {
                w.write_u16(value.len() as u16)?;
                w.write_bytes(&value)?;
            }
        }
        Ok(())
    }

    /// Reads the flat key stream into a fresh array.
    pub fn load_keys<R: Read>(r: &mut StreamReader<R>) -> StoreResult<Array> {
        let header = r.read_u32()?;
        if header & SAVE_ENCRYPTED != 0 {
            return Err(StoreError::Serialization(messages::ENCRYPTED.to_string()));
        }
        let large = header & SAVE_LARGE != 0;
        let count = (header & !SAVE_FLAGS) as usize;
        let mut out = Array::with_table_size(count.min(MAX_PRESIZE));
        for _ in 0..count {
            let key_len = r.read_u8()? as usize;
            let mut key = r.read_bytes(key_len)?;
            if key_len > 0 && key.pop() != Some(0) {
                return Err(StoreError::Serialization(messages::MISSING_NUL.to_string()));
            }
            let value_len = if large {
                r.read_u32()? as usize
            } else {
                r.read_u16()? as usize
            };
            let value = r.read_bytes(value_len)?;
            out.insert(Text::from_native(&key).as_str(), native_value(&value));
        }
        Ok(out)
    }
}
