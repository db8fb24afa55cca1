//! The dynamic value: a closed sum over every kind a variable can hold.

use std::fmt;
use std::rc::Rc;

use crate::append::Appendable;
use crate::array::Array;
use crate::bytes::Bytes;
use crate::convert;
use crate::errors::ConversionError;
use crate::name::Name;
use crate::text::Text;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueKind {
    None,
    Boolean,
    Int,
    UInt,
    Float,
    Double,
    String,
    Data,
    Array,
}

/// A dynamically typed value.
///
/// `String` and `Data` payloads are shared until mutated; `Array` payloads
/// are reference counted and copied on the first mutation through
/// [`Value::make_array_mut`].
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    None,
    Boolean(bool),
    Int(i64),
    UInt(u64),
    Float(f32),
    Double(f64),
    String(Text),
    Data(Bytes),
    Array(Rc<Array>),
}

impl Value {
    pub fn empty_string() -> Self {
        Value::String(Text::new())
    }

    pub fn str(s: &str) -> Self {
        Value::String(Text::from_str(s))
    }

    pub fn array(array: Array) -> Self {
        Value::Array(Rc::new(array))
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Value::None => ValueKind::None,
            Value::Boolean(_) => ValueKind::Boolean,
            Value::Int(_) => ValueKind::Int,
            Value::UInt(_) => ValueKind::UInt,
            Value::Float(_) => ValueKind::Float,
            Value::Double(_) => ValueKind::Double,
            Value::String(_) => ValueKind::String,
            Value::Data(_) => ValueKind::Data,
            Value::Array(_) => ValueKind::Array,
        }
    }

    #[inline]
    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    #[inline]
    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    pub fn is_number(&self) -> bool {
        matches!(
            self,
            Value::Int(_) | Value::UInt(_) | Value::Float(_) | Value::Double(_)
        )
    }

    /// None, empty text, empty data and empty arrays are all empty.
    pub fn is_empty(&self) -> bool {
        match self {
            Value::None => true,
            Value::String(t) => t.is_empty(),
            Value::Data(b) => b.is_empty(),
            Value::Array(a) => a.is_empty(),
            _ => false,
        }
    }

    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&Text> {
        match self {
            Value::String(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Value::Data(b) => Some(b),
            _ => None,
        }
    }

    /// Whether this value can take the byte-buffer family without loss.
    pub fn can_become_bytes(&self) -> bool {
        match self {
            Value::String(t) => t.is_native(),
            _ => true,
        }
    }

    /// A copy that shares no mutable buffer with `self`.
    pub fn snapshot(&self) -> Value {
        match self {
            Value::String(t) => Value::String(t.share()),
            Value::Data(b) => Value::Data(b.share()),
            other => other.clone(),
        }
    }

    /// Turns mutable payloads immutable in place.
    pub fn freeze(&mut self) {
        match self {
            Value::String(t) => t.freeze(),
            Value::Data(b) => b.freeze(),
            _ => {}
        }
    }

    pub fn to_text(&self) -> Result<Text, ConversionError> {
        let mut out = String::new();
        match self {
            Value::None => return Ok(Text::new()),
            Value::String(t) => return Ok(t.share()),
            Value::Data(b) => return Ok(Text::from_native(b)),
            Value::Array(_) => return Err(ConversionError::ArrayNotScalar),
            Value::Boolean(b) => out.append_bool(*b),
            Value::Int(i) => out.append_i64(*i),
            Value::UInt(u) => out.append_u64(*u),
            Value::Float(f) => out.append_f32(*f),
            Value::Double(d) => out.append_f64(*d),
        }
        Ok(Text::from_string(out))
    }

    /// Native bytes of the text form; data passes through untouched.
    pub fn to_native_bytes(&self) -> Result<Vec<u8>, ConversionError> {
        match self {
            Value::Data(b) => Ok(b.to_vec()),
            Value::String(t) => Ok(t.to_native_bytes()),
            other => Ok(other.to_text()?.to_native_bytes()),
        }
    }

    pub fn to_double(&self) -> Result<f64, ConversionError> {
        match self {
            Value::None => Ok(0.0),
            Value::Int(i) => Ok(*i as f64),
            Value::UInt(u) => Ok(*u as f64),
            Value::Float(f) => Ok(*f as f64),
            Value::Double(d) => Ok(*d),
            Value::String(t) => convert::parse_number(t),
            Value::Data(b) => convert::parse_number(&Text::from_native(b)),
            Value::Boolean(_) => Err(ConversionError::NotANumber),
            Value::Array(_) => Err(ConversionError::ArrayNotScalar),
        }
    }

    pub fn to_int(&self) -> Result<i64, ConversionError> {
        match self {
            Value::Int(i) => Ok(*i),
            Value::UInt(u) => i64::try_from(*u).map_err(|_| ConversionError::OutOfRange),
            Value::String(t) => convert::parse_integer(t),
            Value::Data(b) => convert::parse_integer(&Text::from_native(b)),
            other => convert::integral(other.to_double()?),
        }
    }

    pub fn to_uint(&self) -> Result<u64, ConversionError> {
        match self {
            Value::UInt(u) => Ok(*u),
            other => u64::try_from(other.to_int()?).map_err(|_| ConversionError::OutOfRange),
        }
    }

    pub fn to_boolean(&self) -> Result<bool, ConversionError> {
        match self {
            Value::Boolean(b) => Ok(*b),
            Value::String(t) => convert::parse_boolean(t),
            Value::Data(b) => convert::parse_boolean(&Text::from_native(b)),
            Value::Array(_) => Err(ConversionError::ArrayNotScalar),
            _ => Err(ConversionError::NotABoolean),
        }
    }

    /// The key form of this value, for array lookups and paths.
    pub fn to_name(&self) -> Result<Name, ConversionError> {
        Ok(Name::new(&self.to_text()?))
    }

    pub fn convert_to(&self, kind: ValueKind) -> Result<Value, ConversionError> {
        Ok(match kind {
            ValueKind::None => Value::None,
            ValueKind::Boolean => Value::Boolean(self.to_boolean()?),
            ValueKind::Int => Value::Int(self.to_int()?),
            ValueKind::UInt => Value::UInt(self.to_uint()?),
            ValueKind::Float => Value::Float(self.to_double()? as f32),
            ValueKind::Double => Value::Double(self.to_double()?),
            ValueKind::String => Value::String(self.to_text()?),
            ValueKind::Data => Value::Data(Bytes::from(self.to_native_bytes()?)),
            ValueKind::Array => match self {
                Value::Array(a) => Value::Array(Rc::clone(a)),
                v if v.is_empty() => Value::array(Array::new()),
                _ => return Err(ConversionError::NotAnArray),
            },
        })
    }

    /// Uniquely owned text, converting scalars first. Arrays fail.
    pub fn make_text_mut(&mut self) -> Result<&mut String, ConversionError> {
        if !matches!(self, Value::String(_)) {
            let text = self.to_text()?;
            *self = Value::String(Text::mutable(text.into_string()));
        }
        match self {
            Value::String(t) => Ok(t.make_mut()),
            _ => unreachable!("value was converted to text"),
        }
    }

    /// Uniquely owned bytes, converting scalars first. Arrays fail.
    pub fn make_data_mut(&mut self) -> Result<&mut Vec<u8>, ConversionError> {
        if !matches!(self, Value::Data(_)) {
            let bytes = self.to_native_bytes()?;
            *self = Value::Data(Bytes::mutable(bytes));
        }
        match self {
            Value::Data(b) => Ok(b.make_mut()),
            _ => unreachable!("value was converted to data"),
        }
    }

    /// Uniquely owned array. Any non-array value is replaced by an empty one.
    pub fn make_array_mut(&mut self) -> &mut Array {
        if !self.is_array() {
            *self = Value::array(Array::new());
        }
        match self {
            Value::Array(a) => {
                if Rc::strong_count(a) > 1 {
                    tracing::trace!(len = a.len(), "array copy-on-write");
                }
                Rc::make_mut(a)
            }
            _ => unreachable!("value was converted to array"),
        }
    }
}

/// Structural equality: numbers compare by value across kinds, text and
/// data compare by native bytes, arrays compare key-by-key ignoring case.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::UInt(a), Value::UInt(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Data(a), Value::Data(b)) => a == b,
            (Value::String(t), Value::Data(b)) | (Value::Data(b), Value::String(t)) => {
                t.is_native() && t.to_native_bytes() == b.as_slice()
            }
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b) || a == b,
            (a, b) if a.is_number() && b.is_number() => {
                matches!((a.to_double(), b.to_double()), (Ok(x), Ok(y)) if x == y)
            }
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => f.write_str("None"),
            Value::Boolean(b) => write!(f, "Boolean({b})"),
            Value::Int(i) => write!(f, "Int({i})"),
            Value::UInt(u) => write!(f, "UInt({u})"),
            Value::Float(x) => write!(f, "Float({x})"),
            Value::Double(x) => write!(f, "Double({x})"),
            Value::String(t) => write!(f, "String({t:?})"),
            Value::Data(b) => write!(f, "Data({:?})", b.as_slice()),
            Value::Array(a) => fmt::Debug::fmt(&**a, f),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<u64> for Value {
    fn from(u: u64) -> Self {
        Value::UInt(u)
    }
}

impl From<f64> for Value {
    fn from(d: f64) -> Self {
        Value::Double(d)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::str(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(Text::from_string(s))
    }
}

impl From<Text> for Value {
    fn from(t: Text) -> Self {
        Value::String(t)
    }
}

impl From<Bytes> for Value {
    fn from(b: Bytes) -> Self {
        Value::Data(b)
    }
}

impl From<Array> for Value {
    fn from(a: Array) -> Self {
        Value::array(a)
    }
}
