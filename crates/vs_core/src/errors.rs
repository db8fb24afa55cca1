//! Error types shared by the value and storage layers.

use thiserror::Error;

pub mod messages {
    pub const NOT_TWO_DIMENSIONAL: &str = "array is not two-dimensional";
    pub const HAS_MISSING_ELEMENTS: &str = "array has missing elements";
    pub const INNER_EXTENTS_DIFFER: &str = "column count of left operand differs from row count of right operand";
    pub const NOT_COLUMN_KEYED: &str = "array keys are not column numbers";
    pub const KEYS_DIFFER: &str = "operand arrays have different keys";
    pub const NESTED_ELEMENT: &str = "operation requires a flat array";
    pub const KEY_TOO_LONG: &str = "key longer than 254 bytes";
    pub const UNEXPECTED_EOF: &str = "unexpected end of stream";
    pub const MISSING_NUL: &str = "key is not NUL-terminated";
    pub const ENCRYPTED: &str = "encrypted key streams are not supported";
    pub const NESTING_TOO_DEEP: &str = "array stream nests too deeply";
    pub const DUPLICATE_COLUMN: &str = "two keys name the same column";
}

/// A value could not be coerced into the requested kind or family.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionError {
    #[error("not a number")]
    NotANumber,
    #[error("not an integer")]
    NotAnInteger,
    #[error("not a boolean")]
    NotABoolean,
    #[error("not an array")]
    NotAnArray,
    #[error("array has no scalar representation")]
    ArrayNotScalar,
    #[error("number out of range")]
    OutOfRange,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error(transparent)]
    Conversion(#[from] ConversionError),
    #[error("bad index: {0}")]
    BadIndex(String),
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(&'static str),
    #[error("value cannot be edited in place")]
    NotMutable,
    #[error("malformed stream: {0}")]
    Serialization(String),
    #[error("division by zero")]
    DivideByZero,
    #[error("result out of range")]
    Range,
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::UnexpectedEof {
            StoreError::Serialization(messages::UNEXPECTED_EOF.to_string())
        } else {
            StoreError::Serialization(err.to_string())
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
