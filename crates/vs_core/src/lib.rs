//! Core value types for the variable store.
//!
//! This crate contains the value-level types that know nothing about scopes
//! or the host process:
//! - `Text` / `Bytes` - string and byte payloads, shared until mutated
//! - `Name` - case-preserving, case-insensitive keys
//! - `Value` - the dynamically typed value and its conversions
//! - `Array` - the associative array with numeric extent tracking
//! - `codec` - binary persistence of values and arrays

#![allow(clippy::new_without_default)]
#![allow(clippy::should_implement_trait)]
#![allow(clippy::len_without_is_empty)]

pub mod append;
pub mod array;
pub mod bytes;
pub mod codec;
pub mod convert;
pub mod errors;
pub mod name;
pub mod text;
pub mod value;

pub use append::Appendable;
pub use array::{Array, ArithOp, Extent, Extents, Operand, Reduction};
pub use bytes::Bytes;
pub use errors::{ConversionError, StoreError, StoreResult};
pub use name::{Name, NameRef};
pub use text::Text;
pub use value::{Value, ValueKind};
