//! References to one element of a variable.

use std::ops::Range;

use smallvec::SmallVec;
use vs_core::{Appendable, Name, StoreError, StoreResult, Value};

use crate::context::ExecContext;
use crate::variable::{SetStyle, Variable};

pub const PATH_INLINE: usize = 6;

/// Keys from the variable down to the element. Short paths stay inline.
pub type Path = SmallVec<[Name; PATH_INLINE]>;

fn bad_index(err: impl std::fmt::Display) -> StoreError {
    StoreError::BadIndex(err.to_string())
}

/// Appends the keys produced by one evaluated index. A non-empty sequence
/// array contributes each element in order; any other value contributes its
/// name form. On error `path` is left as it was.
pub fn push_index(path: &mut Path, index: &Value) -> StoreResult<()> {
    let Value::Array(array) = index else {
        path.push(index.to_name().map_err(bad_index)?);
        return Ok(());
    };
    if !array.is_sequence() {
        return Err(StoreError::BadIndex("array index is not a sequence".to_string()));
    }
    let mut keys: Path = SmallVec::with_capacity(array.len());
    let mut position = String::new();
    for i in 1..=array.len() as u64 {
        position.clear();
        position.append_u64(i);
        let element = array
            .get(&position)
            .ok_or_else(|| bad_index(format!("sequence element {i} is missing")))?;
        keys.push(element.to_name().map_err(bad_index)?);
    }
    path.extend(keys);
    Ok(())
}

/// A variable plus the path of keys addressing one of its elements. An
/// empty path addresses the whole variable.
pub struct Container<'v> {
    var: &'v mut Variable,
    path: Path,
}

impl<'v> Container<'v> {
    pub fn new(var: &'v mut Variable) -> Self {
        Self {
            var,
            path: Path::new(),
        }
    }

    pub fn with_path(var: &'v mut Variable, path: Path) -> Self {
        Self { var, path }
    }

    /// Extends the path by one evaluated index expression.
    pub fn resolve(mut self, index: &Value) -> StoreResult<Self> {
        push_index(&mut self.path, index)?;
        Ok(self)
    }

    pub fn push_key(&mut self, key: impl Into<Name>) {
        self.path.push(key.into());
    }

    pub fn path(&self) -> &[Name] {
        &self.path
    }

    pub fn variable(&mut self) -> &mut Variable {
        &mut *self.var
    }

    pub fn eval(&mut self) -> StoreResult<Value> {
        self.var.eval(&self.path)
    }

    pub fn set(&mut self, ctx: &mut ExecContext<'_>, value: Value, style: SetStyle) -> StoreResult<()> {
        self.var.set(ctx, value, &self.path, style)
    }

    pub fn replace(
        &mut self,
        ctx: &mut ExecContext<'_>,
        value: Value,
        range: Range<usize>,
    ) -> StoreResult<()> {
        self.var.replace(ctx, value, range, &self.path)
    }

    pub fn delete_range(&mut self, ctx: &mut ExecContext<'_>, range: Range<usize>) -> StoreResult<()> {
        self.var.delete_range(ctx, range, &self.path)
    }

    pub fn remove(&mut self, ctx: &mut ExecContext<'_>) -> StoreResult<()> {
        self.var.remove(ctx, &self.path)
    }

    pub fn can_become_byte_buffer(&mut self) -> StoreResult<bool> {
        self.var.can_become_byte_buffer(&self.path)
    }
}
