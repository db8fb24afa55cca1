//! Named storage cells.

use std::fmt;
use std::ops::Range;
use std::rc::Rc;

use bitflags::bitflags;
use vs_core::codec;
use vs_core::{Array, ConversionError, Name, StoreError, StoreResult, Text, Value};

use crate::context::ExecContext;

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct VarFlags: u8 {
        const GLOBAL = 1 << 0;
        const ENVIRONMENT = 1 << 1;
        const MESSAGE_BOX = 1 << 2;
        /// Holds a compute callback that has not run yet.
        const DEFERRED = 1 << 3;
        /// Unquoted literal: holds its own name until first written.
        const UQL = 1 << 4;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SetStyle {
    Into,
    Before,
    After,
}

pub type ComputeFn = Box<dyn FnOnce(&mut Variable) -> StoreResult<()>>;

pub struct Variable {
    name: Name,
    value: Value,
    flags: VarFlags,
    compute: Option<ComputeFn>,
}

impl Variable {
    pub fn new(name: impl Into<Name>) -> Self {
        Self::with_flags(name, VarFlags::empty())
    }

    pub fn with_flags(name: impl Into<Name>, flags: VarFlags) -> Self {
        Self {
            name: name.into(),
            value: Value::None,
            flags: flags - VarFlags::DEFERRED,
            compute: None,
        }
    }

    /// A variable whose value is produced by `compute` on first access.
    pub fn deferred(
        name: impl Into<Name>,
        compute: impl FnOnce(&mut Variable) -> StoreResult<()> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            value: Value::None,
            flags: VarFlags::DEFERRED,
            compute: Some(Box::new(compute)),
        }
    }

    pub fn unquoted(name: impl Into<Name>) -> Self {
        let name = name.into();
        Self {
            value: Value::String(Text::from_str(name.as_str())),
            name,
            flags: VarFlags::UQL,
            compute: None,
        }
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn flags(&self) -> VarFlags {
        self.flags
    }

    pub(crate) fn insert_flags(&mut self, flags: VarFlags) {
        self.flags |= flags - VarFlags::DEFERRED;
    }

    pub fn is_global(&self) -> bool {
        self.flags.contains(VarFlags::GLOBAL)
    }

    pub fn is_environment(&self) -> bool {
        self.flags.contains(VarFlags::ENVIRONMENT)
    }

    pub fn is_deferred(&self) -> bool {
        self.flags.contains(VarFlags::DEFERRED)
    }

    pub fn is_uql(&self) -> bool {
        self.flags.contains(VarFlags::UQL)
    }

    /// Runs the deferred callback once. The flag is cleared first so a
    /// re-entrant access sees an ordinary variable.
    fn ensure_computed(&mut self) -> StoreResult<()> {
        if let Some(compute) = self.compute.take() {
            self.flags.remove(VarFlags::DEFERRED);
            tracing::debug!(name = self.name.as_str(), "computing deferred variable");
            compute(self)?;
        }
        Ok(())
    }

    pub fn value(&mut self) -> StoreResult<&Value> {
        self.ensure_computed()?;
        Ok(&self.value)
    }

    /// Stores `value` without synchronizing.
    pub fn assign(&mut self, value: Value) {
        self.value = value;
    }

    pub fn is_clear(&self) -> bool {
        !self.is_deferred() && self.value.is_none()
    }

    pub fn is_array(&mut self) -> StoreResult<bool> {
        Ok(self.value()?.is_array())
    }

    pub fn is_empty(&mut self) -> StoreResult<bool> {
        Ok(self.value()?.is_empty())
    }

    pub fn clear(&mut self) {
        self.compute = None;
        self.flags.remove(VarFlags::DEFERRED | VarFlags::UQL);
        self.value = Value::None;
    }

    /// Drops the literal name value of an unquoted-literal variable.
    pub fn clear_uql(&mut self) {
        if !self.is_uql() {
            return;
        }
        self.flags.remove(VarFlags::UQL);
        if matches!(&self.value, Value::String(t) if t.as_str() == self.name.as_str()) {
            self.value = Value::None;
        }
    }

    fn element(&self, path: &[Name]) -> Option<&Value> {
        path.iter()
            .try_fold(&self.value, |slot, key| slot.as_array()?.get(key.as_str()))
    }

    fn element_mut(&mut self, path: &[Name]) -> Option<&mut Value> {
        let mut slot = &mut self.value;
        for key in path {
            let Value::Array(array) = slot else {
                return None;
            };
            slot = Rc::make_mut(array).get_mut(key.as_str())?;
        }
        Some(slot)
    }

    /// The slot at `path`, creating every missing array on the way.
    fn vivify(&mut self, path: &[Name], table_size: usize) -> &mut Value {
        let mut slot = &mut self.value;
        for key in path {
            if !slot.is_array() {
                *slot = Value::array(Array::with_table_size(table_size));
            }
            slot = slot.make_array_mut().entry(key);
        }
        slot
    }

    /// The element at `path`. Missing elements read as empty text.
    pub fn eval(&mut self, path: &[Name]) -> StoreResult<Value> {
        self.ensure_computed()?;
        Ok(self
            .element(path)
            .map_or_else(Value::empty_string, Value::snapshot))
    }

    pub fn can_become_byte_buffer(&mut self, path: &[Name]) -> StoreResult<bool> {
        self.ensure_computed()?;
        Ok(self.element(path).is_none_or(Value::can_become_bytes))
    }

    /// Checks that the element at `path` can take an in-place edit with
    /// `incoming` before anything is written.
    fn check_editable(&self, incoming: &Value, path: &[Name], current_error: StoreError) -> StoreResult<()> {
        if incoming.is_array() {
            return Err(ConversionError::ArrayNotScalar.into());
        }
        if self.element(path).is_some_and(Value::is_array) {
            return Err(current_error);
        }
        Ok(())
    }

    #[tracing::instrument(level = "trace", skip_all, fields(name = self.name.as_str(), depth = path.len()))]
    pub fn set(
        &mut self,
        ctx: &mut ExecContext<'_>,
        value: Value,
        path: &[Name],
        style: SetStyle,
    ) -> StoreResult<()> {
        self.ensure_computed()?;
        if style != SetStyle::Into {
            self.check_editable(&value, path, ConversionError::ArrayNotScalar.into())?;
        }
        self.clear_uql();
        let slot = self.vivify(path, ctx.config.initial_table_size);
        match style {
            SetStyle::Into => *slot = value,
            SetStyle::Before | SetStyle::After => {
                if matches!(value, Value::Data(_)) && slot.can_become_bytes() {
                    let bytes = value.to_native_bytes()?;
                    let buf = slot.make_data_mut()?;
                    if style == SetStyle::After {
                        buf.extend_from_slice(&bytes);
                    } else {
                        buf.splice(0..0, bytes);
                    }
                } else {
                    let text = value.to_text()?;
                    let buf = slot.make_text_mut()?;
                    if style == SetStyle::After {
                        buf.push_str(&text);
                    } else {
                        buf.insert_str(0, &text);
                    }
                }
            }
        }
        self.synchronize(ctx, true);
        Ok(())
    }

    pub fn modify(
        &mut self,
        ctx: &mut ExecContext<'_>,
        value: Value,
        path: &[Name],
        style: SetStyle,
    ) -> StoreResult<()> {
        self.set(ctx, value, path, style)
    }

    /// Replaces `range` of the element at `path`: bytes when the element is
    /// data and `value` fits the byte family, characters otherwise.
    pub fn replace(
        &mut self,
        ctx: &mut ExecContext<'_>,
        value: Value,
        range: Range<usize>,
        path: &[Name],
    ) -> StoreResult<()> {
        self.ensure_computed()?;
        self.check_editable(&value, path, StoreError::NotMutable)?;
        self.clear_uql();
        let count = range.end.saturating_sub(range.start);
        let slot = self.vivify(path, ctx.config.initial_table_size);
        if matches!(slot, Value::Data(_)) && value.can_become_bytes() {
            let bytes = value.to_native_bytes()?;
            if let Value::Data(buf) = slot {
                buf.splice(range.start, count, &bytes);
            }
        } else {
            let text = value.to_text()?;
            slot.make_text_mut()?;
            if let Value::String(buf) = slot {
                buf.replace_chars(range.start, count, &text);
            }
        }
        self.synchronize(ctx, true);
        Ok(())
    }

    pub fn delete_range(
        &mut self,
        ctx: &mut ExecContext<'_>,
        range: Range<usize>,
        path: &[Name],
    ) -> StoreResult<()> {
        self.replace(ctx, Value::empty_string(), range, path)
    }

    /// Empty `path` clears the variable; otherwise one array entry goes.
    pub fn remove(&mut self, ctx: &mut ExecContext<'_>, path: &[Name]) -> StoreResult<()> {
        let Some((last, parent)) = path.split_last() else {
            self.clear();
            if self.is_environment() && ctx.config.mirror_environment {
                if let Some(env_name) = ctx.config.mirrored_name(self.name.as_str()) {
                    tracing::trace!(name = env_name, "unsetting mirrored environment variable");
                    ctx.caps.env.unset(env_name);
                }
            }
            ctx.notify_watch(&self.name, self.is_global(), &self.value);
            return Ok(());
        };
        self.ensure_computed()?;
        if self.element(path).is_none() {
            return Ok(());
        }
        if let Some(Value::Array(array)) = self.element_mut(parent) {
            Rc::make_mut(array).remove(last.as_str());
        }
        self.synchronize(ctx, true);
        Ok(())
    }

    pub fn convert_to_mutable_string(&mut self) -> StoreResult<()> {
        self.ensure_computed()?;
        self.value.make_text_mut()?;
        Ok(())
    }

    pub fn convert_to_mutable_data(&mut self) -> StoreResult<()> {
        self.ensure_computed()?;
        self.value.make_data_mut()?;
        Ok(())
    }

    pub fn convert_to_mutable_array(&mut self) -> StoreResult<()> {
        self.ensure_computed()?;
        if !self.value.is_array() && !self.value.is_empty() {
            return Err(ConversionError::NotAnArray.into());
        }
        self.value.make_array_mut();
        Ok(())
    }

    /// Pushes the committed value to the mirrors and, when `notify` is set,
    /// to a matching debug watch.
    pub fn synchronize(&mut self, ctx: &mut ExecContext<'_>, notify: bool) {
        let mirrors_env = self.is_environment() && ctx.config.mirror_environment;
        let mirrors_box = self.flags.contains(VarFlags::MESSAGE_BOX);
        if mirrors_env || mirrors_box {
            let text = self.value.to_text().unwrap_or_default();
            if mirrors_env {
                if let Some(env_name) = ctx.config.mirrored_name(self.name.as_str()) {
                    tracing::trace!(name = env_name, "mirroring to environment");
                    ctx.caps.env.set(env_name, &text);
                }
            }
            if mirrors_box {
                ctx.caps.message_box.put(&text);
            }
        }
        if notify {
            ctx.notify_watch(&self.name, self.is_global(), &self.value);
        }
    }

    pub fn encode(&mut self) -> StoreResult<Vec<u8>> {
        self.ensure_computed()?;
        codec::encode_value(&self.value)
    }

    /// Replaces the value with a decoded one. Nothing changes on error.
    pub fn decode(&mut self, ctx: &mut ExecContext<'_>, bytes: &[u8]) -> StoreResult<()> {
        let value = codec::decode_value(bytes)?;
        self.compute = None;
        self.flags.remove(VarFlags::DEFERRED | VarFlags::UQL);
        self.value = value;
        self.synchronize(ctx, true);
        Ok(())
    }
}

impl fmt::Debug for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Variable")
            .field("name", &self.name)
            .field("value", &self.value)
            .field("flags", &self.flags)
            .finish()
    }
}
