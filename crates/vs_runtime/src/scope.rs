//! Variable tables owned by the global context and by handler frames.

use ahash::RandomState;
use indexmap::IndexMap;
use vs_core::{Name, StoreResult, Value};

use crate::capabilities::Environment;
use crate::config::StoreConfig;
use crate::util::{NameKey, fast_hasher};
use crate::variable::{VarFlags, Variable};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScopeKind {
    Global,
    Handler,
    Script,
}

/// Variables in declaration order, looked up by name ignoring case.
pub struct Scope {
    kind: ScopeKind,
    vars: IndexMap<Name, Variable, RandomState>,
}

impl Scope {
    pub fn new(kind: ScopeKind) -> Self {
        Self {
            kind,
            vars: IndexMap::with_hasher(fast_hasher()),
        }
    }

    pub fn kind(&self) -> ScopeKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(&NameKey::new(name))
    }

    pub fn get(&self, name: &str) -> Option<&Variable> {
        self.vars.get(&NameKey::new(name))
    }

    pub fn lookup(&mut self, name: &str) -> Option<&mut Variable> {
        self.vars.get_mut(&NameKey::new(name))
    }

    fn flags_for(&self, name: &str, config: &StoreConfig) -> VarFlags {
        let mut flags = VarFlags::empty();
        if self.kind == ScopeKind::Global {
            flags |= VarFlags::GLOBAL;
        }
        if name.starts_with(config.env_sigil) {
            flags |= VarFlags::ENVIRONMENT;
        }
        flags
    }

    /// The variable called `name`, declared if absent. A new
    /// environment-prefixed variable starts with the mirrored value.
    pub fn ensure(&mut self, name: &str, env: &dyn Environment, config: &StoreConfig) -> &mut Variable {
        let index = match self.vars.get_index_of(&NameKey::new(name)) {
            Some(index) => index,
            None => {
                let mut var = Variable::with_flags(name, self.flags_for(name, config));
                if var.is_environment() {
                    if let Some(value) = config.mirrored_name(name).and_then(|n| env.get(n)) {
                        var.assign(Value::from(value));
                    }
                }
                self.vars.insert_full(var.name().clone(), var).0
            }
        };
        &mut self.vars[index]
    }

    /// Adds `var`, replacing any variable of the same name.
    pub fn declare(&mut self, mut var: Variable) -> &mut Variable {
        if self.kind == ScopeKind::Global {
            var.insert_flags(VarFlags::GLOBAL);
        }
        let (index, _) = self.vars.insert_full(var.name().clone(), var);
        &mut self.vars[index]
    }

    pub fn declare_deferred(
        &mut self,
        name: &str,
        compute: impl FnOnce(&mut Variable) -> StoreResult<()> + 'static,
    ) -> &mut Variable {
        self.declare(Variable::deferred(name, compute))
    }

    pub fn declare_uql(&mut self, name: &str) -> &mut Variable {
        self.declare(Variable::unquoted(name))
    }

    pub fn remove(&mut self, name: &str) -> Option<Variable> {
        self.vars.shift_remove(&NameKey::new(name))
    }

    pub fn names(&self) -> impl Iterator<Item = &Name> {
        self.vars.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Variable> {
        self.vars.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Variable> {
        self.vars.values_mut()
    }
}
