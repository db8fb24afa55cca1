//! The owner of every scope and of the host capabilities.

use vs_core::StoreResult;

use crate::capabilities::Capabilities;
use crate::config::StoreConfig;
use crate::context::ExecContext;
use crate::scope::{Scope, ScopeKind};
use crate::variable::Variable;
use crate::watch::{Frame, WatchList};

pub struct HandlerFrame {
    pub frame: Frame,
    pub locals: Scope,
}

/// Mutable access to the scopes visible from the current frame.
pub struct Scopes<'a> {
    pub globals: &'a mut Scope,
    pub script: &'a mut Scope,
    /// `None` outside any handler.
    pub locals: Option<&'a mut Scope>,
}

impl Scopes<'_> {
    pub fn global(&mut self, name: &str, ctx: &ExecContext<'_>) -> &mut Variable {
        self.globals.ensure(name, ctx.caps.env.as_ref(), ctx.config)
    }

    /// A local of the current handler, or a global when no handler runs.
    pub fn local(&mut self, name: &str, ctx: &ExecContext<'_>) -> &mut Variable {
        match self.locals.as_deref_mut() {
            Some(locals) => locals.ensure(name, ctx.caps.env.as_ref(), ctx.config),
            None => self.globals.ensure(name, ctx.caps.env.as_ref(), ctx.config),
        }
    }

    /// An existing variable, searching locals, then script variables, then
    /// globals.
    pub fn find(&mut self, name: &str) -> Option<&mut Variable> {
        if let Some(locals) = self.locals.as_deref_mut() {
            if locals.contains(name) {
                return locals.lookup(name);
            }
        }
        if self.script.contains(name) {
            return self.script.lookup(name);
        }
        self.globals.lookup(name)
    }
}

pub struct Store {
    config: StoreConfig,
    caps: Capabilities,
    watches: WatchList,
    globals: Scope,
    script: Scope,
    frames: Vec<HandlerFrame>,
    top_level: Frame,
}

impl Default for Store {
    fn default() -> Self {
        Self::new(StoreConfig::default(), Capabilities::default())
    }
}

impl Store {
    pub fn new(config: StoreConfig, caps: Capabilities) -> Self {
        Self {
            config,
            caps,
            watches: WatchList::new(),
            globals: Scope::new(ScopeKind::Global),
            script: Scope::new(ScopeKind::Script),
            frames: Vec::new(),
            top_level: Frame::default(),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn capabilities_mut(&mut self) -> &mut Capabilities {
        &mut self.caps
    }

    pub fn watches_mut(&mut self) -> &mut WatchList {
        &mut self.watches
    }

    pub fn globals(&self) -> &Scope {
        &self.globals
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn push_frame(&mut self, handler: &str, object: Option<&str>) {
        tracing::trace!(handler, depth = self.frames.len() + 1, "enter handler");
        self.frames.push(HandlerFrame {
            frame: Frame::new(handler, object),
            locals: Scope::new(ScopeKind::Handler),
        });
    }

    /// Leaves the current handler, dropping its locals.
    pub fn pop_frame(&mut self) -> Option<HandlerFrame> {
        self.frames.pop()
    }

    /// Separates the scopes from the context so a variable can be mutated
    /// with the context alongside.
    pub fn split(&mut self) -> (Scopes<'_>, ExecContext<'_>) {
        let (frame, locals) = match self.frames.last_mut() {
            Some(top) => (&top.frame, Some(&mut top.locals)),
            None => (&self.top_level, None),
        };
        let scopes = Scopes {
            globals: &mut self.globals,
            script: &mut self.script,
            locals,
        };
        let ctx = ExecContext::new(&mut self.caps, &self.watches, &self.config, frame);
        (scopes, ctx)
    }

    pub fn with_global<T>(
        &mut self,
        name: &str,
        f: impl FnOnce(&mut Variable, &mut ExecContext<'_>) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let (mut scopes, mut ctx) = self.split();
        let var = scopes.global(name, &ctx);
        f(var, &mut ctx)
    }

    pub fn with_local<T>(
        &mut self,
        name: &str,
        f: impl FnOnce(&mut Variable, &mut ExecContext<'_>) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let (mut scopes, mut ctx) = self.split();
        let var = scopes.local(name, &ctx);
        f(var, &mut ctx)
    }
}
