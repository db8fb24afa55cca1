//! Variable storage runtime.
//!
//! Variables live in [`Scope`]s owned by a [`Store`]. Every mutation goes
//! through an [`ExecContext`] carrying the host capabilities, watch list and
//! configuration, so mirrors and debug watches see each committed change.

#![allow(clippy::new_without_default)]
#![allow(clippy::collapsible_if)]
#![allow(clippy::len_without_is_empty)]

pub mod capabilities;
pub mod config;
pub mod container;
pub mod context;
pub mod scope;
pub mod store;
pub mod variable;
pub mod watch;

mod util;

pub use capabilities::{
    Capabilities, DebugHook, Environment, MemoryEnvironment, MessageBox, NullMessageBox,
    ProcessEnvironment,
};
pub use config::StoreConfig;
pub use container::{Container, PATH_INLINE, Path, push_index};
pub use context::ExecContext;
pub use scope::{Scope, ScopeKind};
pub use store::{HandlerFrame, Scopes, Store};
pub use util::{FastHashMap, fast_map_new};
pub use variable::{ComputeFn, SetStyle, VarFlags, Variable};
pub use watch::{Frame, Watch, WatchList};

pub use vs_core::{Array, Name, StoreError, StoreResult, Text, Value};
