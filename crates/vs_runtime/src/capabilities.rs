//! Host capability traits for dependency injection.

use vs_core::{StoreResult, Value};

use crate::util::{FastHashMap, fast_map_new};
use crate::watch::Frame;

pub trait Environment {
    fn get(&self, name: &str) -> Option<String>;
    fn set(&mut self, name: &str, value: &str);
    fn unset(&mut self, name: &str);
}

/// The real process environment.
pub struct ProcessEnvironment;

impl Environment for ProcessEnvironment {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var_os(name).map(|v| v.to_string_lossy().into_owned())
    }

    #[cfg(unix)]
    fn set(&mut self, name: &str, value: &str) {
        let (Ok(name), Ok(value)) = (std::ffi::CString::new(name), std::ffi::CString::new(value)) else {
            tracing::warn!("environment name or value contains NUL; not mirrored");
            return;
        };
        // SAFETY: both pointers are valid NUL-terminated strings for the
        // duration of the call; the store is single-threaded.
        unsafe {
            libc::setenv(name.as_ptr(), value.as_ptr(), 1);
        }
    }

    #[cfg(unix)]
    fn unset(&mut self, name: &str) {
        let Ok(name) = std::ffi::CString::new(name) else {
            return;
        };
        // SAFETY: see `set`.
        unsafe {
            libc::unsetenv(name.as_ptr());
        }
    }

    #[cfg(not(unix))]
    fn set(&mut self, name: &str, value: &str) {
        // SAFETY: the store is single-threaded.
        unsafe { std::env::set_var(name, value) }
    }

    #[cfg(not(unix))]
    fn unset(&mut self, name: &str) {
        // SAFETY: the store is single-threaded.
        unsafe { std::env::remove_var(name) }
    }
}

/// An environment held in memory, for embedding and tests.
#[derive(Default)]
pub struct MemoryEnvironment {
    pub vars: FastHashMap<String, String>,
}

impl MemoryEnvironment {
    pub fn new() -> Self {
        Self { vars: fast_map_new() }
    }

    pub fn with<'a>(vars: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut env = Self::new();
        for (k, v) in vars {
            env.vars.insert(k.to_string(), v.to_string());
        }
        env
    }
}

impl Environment for MemoryEnvironment {
    fn get(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }

    fn set(&mut self, name: &str, value: &str) {
        self.vars.insert(name.to_string(), value.to_string());
    }

    fn unset(&mut self, name: &str) {
        self.vars.remove(name);
    }
}

/// Receives the text of message-box mirrored variables.
pub trait MessageBox {
    fn put(&mut self, text: &str);
}

pub struct NullMessageBox;

impl MessageBox for NullMessageBox {
    fn put(&mut self, _text: &str) {}
}

/// Debugger integration for variable watches. Failures are logged and
/// otherwise ignored by the store.
pub trait DebugHook {
    /// Evaluates a watch guard expression in `frame`.
    fn evaluate_guard(&mut self, expression: &str, frame: &Frame) -> StoreResult<Value>;

    fn notify(
        &mut self,
        variable: &str,
        handler: Option<&str>,
        object: Option<&str>,
        value: &Value,
    ) -> StoreResult<()>;
}

pub struct Capabilities {
    pub env: Box<dyn Environment>,
    pub message_box: Box<dyn MessageBox>,
    pub debug: Option<Box<dyn DebugHook>>,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            env: Box::new(ProcessEnvironment),
            message_box: Box::new(NullMessageBox),
            debug: None,
        }
    }
}

impl Capabilities {
    /// Capabilities that never touch the process.
    pub fn in_memory() -> Self {
        Self {
            env: Box::new(MemoryEnvironment::new()),
            ..Self::default()
        }
    }
}
