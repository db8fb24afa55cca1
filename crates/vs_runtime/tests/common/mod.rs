#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use vs_runtime::{
    Capabilities, DebugHook, ExecContext, Frame, MemoryEnvironment, StoreConfig, StoreResult,
    Value, WatchList,
};

/// One `notify` call seen by [`RecordingHook`].
#[derive(Clone, Debug, PartialEq)]
pub struct Notification {
    pub variable: String,
    pub handler: Option<String>,
    pub object: Option<String>,
    pub value: Value,
}

pub type Log = Rc<RefCell<Vec<Notification>>>;

pub struct RecordingHook {
    pub log: Log,
    pub guard: StoreResult<Value>,
}

impl RecordingHook {
    pub fn new(guard: StoreResult<Value>) -> (Self, Log) {
        let log = Log::default();
        (
            Self {
                log: Rc::clone(&log),
                guard,
            },
            log,
        )
    }
}

impl DebugHook for RecordingHook {
    fn evaluate_guard(&mut self, _expression: &str, _frame: &Frame) -> StoreResult<Value> {
        self.guard.clone()
    }

    fn notify(
        &mut self,
        variable: &str,
        handler: Option<&str>,
        object: Option<&str>,
        value: &Value,
    ) -> StoreResult<()> {
        self.log.borrow_mut().push(Notification {
            variable: variable.to_string(),
            handler: handler.map(str::to_string),
            object: object.map(str::to_string),
            value: value.clone(),
        });
        Ok(())
    }
}

/// Owns everything an [`ExecContext`] borrows.
pub struct Harness {
    pub caps: Capabilities,
    pub watches: WatchList,
    pub config: StoreConfig,
    pub frame: Frame,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            caps: Capabilities::in_memory(),
            watches: WatchList::new(),
            config: StoreConfig::default(),
            frame: Frame::default(),
        }
    }

    pub fn with_env(vars: &[(&str, &str)]) -> Self {
        let mut h = Self::new();
        h.caps.env = Box::new(MemoryEnvironment::with(vars.iter().copied()));
        h
    }

    pub fn hook(&mut self, guard: StoreResult<Value>) -> Log {
        let (hook, log) = RecordingHook::new(guard);
        self.caps.debug = Some(Box::new(hook));
        log
    }

    pub fn env(&self, name: &str) -> Option<String> {
        self.caps.env.get(name)
    }

    pub fn ctx(&mut self) -> ExecContext<'_> {
        ExecContext::new(&mut self.caps, &self.watches, &self.config, &self.frame)
    }
}

pub fn text(v: &Value) -> String {
    v.to_text().unwrap().into_string()
}
