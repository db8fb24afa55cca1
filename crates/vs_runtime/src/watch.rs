//! Debug watches on variables.

use smallvec::SmallVec;
use vs_core::Name;

use crate::util::{FastHashMap, NameKey, fast_map_new};

/// Identity of the executing handler, used to match watches.
#[derive(Clone, Debug, Default)]
pub struct Frame {
    pub handler: Option<Name>,
    pub object: Option<String>,
}

impl Frame {
    pub fn new(handler: &str, object: Option<&str>) -> Self {
        Self {
            handler: Some(Name::new(handler)),
            object: object.map(str::to_string),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Watch {
    pub variable: Name,
    pub handler: Option<Name>,
    pub object: Option<String>,
    /// Expression that must evaluate to `true` for the watch to fire.
    pub guard: Option<String>,
}

impl Watch {
    pub fn new(variable: &str) -> Self {
        Self {
            variable: Name::new(variable),
            handler: None,
            object: None,
            guard: None,
        }
    }

    pub fn in_handler(mut self, handler: &str) -> Self {
        self.handler = Some(Name::new(handler));
        self
    }

    pub fn on_object(mut self, object: &str) -> Self {
        self.object = Some(object.to_string());
        self
    }

    pub fn when(mut self, guard: &str) -> Self {
        self.guard = Some(guard.to_string());
        self
    }

    fn applies(&self, is_global: bool, frame: &Frame) -> bool {
        if self.handler.is_none() && self.object.is_none() {
            return is_global;
        }
        let object_ok = match &self.object {
            None => true,
            Some(o) => frame.object.as_deref() == Some(o.as_str()),
        };
        let handler_ok = match &self.handler {
            None => true,
            Some(h) => frame.handler.as_ref() == Some(h),
        };
        object_ok && handler_ok
    }
}

/// Watches in insertion order, indexed by variable name.
#[derive(Default)]
pub struct WatchList {
    watches: Vec<Watch>,
    by_name: FastHashMap<Name, SmallVec<[usize; 2]>>,
}

impl WatchList {
    pub fn new() -> Self {
        Self {
            watches: Vec::new(),
            by_name: fast_map_new(),
        }
    }

    pub fn len(&self) -> usize {
        self.watches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.watches.is_empty()
    }

    pub fn add(&mut self, watch: Watch) {
        self.by_name
            .entry(watch.variable.clone())
            .or_default()
            .push(self.watches.len());
        self.watches.push(watch);
    }

    /// Drops every watch on `variable`.
    pub fn remove(&mut self, variable: &str) {
        self.watches.retain(|w| w.variable != *variable);
        self.reindex();
    }

    pub fn clear(&mut self) {
        self.watches.clear();
        self.by_name.clear();
    }

    fn reindex(&mut self) {
        self.by_name.clear();
        for (i, w) in self.watches.iter().enumerate() {
            self.by_name.entry(w.variable.clone()).or_default().push(i);
        }
    }

    /// The first watch on `variable` that applies in `frame`. A watch with
    /// neither handler nor object only applies to globals.
    pub fn matching(&self, variable: &str, is_global: bool, frame: &Frame) -> Option<&Watch> {
        let ids = self.by_name.get(&NameKey::new(variable))?;
        ids.iter()
            .map(|&i| &self.watches[i])
            .find(|w| w.applies(is_global, frame))
    }
}
