use vs_core::{Name, Value};

use crate::capabilities::Capabilities;
use crate::config::StoreConfig;
use crate::watch::{Frame, WatchList};

/// Everything a variable mutation needs besides the variable itself.
pub struct ExecContext<'a> {
    pub caps: &'a mut Capabilities,
    pub watches: &'a WatchList,
    pub config: &'a StoreConfig,
    pub frame: &'a Frame,
}

impl<'a> ExecContext<'a> {
    pub fn new(
        caps: &'a mut Capabilities,
        watches: &'a WatchList,
        config: &'a StoreConfig,
        frame: &'a Frame,
    ) -> Self {
        Self {
            caps,
            watches,
            config,
            frame,
        }
    }

    /// Runs the debug hook for the first watch matching `variable`. Guard and
    /// hook failures are logged and dropped.
    pub fn notify_watch(&mut self, variable: &Name, is_global: bool, value: &Value) {
        if !self.config.notify_watches || self.watches.is_empty() {
            return;
        }
        let Some(hook) = self.caps.debug.as_deref_mut() else {
            return;
        };
        let Some(watch) = self.watches.matching(variable.as_str(), is_global, self.frame) else {
            return;
        };
        if let Some(guard) = &watch.guard {
            let passed = hook
                .evaluate_guard(guard, self.frame)
                .and_then(|v| v.to_boolean().map_err(Into::into));
            match passed {
                Ok(true) => {}
                Ok(false) => return,
                Err(err) => {
                    tracing::debug!(%err, guard = guard.as_str(), "watch guard failed");
                    return;
                }
            }
        }
        let handler = self.frame.handler.as_ref().map(Name::as_str);
        let object = self.frame.object.as_deref();
        if let Err(err) = hook.notify(variable.as_str(), handler, object, value) {
            tracing::debug!(%err, variable = variable.as_str(), "watch hook failed");
        }
    }
}
