//! Construction options.
//!
//! Options run in the order given, after timeout defaulting, and only touch
//! wrapper-level state. A later option overrides an earlier one that sets the
//! same field.

use std::fmt;
use std::sync::Arc;

use crate::observability::{Logger, StderrLogger};

/// Wrapper-level settings that options may change.
pub struct Options {
    pub(crate) logger: Arc<dyn Logger>,
}

impl Options {
    /// Replace the announcement logger.
    pub fn set_logger(&mut self, logger: Arc<dyn Logger>) {
        self.logger = logger;
    }
}

impl Default for Options {
    fn default() -> Self {
        Self {
            logger: Arc::new(StderrLogger::default()),
        }
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options").finish_non_exhaustive()
    }
}

/// One ordered mutation applied to [`Options`] at construction.
pub struct ServerOption(Box<dyn FnOnce(&mut Options) + Send>);

impl ServerOption {
    /// Build a custom option.
    pub fn new(apply: impl FnOnce(&mut Options) + Send + 'static) -> Self {
        Self(Box::new(apply))
    }

    pub(crate) fn apply(self, options: &mut Options) {
        (self.0)(options)
    }
}

impl fmt::Debug for ServerOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ServerOption")
    }
}

/// Use `logger` for the start and shutdown announcements.
///
/// The caller may keep its own handle to the logger.
pub fn with_logger(logger: Arc<dyn Logger>) -> ServerOption {
    ServerOption::new(move |options| options.set_logger(logger))
}

/// Apply options in order over the defaults.
pub(crate) fn apply_all(options: impl IntoIterator<Item = ServerOption>) -> Options {
    let mut resolved = Options::default();
    for option in options {
        option.apply(&mut resolved);
    }
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn recording(tag: &'static str, sink: Arc<Mutex<Vec<String>>>) -> Arc<dyn Logger> {
        Arc::new(move |args: fmt::Arguments<'_>| {
            sink.lock().unwrap().push(format!("{tag}:{args}"))
        })
    }

    #[test]
    fn later_option_wins() {
        let sink = Arc::new(Mutex::new(Vec::new()));
        let options = apply_all([
            with_logger(recording("first", sink.clone())),
            with_logger(recording("second", sink.clone())),
        ]);

        options.logger.log(format_args!("hello"));
        assert_eq!(*sink.lock().unwrap(), vec!["second:hello"]);
    }

    #[test]
    fn options_run_in_order() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let (a, b) = (order.clone(), order.clone());

        apply_all([
            ServerOption::new(move |_| a.lock().unwrap().push(1)),
            ServerOption::new(move |_| b.lock().unwrap().push(2)),
        ]);

        assert_eq!(*order.lock().unwrap(), vec![1, 2]);
    }

    #[test]
    fn caller_keeps_shared_logger() {
        let sink = Arc::new(Mutex::new(Vec::new()));
        let logger = recording("shared", sink.clone());

        let options = apply_all([with_logger(logger.clone())]);
        logger.log(format_args!("caller"));
        options.logger.log(format_args!("server"));

        assert_eq!(*sink.lock().unwrap(), vec!["shared:caller", "shared:server"]);
    }
}
