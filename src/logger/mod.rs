use chrono::{SecondsFormat, Utc};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use crate::constants::LOG_PREFIX;

type SharedLogHandler = Arc<dyn Fn(LogLevel, &str) + Send + Sync + 'static>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        };
        f.write_str(label)
    }
}

/// Diagnostics logger for the analytics integration.
///
/// Every line carries the `[Umami Analytics]` prefix. Emission is suppressed
/// unless debug mode is on; `error_always` bypasses the gate for the one fault
/// path that must stay visible regardless of the flag.
#[derive(Clone)]
pub struct Logger {
    inner: Arc<LoggerInner>,
}

struct LoggerInner {
    debug: AtomicBool,
    handler: RwLock<SharedLogHandler>,
}

impl Logger {
    pub fn new(debug: bool) -> Self {
        Self {
            inner: Arc::new(LoggerInner {
                debug: AtomicBool::new(debug),
                handler: RwLock::new(default_log_handler_arc()),
            }),
        }
    }

    pub fn debug_enabled(&self) -> bool {
        self.inner.debug.load(Ordering::SeqCst)
    }

    /// Re-gates emission; called whenever a new configuration is resolved.
    pub fn set_debug(&self, enabled: bool) {
        self.inner.debug.store(enabled, Ordering::SeqCst);
    }

    pub fn set_log_handler<F>(&self, handler: F)
    where
        F: Fn(LogLevel, &str) + Send + Sync + 'static,
    {
        *self.inner.handler.write().unwrap() = Arc::new(handler);
    }

    pub fn reset_log_handler(&self) {
        *self.inner.handler.write().unwrap() = default_log_handler_arc();
    }

    pub fn info(&self, message: impl AsRef<str>) {
        self.dispatch(LogLevel::Info, message.as_ref(), false);
    }

    pub fn warn(&self, message: impl AsRef<str>) {
        self.dispatch(LogLevel::Warn, message.as_ref(), false);
    }

    pub fn error(&self, message: impl AsRef<str>) {
        self.dispatch(LogLevel::Error, message.as_ref(), false);
    }

    /// Emits at error severity even when debug mode is off.
    pub fn error_always(&self, message: impl AsRef<str>) {
        self.dispatch(LogLevel::Error, message.as_ref(), true);
    }

    fn dispatch(&self, level: LogLevel, message: &str, force: bool) {
        if !force && !self.debug_enabled() {
            return;
        }
        let handler = self.inner.handler.read().unwrap().clone();
        handler(level, message);
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new(false)
    }
}

fn default_log_handler_arc() -> SharedLogHandler {
    Arc::new(default_log_handler)
}

fn default_log_handler(level: LogLevel, message: &str) {
    let now = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    let line = format!("[{now}]  {LOG_PREFIX} {message}");

    match level {
        LogLevel::Warn | LogLevel::Error => eprintln!("{line}"),
        LogLevel::Info => println!("{line}"),
    }
}
