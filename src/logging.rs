//! Logging capability
//!
//! Readers and pipelines never log through process-wide state on their own. Each of them holds
//! a [`Logger`], which wraps any [`log::Log`] implementation and defaults to a sink discarding
//! everything. Use [`Logger::global`] to forward records to the logger installed by the
//! application (`env_logger`, `fern`, ...), or [`Logger::new`] to provide a dedicated sink.

use std::fmt;
use std::sync::Arc;

use log::{Level, LevelFilter, Log, Metadata, Record};

struct NoopLog;

impl Log for NoopLog {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        false
    }
    fn log(&self, _record: &Record) {}
    fn flush(&self) {}
}

/// Forwards to `log::logger()`, evaluated at each call
struct GlobalLog;

impl Log for GlobalLog {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level() && log::logger().enabled(metadata)
    }
    fn log(&self, record: &Record) {
        log::logger().log(record)
    }
    fn flush(&self) {
        log::logger().flush()
    }
}

/// A cheaply clonable handle on a log sink
#[derive(Clone)]
pub struct Logger {
    sink: Arc<dyn Log>,
    max_level: LevelFilter,
}

impl Logger {
    /// A logger discarding all records
    pub fn noop() -> Logger {
        Logger {
            sink: Arc::new(NoopLog),
            max_level: LevelFilter::Off,
        }
    }

    /// A logger forwarding to the logger installed with `log::set_logger`
    pub fn global() -> Logger {
        Logger {
            sink: Arc::new(GlobalLog),
            max_level: LevelFilter::Trace,
        }
    }

    /// A logger writing to `sink`
    pub fn new<L: Log + 'static>(sink: L) -> Logger {
        Logger::from_arc(Arc::new(sink))
    }

    pub fn from_arc(sink: Arc<dyn Log>) -> Logger {
        Logger {
            sink,
            max_level: LevelFilter::Trace,
        }
    }

    /// Drop records more verbose than `level` before they reach the sink
    pub fn with_max_level(mut self, level: LevelFilter) -> Logger {
        self.max_level = level;
        self
    }

    pub fn max_level(&self) -> LevelFilter {
        self.max_level
    }

    pub fn log(&self, level: Level, target: &'static str, args: fmt::Arguments) {
        if level > self.max_level {
            return;
        }
        let record = Record::builder()
            .args(args)
            .level(level)
            .target(target)
            .module_path_static(Some(target))
            .build();
        if self.sink.enabled(record.metadata()) {
            self.sink.log(&record);
        }
    }
}

impl Default for Logger {
    fn default() -> Self {
        Logger::noop()
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Logger")
            .field("max_level", &self.max_level)
            .finish()
    }
}

macro_rules! log_at {
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.log($level, module_path!(), format_args!($($arg)+))
    };
}

macro_rules! log_debug {
    ($logger:expr, $($arg:tt)+) => { log_at!($logger, ::log::Level::Debug, $($arg)+) };
}

macro_rules! log_info {
    ($logger:expr, $($arg:tt)+) => { log_at!($logger, ::log::Level::Info, $($arg)+) };
}

macro_rules! log_warn {
    ($logger:expr, $($arg:tt)+) => { log_at!($logger, ::log::Level::Warn, $($arg)+) };
}

macro_rules! log_error {
    ($logger:expr, $($arg:tt)+) => { log_at!($logger, ::log::Level::Error, $($arg)+) };
}
