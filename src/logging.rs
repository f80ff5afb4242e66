use std::io::Write;

use log::{Level, LevelFilter, Log, Metadata, Record};

/// Severity of a message shown to the end user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }

    /// Parse a level name as written in settings files. Unknown names fall
    /// back to `Info`.
    pub fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "debug" | "trace" => LogLevel::Debug,
            "warn" | "warning" => LogLevel::Warn,
            "error" => LogLevel::Error,
            _ => LogLevel::Info,
        }
    }

    fn to_level_filter(self) -> LevelFilter {
        match self {
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Error => LevelFilter::Error,
        }
    }
}

/// End-user message and progress sink provided by the host.
///
/// Only `report` is required; the progress hooks default to no-ops so a
/// host without a progress bar can ignore them.
pub trait MessageSink {
    fn report(&mut self, level: LogLevel, message: &str);

    fn progress_begin(&mut self, _total: usize) {}

    fn progress_update(&mut self, _step: usize) {}

    fn progress_end(&mut self) {}
}

/// Sink that prints user messages to stderr.
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl MessageSink for ConsoleSink {
    fn report(&mut self, level: LogLevel, message: &str) {
        eprintln!("[{}] {}", level.as_str().to_uppercase(), message);
    }
}

/// Sink that records everything it receives.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub messages: Vec<(LogLevel, String)>,
    pub progress_total: Option<usize>,
    pub progress_steps: Vec<usize>,
    pub progress_finished: bool,
}

impl MemorySink {
    pub fn contains(&self, level: LogLevel, needle: &str) -> bool {
        self.messages
            .iter()
            .any(|(l, message)| *l == level && message.contains(needle))
    }
}

impl MessageSink for MemorySink {
    fn report(&mut self, level: LogLevel, message: &str) {
        self.messages.push((level, message.to_string()));
    }

    fn progress_begin(&mut self, total: usize) {
        self.progress_total = Some(total);
        self.progress_steps.clear();
        self.progress_finished = false;
    }

    fn progress_update(&mut self, step: usize) {
        self.progress_steps.push(step);
    }

    fn progress_end(&mut self) {
        self.progress_finished = true;
    }
}

struct ConsoleLogger {
    level: Level,
}

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(stderr, "[{}] {}", record.level(), record.args());
    }

    fn flush(&self) {}
}

/// Install the stderr logger used by the command line tool.
pub fn init_logging(level: LogLevel) {
    let filter = level.to_level_filter();
    let Some(max_level) = filter.to_level() else {
        return;
    };
    if log::set_boxed_logger(Box::new(ConsoleLogger { level: max_level })).is_err() {
        log::debug!("logger already initialized");
    }
    log::set_max_level(filter);
}
