//! Leveled logger writing to the console, an optional [`FileSink`] and an
//! optional notification [`Transport`].

mod format;
mod level;
mod notify;
mod options;

pub use {
    format::Color,
    level::Level,
    notify::{Notification, NotifyLevels, NotifyOptions, Transport},
    options::{Format, LoggerOptions, LoggerOverrides, MessageOptions, MessageOverrides, Silent},
};

use {
    crate::{error::LoggerError, sink::FileSink},
    format::{source_file_name, LineFormatter, Target},
    std::{
        fmt,
        io::{self, Write},
        panic::Location,
        sync::{Arc, Mutex, PoisonError},
    },
};

/// Per-call switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallOptions {
    /// Print to the console even when the level is silenced.
    pub force: bool,
    /// Send a notification for this call.
    pub notify: bool,
}

/// A leveled logger.
///
/// Every call renders one line. The line goes to the console unless the level
/// is silenced, to the file sink when one is configured, and to the transport
/// when a notification is requested by the call or selected by level.
///
/// The file sink is behind a mutex, so a `Logger` may be shared between
/// threads; the sink itself still sees one write at a time.
///
/// # Examples
/// ```no_run
/// use dayroll::{Logger, LoggerOptions, LoggerOverrides, SinkConfig};
///
/// let options = LoggerOptions::default().apply(LoggerOverrides {
///     file: Some(SinkConfig::default()),
///     ..LoggerOverrides::default()
/// });
/// let logger = Logger::new(options, None)?;
/// logger.info("service started")?;
/// logger.warn("cache miss rate above 20%")?;
/// # Ok::<(), dayroll::LoggerError>(())
/// ```
pub struct Logger {
    options: LoggerOptions,
    transport: Option<Arc<dyn Transport>>,
    sink: Option<Mutex<FileSink>>,
    console: Mutex<Box<dyn Write + Send>>,
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("options", &self.options)
            .field("transport", &self.transport)
            .field("sink", &self.sink)
            .finish_non_exhaustive()
    }
}

impl Logger {
    /// Create a logger, opening its file sink when `options.file` is set.
    pub fn new(options: LoggerOptions, transport: Option<Arc<dyn Transport>>) -> Result<Self, LoggerError> {
        let sink = match &options.file {
            Some(config) => Some(Mutex::new(FileSink::open(config.clone())?)),
            None => None,
        };
        Ok(Logger {
            options,
            transport,
            sink,
            console: Mutex::new(Box::new(io::stdout())),
        })
    }

    /// Send console output to `console` instead of stdout.
    pub fn with_console(self, console: impl Write + Send + 'static) -> Self {
        Self {
            console: Mutex::new(Box::new(console)),
            ..self
        }
    }

    /// Use an already opened sink instead of the one `options.file` describes.
    pub fn with_sink(self, sink: FileSink) -> Self {
        Self {
            sink: Some(Mutex::new(sink)),
            ..self
        }
    }

    /// The effective options.
    pub fn config(&self) -> &LoggerOptions {
        &self.options
    }

    /// Create a new logger from these options with `overrides` applied.
    ///
    /// The transport is shared. A file sink is opened anew from the merged
    /// options; pointing it at the same live file as this logger's sink
    /// breaks the single-writer assumption.
    pub fn duplicate(&self, overrides: LoggerOverrides) -> Result<Logger, LoggerError> {
        Logger::new(self.options.apply(overrides), self.transport.clone())
    }

    /// Log `message` at `level`.
    ///
    /// The console, the file sink and the transport are tried independently:
    /// a failing console does not keep the line out of the file.
    ///
    /// # Errors
    /// The first of: a console write failure, a file write or rotation
    /// failure, a notification requested without a transport, and a transport
    /// failure.
    #[track_caller]
    pub fn log(&self, level: Level, message: &str, call: CallOptions) -> Result<(), LoggerError> {
        let source = source_file_name(Location::caller().file());
        let console = self.print(level, message, source, call);
        let file = self.print_file(level, message, source);
        let notification = self.notify(level, message, source, call);
        console.and(file).and(notification)
    }

    fn print(&self, level: Level, message: &str, source: &str, call: CallOptions) -> Result<(), LoggerError> {
        if !call.force && self.options.silent.silences(level) {
            return Ok(());
        }
        let line = LineFormatter::new(&self.options, Target::Console).line(level, message, source);
        let mut console = self.console.lock().unwrap_or_else(PoisonError::into_inner);
        console.write_all(line.as_bytes()).map_err(LoggerError::Console)
    }

    fn print_file(&self, level: Level, message: &str, source: &str) -> Result<(), LoggerError> {
        let Some(sink) = &self.sink else {
            return Ok(());
        };
        let line = LineFormatter::new(&self.options, Target::Plain).line(level, message, source);
        sink.lock().unwrap_or_else(PoisonError::into_inner).write(&line)?;
        Ok(())
    }

    fn notify(&self, level: Level, message: &str, source: &str, call: CallOptions) -> Result<(), LoggerError> {
        let Some(notify) = &self.options.notify else {
            return Ok(());
        };
        if !call.notify && !notify.levels.selects(level) {
            return Ok(());
        }
        let transport = self.transport.as_ref().ok_or(LoggerError::NotificationTransportMissing)?;
        let text = LineFormatter::new(&self.options, Target::Plain).line(level, message, source);
        transport
            .send(&notify.notification(level, text))
            .map_err(LoggerError::Notification)
    }

    #[track_caller]
    pub fn error(&self, message: &str) -> Result<(), LoggerError> {
        self.log(Level::Error, message, CallOptions::default())
    }

    #[track_caller]
    pub fn warn(&self, message: &str) -> Result<(), LoggerError> {
        self.log(Level::Warn, message, CallOptions::default())
    }

    #[track_caller]
    pub fn info(&self, message: &str) -> Result<(), LoggerError> {
        self.log(Level::Info, message, CallOptions::default())
    }

    #[track_caller]
    pub fn http(&self, message: &str) -> Result<(), LoggerError> {
        self.log(Level::Http, message, CallOptions::default())
    }

    #[track_caller]
    pub fn verbose(&self, message: &str) -> Result<(), LoggerError> {
        self.log(Level::Verbose, message, CallOptions::default())
    }

    #[track_caller]
    pub fn debug(&self, message: &str) -> Result<(), LoggerError> {
        self.log(Level::Debug, message, CallOptions::default())
    }

    #[track_caller]
    pub fn silly(&self, message: &str) -> Result<(), LoggerError> {
        self.log(Level::Silly, message, CallOptions::default())
    }

    /// Print an empty line, unless the console is silenced entirely or for
    /// some levels.
    pub fn line_break(&self) -> Result<(), LoggerError> {
        if self.options.silent != Silent::Flag(false) {
            return Ok(());
        }
        let mut console = self.console.lock().unwrap_or_else(PoisonError::into_inner);
        console.write_all(b"\n").map_err(LoggerError::Console)
    }
}
