//! # dayroll
//!
//! dayroll is a leveled logger whose file output goes through a **rotating
//! file sink**. The sink appends each line to `<dir>/<filename>.<ext>` and
//! retires that file when the calendar day changes or when it grows past a
//! size threshold. Retired files are named after the day they were created
//! (`log-<day>-<month>-<year>.<ext>`), never overwrite an existing file, and
//! can be compressed into single-entry zip archives.
//!
//! Rotation is calendar-aligned: a file created at 23:59 is retired at the
//! first write after midnight, in the time zone the sink is configured with.
//! Lines written while the live file is missing are queued and written, in
//! order, before the next line once the file is back.
//!
//! ## Example
//!
//! ```rust,no_run
//! use {
//!     dayroll::{FileSink, MaxFileSize, TimeZone},
//!     std::io::Write,
//! };
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut sink = FileSink::builder()
//!         .dirname("logs")
//!         .filename("api")
//!         .max_file_size(MaxFileSize::mb(10.0))
//!         .time_zone(TimeZone::UTC)
//!         .zip_archive(true)
//!         .build()?;
//!
//!     sink.write("[10:00:00][INFO]: listening on :8080\n")?;
//!     writeln!(sink, "[10:00:01][WARN]: slow upstream")?;
//!     Ok(())
//! }
//! ```
//!
//! The [`Logger`] renders leveled lines for the console and hands the plain
//! version to its sink:
//!
//! ```rust,no_run
//! use dayroll::{Logger, LoggerOptions, LoggerOverrides, SinkConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let options = LoggerOptions::default().apply(LoggerOverrides {
//!         file: Some(SinkConfig::default()),
//!         ..LoggerOverrides::default()
//!     });
//!     let logger = Logger::new(options, None)?;
//!     logger.info("This is an info message")?;
//!     logger.error("This is an error message")?;
//!     Ok(())
//! }
//! ```

mod archive;
mod clock;
mod config;
mod error;
mod logger;
mod naming;
mod policy;
mod sink;

pub use {
    clock::{Clock, SystemClock},
    config::{
        MaxFileSize, SinkConfig, SizeUnit, TimeZone, DEFAULT_DIRNAME, DEFAULT_EXTENSION, DEFAULT_FILENAME,
        DEFAULT_FREQUENCY,
    },
    error::{ArchiveError, LoggerError, SinkError, TransportError},
    logger::{
        CallOptions, Color, Format, Level, Logger, LoggerOptions, LoggerOverrides, MessageOptions, MessageOverrides,
        Notification, NotifyLevels, NotifyOptions, Silent, Transport,
    },
    naming::{archive_entry_name, resolve_name, retired_stem, ARCHIVE_EXTENSION},
    policy::{is_size_rotation_due, HumanSize, RotationPolicy},
    sink::{FileSink, FileSinkBuilder, RetiredFile, SinkStatus},
};
