//! The rotating file sink.
//!
//! A [`FileSink`] appends pre-formatted lines to `<dir>/<filename>.<ext>`.
//! After every append it asks the [`RotationPolicy`] whether the calendar day
//! has changed since the file was created, then whether the file has grown past
//! the size threshold. When either is due the live file is renamed to a
//! collision-free retired name, optionally zipped, and a fresh live file is
//! opened in its place.
//!
//! The sink assumes a single writer. It holds no lock; callers sharing a sink
//! serialize their calls themselves, as [`Logger`](crate::Logger) does. The
//! existence check that decides between appending and queueing is not atomic
//! with the append that follows it; another process removing the live file in
//! between is not detected.

use {
    crate::{
        archive::write_archive,
        clock::{Clock, SystemClock},
        config::{MaxFileSize, SinkConfig, TimeZone},
        error::{ArchiveError, SinkError},
        naming::{self, archive_entry_name, resolve_name, retired_stem, ARCHIVE_EXTENSION},
        policy::RotationPolicy,
    },
    chrono::{DateTime, Utc},
    std::{
        collections::VecDeque,
        fs::{self, Metadata},
        io::{self, Write as _},
        path::{Path, PathBuf},
        sync::Arc,
    },
    tracing::{debug, error, info, warn},
};

/// Observable state of a [`FileSink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkStatus {
    /// The live file is missing; writes are queued.
    Uninitialized,
    /// The live file is open for appending.
    Ready,
    /// A rotation is in progress, or the last one left no live file open.
    Rotating,
}

/// What a rotation left behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetiredFile {
    /// The renamed log file.
    Plain(PathBuf),
    /// The zip archive holding the renamed log file, which has been removed.
    Archive(PathBuf),
}

impl RetiredFile {
    pub fn path(&self) -> &Path {
        match self {
            RetiredFile::Plain(path) | RetiredFile::Archive(path) => path,
        }
    }
}

/// The open live file.
#[derive(Debug)]
struct ActiveFile {
    file: fs::File,
    /// When this handle was opened; stands in for the creation time on
    /// filesystems that do not record one.
    opened_at: DateTime<Utc>,
}

impl ActiveFile {
    /// Open `path` for appending, creating it, and its parent directory when
    /// necessary.
    fn open(path: &Path, now: DateTime<Utc>) -> Result<Self, SinkError> {
        let mut open_options = fs::OpenOptions::new();
        open_options.append(true).create(true);

        let mut open_res = open_options.open(path);
        if open_res.is_err() {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).map_err(|source| SinkError::DirectoryUnavailable {
                    path: parent.to_path_buf(),
                    source,
                })?;
                open_res = open_options.open(path);
            }
        }

        let file = open_res.map_err(|source| SinkError::CreateFile {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(ActiveFile { file, opened_at: now })
    }

    fn append(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.file.write_all(bytes)
    }
}

#[derive(Debug)]
enum SinkState {
    Uninitialized,
    Ready(ActiveFile),
    Rotating,
}

/// Creation time recorded by the filesystem, if it records one.
fn birth_time(metadata: &Metadata) -> Option<DateTime<Utc>> {
    metadata.created().ok().map(DateTime::<Utc>::from)
}

fn read_metadata(path: &Path) -> Result<Metadata, SinkError> {
    fs::metadata(path).map_err(|source| SinkError::Metadata {
        path: path.to_path_buf(),
        source,
    })
}

/// Zip `plain` into `archive` and remove `plain` once the archive is finished.
///
/// On failure `plain` is left on disk and any partial archive is removed.
fn archive_retired(plain: &Path, archive: &Path, entry_name: &str) -> Result<RetiredFile, SinkError> {
    if let Err(source) = write_archive(plain, archive, entry_name) {
        // A failed create left nothing of ours at `archive`.
        if !matches!(source, ArchiveError::Create(_)) && archive.exists() {
            if let Err(err) = fs::remove_file(archive) {
                warn!(archive = %archive.display(), %err, "failed to remove partial archive");
            }
        }
        return Err(SinkError::Archive {
            plain: plain.to_path_buf(),
            archive: archive.to_path_buf(),
            source,
        });
    }
    if let Err(err) = fs::remove_file(plain) {
        // The archive is complete; an extra plain copy loses nothing.
        warn!(retired = %plain.display(), %err, "failed to remove archived log file");
    }
    Ok(RetiredFile::Archive(archive.to_path_buf()))
}

/// A log file sink that retires its file when the day changes or the file
/// grows past a threshold.
///
/// # Examples
/// ```no_run
/// use dayroll::{FileSink, MaxFileSize};
///
/// let mut sink = FileSink::builder()
///     .absolute_path("/var/log/my-app")
///     .filename("api")
///     .max_file_size(MaxFileSize::mb(10.0))
///     .zip_archive(true)
///     .build()?;
/// sink.write("[12:00:00][INFO]: service started\n")?;
/// # Ok::<(), dayroll::SinkError>(())
/// ```
#[derive(Debug)]
pub struct FileSink {
    config: SinkConfig,
    policy: RotationPolicy,
    clock: Arc<dyn Clock>,
    directory: PathBuf,
    current_path: PathBuf,
    state: SinkState,
    pending: VecDeque<Vec<u8>>,
}

impl FileSink {
    /// Open a sink with the given configuration and the system clock.
    pub fn open(config: SinkConfig) -> Result<Self, SinkError> {
        FileSinkBuilder::from_config(config).build()
    }

    pub fn builder() -> FileSinkBuilder {
        FileSinkBuilder::new()
    }

    pub fn config(&self) -> &SinkConfig {
        &self.config
    }

    /// The directory holding the live and retired files.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// The canonical path of the live log file.
    pub fn current_path(&self) -> &Path {
        &self.current_path
    }

    /// Number of lines waiting for the live file to exist.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn state(&self) -> SinkStatus {
        match self.state {
            SinkState::Uninitialized => SinkStatus::Uninitialized,
            SinkState::Ready(_) => SinkStatus::Ready,
            SinkState::Rotating => SinkStatus::Rotating,
        }
    }

    /// Append `line` to the live file.
    ///
    /// When the live file does not exist the line is queued and the sink tries
    /// to recreate the file; if that works the queue is written out at once.
    /// Otherwise queued lines are written first, oldest first, then `line`,
    /// and the rotation checks run: the date check first, then the size check.
    ///
    /// Lines still queued when the sink is dropped are written if the live
    /// file can be brought back by then.
    ///
    /// `line` is written as given; it should carry its own line terminator.
    ///
    /// # Errors
    /// Write failures, and any error of a rotation this write triggered. A
    /// rotation runs after the line was appended, so the line is already in
    /// the file the rotation retires.
    pub fn write(&mut self, line: &str) -> Result<(), SinkError> {
        self.write_bytes(line.as_bytes())
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), SinkError> {
        if !self.current_path.exists() {
            self.pending.push_back(bytes.to_vec());
            debug!(path = %self.current_path.display(), queued = self.pending.len(), "live log file missing, line queued");
            self.state = SinkState::Uninitialized;
            self.recreate();
            if matches!(self.state, SinkState::Ready(_)) {
                self.drain_pending()?;
            }
            return Ok(());
        }

        self.drain_pending()?;
        let SinkState::Ready(active) = &mut self.state else {
            return Err(SinkError::CreateFile {
                path: self.current_path.clone(),
                source: io::Error::other("live log file is not open"),
            });
        };
        active.append(bytes)?;

        self.check_rotation()
    }

    /// Write out queued lines, recreating the live file first when it is
    /// missing. Lines stay queued while it cannot be recreated.
    fn settle_pending(&mut self) -> Result<(), SinkError> {
        if !self.current_path.exists() {
            if self.pending.is_empty() {
                return Ok(());
            }
            self.recreate();
            if !matches!(self.state, SinkState::Ready(_)) {
                return Ok(());
            }
        }
        self.drain_pending()
    }

    /// Write out queued lines if the live file exists, opening it when the
    /// sink is not ready.
    fn drain_pending(&mut self) -> Result<(), SinkError> {
        if !matches!(self.state, SinkState::Ready(_)) {
            self.state = SinkState::Ready(ActiveFile::open(&self.current_path, self.clock.now())?);
        }
        let SinkState::Ready(active) = &mut self.state else {
            return Ok(());
        };
        if !self.pending.is_empty() {
            debug!(path = %self.current_path.display(), queued = self.pending.len(), "draining queued lines");
        }
        while let Some(queued) = self.pending.pop_front() {
            if let Err(err) = active.append(&queued) {
                self.pending.push_front(queued);
                return Err(err.into());
            }
        }
        Ok(())
    }

    /// Try to bring the live file back after it went missing.
    fn recreate(&mut self) {
        match ActiveFile::open(&self.current_path, self.clock.now()) {
            Ok(active) => {
                info!(path = %self.current_path.display(), "recreated live log file");
                self.state = SinkState::Ready(active);
            }
            Err(err) => debug!(%err, "live log file not recreated yet"),
        }
    }

    fn check_rotation(&mut self) -> Result<(), SinkError> {
        let now = self.clock.now();
        if self.policy.is_date_rotation_due(self.created_at()?, now) {
            self.rotate()?;
        }
        let size = read_metadata(&self.current_path)?.len();
        if self.policy.is_size_rotation_due(size) {
            self.rotate()?;
        }
        Ok(())
    }

    /// Creation time of the live file, read from the filesystem every time.
    fn created_at(&self) -> Result<DateTime<Utc>, SinkError> {
        let metadata = read_metadata(&self.current_path)?;
        Ok(birth_time(&metadata)
            .or_else(|| match &self.state {
                SinkState::Ready(active) => Some(active.opened_at),
                _ => None,
            })
            .or_else(|| metadata.modified().ok().map(DateTime::<Utc>::from))
            .unwrap_or_else(|| self.clock.now()))
    }

    /// Retire the live file and open a fresh one.
    ///
    /// The live file is renamed to `log-<d>-<m>-<y>[<filename>].<ext>` after
    /// its creation date, with `-1`, `-2`, ... added on collision. With zip
    /// archival enabled it is then archived to the matching `.zip` name and
    /// removed once the archive is complete. Finally a new live file is
    /// created.
    ///
    /// # Errors
    /// * [`SinkError::Rename`] when the live file cannot be renamed. It stays
    ///   in place and the sink keeps appending to it.
    /// * [`SinkError::Archive`] when archiving fails. The plain retired file
    ///   is kept and the fresh live file is open; nothing was lost.
    pub fn rotate(&mut self) -> Result<RetiredFile, SinkError> {
        let created_at = self.created_at();
        let previous = std::mem::replace(&mut self.state, SinkState::Rotating);
        let created_at = match created_at {
            Ok(created_at) => created_at,
            Err(err) => {
                self.state = previous;
                return Err(err);
            }
        };
        // Close the handle before renaming the file under it.
        drop(previous);

        let stem = retired_stem(&self.config, self.config.time_zone.date_of(created_at));
        let plain = resolve_name(&self.directory.join(format!("{stem}.{}", self.config.extension)));
        if let Err(source) = fs::rename(&self.current_path, &plain) {
            error!(path = %self.current_path.display(), retired = %plain.display(), %source, "failed to retire log file");
            self.reopen();
            return Err(SinkError::Rename {
                from: self.current_path.clone(),
                to: plain,
                source,
            });
        }

        let retired = if self.config.zip_archive {
            let archive = resolve_name(&self.directory.join(format!("{stem}.{ARCHIVE_EXTENSION}")));
            let entry_name = archive_entry_name(&archive, &self.config.extension);
            archive_retired(&plain, &archive, &entry_name)
        } else {
            Ok(RetiredFile::Plain(plain))
        };

        self.state = SinkState::Ready(ActiveFile::open(&self.current_path, self.clock.now())?);

        match &retired {
            Ok(file) => info!(retired = %file.path().display(), "rotated log file"),
            Err(err) => error!(%err, "rotated log file but archiving failed"),
        }
        retired
    }

    /// Reopen the live file after a failed rotation left it in place.
    fn reopen(&mut self) {
        self.state = match ActiveFile::open(&self.current_path, self.clock.now()) {
            Ok(active) => SinkState::Ready(active),
            Err(err) => {
                warn!(%err, "failed to reopen live log file");
                SinkState::Uninitialized
            }
        };
    }

    /// Retired files of this sink currently in its directory, plain and
    /// archived, oldest date first.
    pub fn retired_files(&self) -> Result<Vec<PathBuf>, SinkError> {
        naming::list_retired(&self.directory, &self.config)
    }
}

impl io::Write for FileSink {
    /// Each buffer is appended unchanged, as one line.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_bytes(buf).map_err(io::Error::other)?;
        Ok(buf.len())
    }

    /// Writes out queued lines, recreating the live file if it is missing.
    fn flush(&mut self) -> io::Result<()> {
        self.settle_pending().map_err(io::Error::other)?;
        if let SinkState::Ready(active) = &mut self.state {
            active.file.flush()?;
        }
        Ok(())
    }
}

impl Drop for FileSink {
    fn drop(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        if let Err(err) = self.settle_pending() {
            warn!(%err, "failed to write queued lines on drop");
        }
        if !self.pending.is_empty() {
            error!(path = %self.current_path.display(), lost = self.pending.len(), "dropping sink with queued lines");
        }
    }
}

/// Fluent configuration of a [`FileSink`].
///
/// Defaults: directory `logs` under the working directory, live file
/// `current.log`, daily rotation in the local time zone, no size threshold,
/// no archival.
///
/// # Examples
/// ```no_run
/// use dayroll::{FileSinkBuilder, MaxFileSize, TimeZone};
///
/// let sink = FileSinkBuilder::new()
///     .dirname("logs")
///     .filename("worker")
///     .extension("txt")
///     .max_file_size(MaxFileSize::kb(512.0))
///     .time_zone(TimeZone::UTC)
///     .build()?;
/// # Ok::<(), dayroll::SinkError>(())
/// ```
#[derive(Debug, Clone)]
pub struct FileSinkBuilder {
    config: SinkConfig,
    clock: Arc<dyn Clock>,
}

impl Default for FileSinkBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSinkBuilder {
    pub fn new() -> Self {
        Self::from_config(SinkConfig::default())
    }

    pub fn from_config(config: SinkConfig) -> Self {
        FileSinkBuilder {
            config,
            clock: Arc::new(SystemClock),
        }
    }

    /// Set the directory name, relative to the root directory.
    pub fn dirname(self, dirname: impl Into<String>) -> Self {
        Self {
            config: SinkConfig {
                dirname: dirname.into(),
                ..self.config
            },
            ..self
        }
    }

    /// Set the base filename of the live file.
    pub fn filename(self, filename: impl Into<String>) -> Self {
        Self {
            config: SinkConfig {
                filename: filename.into(),
                ..self.config
            },
            ..self
        }
    }

    pub fn extension(self, extension: impl Into<String>) -> Self {
        Self {
            config: SinkConfig {
                extension: extension.into(),
                ..self.config
            },
            ..self
        }
    }

    /// Rotate when the live file reaches this size.
    pub fn max_file_size(self, max_file_size: MaxFileSize) -> Self {
        Self {
            config: SinkConfig {
                max_file_size: Some(max_file_size),
                ..self.config
            },
            ..self
        }
    }

    /// Zip retired files.
    pub fn zip_archive(self, zip_archive: bool) -> Self {
        Self {
            config: SinkConfig {
                zip_archive,
                ..self.config
            },
            ..self
        }
    }

    /// Set the root directory the directory name is resolved against.
    pub fn absolute_path(self, root: impl Into<PathBuf>) -> Self {
        Self {
            config: SinkConfig {
                absolute_path: Some(root.into()),
                ..self.config
            },
            ..self
        }
    }

    /// Set the time zone whose calendar decides when a day ends.
    pub fn time_zone(self, time_zone: TimeZone) -> Self {
        Self {
            config: SinkConfig {
                time_zone,
                ..self.config
            },
            ..self
        }
    }

    pub fn clock(self, clock: impl Clock + 'static) -> Self {
        Self {
            clock: Arc::new(clock),
            ..self
        }
    }

    /// Open the sink.
    ///
    /// Creates the directory if needed. If a live file from an earlier day is
    /// already there, it is rotated before the sink accepts writes.
    pub fn build(self) -> Result<FileSink, SinkError> {
        self.config.validate()?;
        let directory = self.config.directory()?;
        fs::create_dir_all(&directory).map_err(|source| SinkError::DirectoryUnavailable {
            path: directory.clone(),
            source,
        })?;
        let current_path = directory.join(self.config.live_file_name());

        let mut sink = FileSink {
            policy: RotationPolicy::new(self.config.time_zone, self.config.max_file_size),
            config: self.config,
            clock: self.clock,
            directory,
            current_path,
            state: SinkState::Uninitialized,
            pending: VecDeque::new(),
        };

        if sink.current_path.exists() {
            let created_at = sink.created_at()?;
            if sink.policy.is_date_rotation_due(created_at, sink.clock.now()) {
                debug!(path = %sink.current_path.display(), "live log file is from an earlier day");
                match sink.rotate() {
                    Ok(_) => {}
                    // The retired file is on disk and the fresh live file is open.
                    Err(SinkError::Archive { plain, .. }) => {
                        warn!(retired = %plain.display(), "opened sink with an unarchived retired file")
                    }
                    Err(err) => return Err(err),
                }
            }
        }
        if !matches!(sink.state, SinkState::Ready(_)) {
            sink.state = SinkState::Ready(ActiveFile::open(&sink.current_path, sink.clock.now())?);
        }
        Ok(sink)
    }
}

#[cfg(test)]
mod tests {
    use {super::*, tempfile::TempDir};

    #[test]
    fn archive_failure_keeps_plain_file() {
        let dir = TempDir::new().unwrap();
        let plain = dir.path().join("log-1-1-2024.log");
        fs::write(&plain, "kept\n").unwrap();
        let archive = dir.path().join("missing").join("log-1-1-2024.zip");

        let err = archive_retired(&plain, &archive, "log-1-1-2024.log").unwrap_err();
        assert!(matches!(err, SinkError::Archive { .. }));
        assert_eq!(fs::read_to_string(&plain).unwrap(), "kept\n");
        assert!(!archive.exists());
    }

    #[test]
    fn archive_success_removes_plain_file() {
        let dir = TempDir::new().unwrap();
        let plain = dir.path().join("log-1-1-2024.log");
        fs::write(&plain, "archived\n").unwrap();
        let archive = dir.path().join("log-1-1-2024.zip");

        let retired = archive_retired(&plain, &archive, "log-1-1-2024.log").unwrap();
        assert_eq!(retired, RetiredFile::Archive(archive.clone()));
        assert!(archive.exists());
        assert!(!plain.exists());
    }

    #[test]
    fn open_creates_missing_parent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a").join("b").join("current.log");
        let mut active = ActiveFile::open(&path, Utc::now()).unwrap();
        active.append(b"x\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "x\n");
    }

    #[test]
    fn rotate_without_live_file_fails_cleanly() {
        let dir = TempDir::new().unwrap();
        let mut sink = FileSink::builder().absolute_path(dir.path()).build().unwrap();
        fs::remove_file(sink.current_path()).unwrap();

        assert!(matches!(sink.rotate(), Err(SinkError::Metadata { .. })));
        assert_eq!(sink.state(), SinkStatus::Ready);
        assert!(sink.retired_files().unwrap().is_empty());
    }

    #[test]
    fn failed_rename_keeps_appending_to_live_file() {
        let dir = TempDir::new().unwrap();
        let mut sink = FileSink::builder().absolute_path(dir.path()).build().unwrap();
        sink.write("before\n").unwrap();
        let live = sink.current_path().to_path_buf();
        // Retired names resolve into a directory that does not exist.
        sink.directory = dir.path().join("gone");

        let err = sink.rotate().unwrap_err();
        assert!(matches!(err, SinkError::Rename { ref from, .. } if *from == live));
        assert_eq!(sink.state(), SinkStatus::Ready);

        sink.write("after\n").unwrap();
        assert_eq!(fs::read_to_string(&live).unwrap(), "before\nafter\n");
    }

    #[derive(Debug)]
    struct NextDay;

    impl Clock for NextDay {
        fn now(&self) -> DateTime<Utc> {
            Utc::now() + chrono::Duration::days(1)
        }
    }

    #[cfg(unix)]
    #[test]
    fn open_survives_failed_archive_of_stale_file() {
        let dir = TempDir::new().unwrap();
        let logs = dir.path().join("logs");
        fs::create_dir(&logs).unwrap();
        fs::write(logs.join("current.log"), "yesterday\n").unwrap();
        let stem = retired_stem(&SinkConfig::default(), Utc::now().date_naive());
        // A dangling link is not seen by the name probe but blocks `create_new`.
        let taken = logs.join(format!("{stem}.zip"));
        std::os::unix::fs::symlink(dir.path().join("nowhere"), &taken).unwrap();

        let sink = FileSink::builder()
            .absolute_path(dir.path())
            .time_zone(TimeZone::UTC)
            .zip_archive(true)
            .clock(NextDay)
            .build()
            .unwrap();

        assert_eq!(sink.state(), SinkStatus::Ready);
        assert_eq!(fs::read_to_string(sink.current_path()).unwrap(), "");
        assert_eq!(
            fs::read_to_string(logs.join(format!("{stem}.log"))).unwrap(),
            "yesterday\n"
        );
        assert!(fs::symlink_metadata(&taken).unwrap().file_type().is_symlink());
    }

    #[test]
    fn archive_cleanup_leaves_foreign_file_alone() {
        let dir = TempDir::new().unwrap();
        let plain = dir.path().join("log-1-1-2024.log");
        fs::write(&plain, "kept\n").unwrap();
        let archive = dir.path().join("log-1-1-2024.zip");
        fs::write(&archive, "someone else's").unwrap();

        let err = archive_retired(&plain, &archive, "log-1-1-2024.log").unwrap_err();
        assert!(matches!(err, SinkError::Archive { source: ArchiveError::Create(_), .. }));
        assert_eq!(fs::read_to_string(&archive).unwrap(), "someone else's");
        assert_eq!(fs::read_to_string(&plain).unwrap(), "kept\n");
    }
}
