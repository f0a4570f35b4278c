//! Zip archival of retired log files.

use {
    crate::error::ArchiveError,
    std::{
        fs,
        io::{self, Write as _},
        path::Path,
    },
    zip::{write::SimpleFileOptions, CompressionMethod, ZipWriter},
};

/// Deflate level used for archives; the strongest one flate2 offers.
const ARCHIVE_LEVEL: i64 = 9;

/// Write `source` into a new single-entry zip archive at `archive`, storing it
/// as `entry_name`.
///
/// Returns once the archive writer has finished and the output file has been
/// flushed. `source` is left untouched; removing it is up to the caller, and
/// must only happen after this returns `Ok`.
pub(crate) fn write_archive(source: &Path, archive: &Path, entry_name: &str) -> Result<(), ArchiveError> {
    let mut reader = io::BufReader::new(fs::File::open(source)?);
    let outfile = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(archive)
        .map_err(ArchiveError::Create)?;

    let mut zip = ZipWriter::new(io::BufWriter::new(outfile));
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(ARCHIVE_LEVEL));
    zip.start_file(entry_name, options)?;
    io::copy(&mut reader, &mut zip)?;
    let mut writer = zip.finish()?;
    writer.flush()?;
    Ok(())
}
