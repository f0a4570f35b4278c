//! Names of retired log files.
//!
//! A retired file is named `log-<day>-<month>-<year><suffix>.<extension>`,
//! where `<suffix>` is the base filename of a non-default sink. When the name
//! is taken, `-1`, `-2`, ... is inserted before the extension until a free
//! name is found.

use {
    crate::{config::SinkConfig, error::SinkError},
    chrono::{Datelike, NaiveDate},
    regex::Regex,
    std::{
        fs,
        path::{Path, PathBuf},
    },
};

/// Extension of archived retired files.
pub const ARCHIVE_EXTENSION: &str = "zip";

/// Build the retired file name for `date`, without extension.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use dayroll::{retired_stem, SinkConfig};
///
/// let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
/// assert_eq!(retired_stem(&SinkConfig::default(), date), "log-5-1-2024");
///
/// let named = SinkConfig { filename: "api".to_string(), ..SinkConfig::default() };
/// assert_eq!(retired_stem(&named, date), "log-5-1-2024api");
/// ```
pub fn retired_stem(config: &SinkConfig, date: NaiveDate) -> String {
    let suffix = if config.needs_custom_name() {
        config.filename.as_str()
    } else {
        ""
    };
    format!("log-{}-{}-{}{suffix}", date.day(), date.month(), date.year())
}

/// Return `path` if nothing exists there, otherwise the first
/// `<stem>-<n>.<ext>` sibling (n = 1, 2, ...) that does not exist.
///
/// The probe is linear in the number of earlier collisions for the same name.
pub fn resolve_name(path: &Path) -> PathBuf {
    if !path.exists() {
        return path.to_path_buf();
    }
    let stem = path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
    let extension = path.extension().map(|e| format!(".{}", e.to_string_lossy())).unwrap_or_default();
    let parent = path.parent().unwrap_or_else(|| Path::new(""));
    let mut index = 1usize;
    loop {
        let candidate = parent.join(format!("{stem}-{index}{extension}"));
        if !candidate.exists() {
            return candidate;
        }
        index += 1;
    }
}

/// Name of the single entry stored in `archive`: the archive's own file name
/// with the log extension in place of `.zip`.
pub fn archive_entry_name(archive: &Path, extension: &str) -> String {
    let stem = archive.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
    format!("{stem}.{extension}")
}

/// A retired artifact found on disk, with the parts of its name that order it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct RetiredEntry {
    date: NaiveDate,
    index: usize,
    path: PathBuf,
}

/// Regex matching the retired names, plain or archived, of one sink.
fn retired_pattern(config: &SinkConfig) -> Result<Regex, SinkError> {
    let suffix = if config.needs_custom_name() {
        regex::escape(&config.filename)
    } else {
        String::new()
    };
    let extension = regex::escape(&config.extension);
    Regex::new(&format!(
        r"^log-(\d{{1,2}})-(\d{{1,2}})-(\d{{4}}){suffix}(?:-(\d+))?\.(?:{extension}|{ARCHIVE_EXTENSION})$"
    ))
    .map_err(|err| SinkError::ListRetired(err.to_string()))
}

/// List the retired files of the sink configured by `config` in `directory`,
/// oldest date first, collisions in probe order.
pub(crate) fn list_retired(directory: &Path, config: &SinkConfig) -> Result<Vec<PathBuf>, SinkError> {
    let pattern = retired_pattern(config)?;
    let files = fs::read_dir(directory).map_err(|err| SinkError::ListRetired(err.to_string()))?;

    let mut retired = Vec::new();
    for file in files.flatten() {
        let metadata = file.metadata().map_err(SinkError::Io)?;
        if !metadata.is_file() {
            continue;
        }
        let Some(file_name) = file.file_name().to_str().map(str::to_owned) else {
            continue;
        };
        let Some(captures) = pattern.captures(&file_name) else {
            continue;
        };
        let number = |i: usize| captures.get(i).and_then(|m| m.as_str().parse::<u32>().ok());
        let date = match (number(3), number(2), number(1)) {
            (Some(year), Some(month), Some(day)) => NaiveDate::from_ymd_opt(year as i32, month, day),
            _ => None,
        };
        let Some(date) = date else {
            continue;
        };
        retired.push(RetiredEntry {
            date,
            index: number(4).map_or(0, |i| i as usize),
            path: file.path(),
        });
    }

    retired.sort();
    Ok(retired.into_iter().map(|entry| entry.path).collect())
}

#[cfg(test)]
mod tests {
    use {super::*, tempfile::TempDir};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn stem_has_no_zero_padding() {
        let config = SinkConfig::default();
        assert_eq!(retired_stem(&config, date(2024, 1, 1)), "log-1-1-2024");
        assert_eq!(retired_stem(&config, date(2023, 12, 31)), "log-31-12-2023");
    }

    #[test]
    fn resolve_returns_free_path_untouched() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("log-1-1-2024.log");
        assert_eq!(resolve_name(&path), path);
    }

    #[test]
    fn resolve_probes_incrementing_suffixes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("log-1-1-2024.log");
        fs::write(&path, "first").unwrap();

        let second = resolve_name(&path);
        assert_eq!(second, dir.path().join("log-1-1-2024-1.log"));
        fs::write(&second, "second").unwrap();

        let third = resolve_name(&path);
        assert_eq!(third, dir.path().join("log-1-1-2024-2.log"));
        assert!(!third.exists());
    }

    #[test]
    fn resolve_skips_holes_only_after_taken_names() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("log-1-1-2024.zip");
        fs::write(&path, "").unwrap();
        fs::write(dir.path().join("log-1-1-2024-1.zip"), "").unwrap();
        fs::write(dir.path().join("log-1-1-2024-3.zip"), "").unwrap();
        assert_eq!(resolve_name(&path), dir.path().join("log-1-1-2024-2.zip"));
    }

    #[test]
    fn zip_and_plain_names_are_probed_independently() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("log-1-1-2024.log"), "").unwrap();
        let zip = dir.path().join("log-1-1-2024.zip");
        assert_eq!(resolve_name(&zip), zip);
    }

    #[test]
    fn entry_name_swaps_extension() {
        let archive = Path::new("/tmp/logs/log-1-1-2024-2.zip");
        assert_eq!(archive_entry_name(archive, "log"), "log-1-1-2024-2.log");
    }

    #[test]
    fn lists_only_own_retired_files_in_order() {
        let dir = TempDir::new().unwrap();
        for name in [
            "log-2-1-2024.log",
            "log-1-1-2024-1.log",
            "log-1-1-2024.log",
            "log-10-12-2023.zip",
            "log-1-1-2024api.log",
            "current.log",
            "notes.txt",
        ] {
            fs::write(dir.path().join(name), "").unwrap();
        }
        fs::create_dir(dir.path().join("log-3-1-2024.log")).unwrap();

        let names: Vec<String> = list_retired(dir.path(), &SinkConfig::default())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            vec!["log-10-12-2023.zip", "log-1-1-2024.log", "log-1-1-2024-1.log", "log-2-1-2024.log"]
        );

        let api = SinkConfig {
            filename: "api".to_string(),
            ..SinkConfig::default()
        };
        let names = list_retired(dir.path(), &api).unwrap();
        assert_eq!(names, vec![dir.path().join("log-1-1-2024api.log")]);
    }
}
