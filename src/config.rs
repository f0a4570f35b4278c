//! Configuration of the rotating file sink.
//!
//! [`SinkConfig`] is a plain value: it is deserialized (or built through
//! [`FileSinkBuilder`](crate::FileSinkBuilder)), validated once when the sink
//! is opened and never mutated afterwards. The serialized key names follow the
//! option surface that existing deployments already use, including the
//! `extenstion` spelling which is accepted as an alias of `extension`.

use {
    crate::error::SinkError,
    chrono::{DateTime, FixedOffset, Local, NaiveDate, Utc},
    serde::{Deserialize, Serialize},
    std::{fmt, path::PathBuf, str::FromStr},
};

/// The default base filename. Sinks using it produce retired files named
/// only after their date; any other base filename is appended to the date.
pub const DEFAULT_FILENAME: &str = "current";
/// The default directory name, relative to the root directory.
pub const DEFAULT_DIRNAME: &str = "logs";
/// The default log file extension.
pub const DEFAULT_EXTENSION: &str = "log";
/// The default value of the reserved rotation frequency knob.
pub const DEFAULT_FREQUENCY: &str = "24h";

/// Size units used by the size rotation threshold.
///
/// The declaration order is the rank order used by the rotation policy:
/// `B(0) < KB(1) < MB(2) < GB(3)`. Units are 1024-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SizeUnit {
    #[serde(rename = "b", alias = "B")]
    B,
    #[serde(rename = "kb", alias = "KB", alias = "Kb")]
    KB,
    #[serde(rename = "mb", alias = "MB", alias = "Mb")]
    MB,
    #[serde(rename = "gb", alias = "GB", alias = "Gb")]
    GB,
}

impl SizeUnit {
    /// All units, smallest first.
    pub const ALL: [SizeUnit; 4] = [SizeUnit::B, SizeUnit::KB, SizeUnit::MB, SizeUnit::GB];

    /// Ordinal position of the unit on the `B < KB < MB < GB` scale.
    pub fn rank(self) -> u8 {
        match self {
            SizeUnit::B => 0,
            SizeUnit::KB => 1,
            SizeUnit::MB => 2,
            SizeUnit::GB => 3,
        }
    }

    /// Number of bytes in one unit.
    pub fn bytes(self) -> u64 {
        1024u64.pow(u32::from(self.rank()))
    }
}

impl fmt::Display for SizeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SizeUnit::B => "B",
            SizeUnit::KB => "KB",
            SizeUnit::MB => "MB",
            SizeUnit::GB => "GB",
        })
    }
}

impl FromStr for SizeUnit {
    type Err = SinkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "b" => Ok(SizeUnit::B),
            "kb" => Ok(SizeUnit::KB),
            "mb" => Ok(SizeUnit::MB),
            "gb" => Ok(SizeUnit::GB),
            other => Err(SinkError::InvalidConfig(format!("unknown size unit '{other}'"))),
        }
    }
}

/// Size threshold for rotating the live log file.
///
/// # Examples
/// ```
/// use dayroll::{MaxFileSize, SizeUnit};
///
/// let threshold = MaxFileSize::mb(10.0);
/// assert_eq!(threshold.unit, SizeUnit::MB);
/// assert_eq!("2kb".parse::<MaxFileSize>().unwrap(), MaxFileSize::kb(2.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaxFileSize {
    pub value: f64,
    pub unit: SizeUnit,
}

impl MaxFileSize {
    pub fn new(value: f64, unit: SizeUnit) -> Self {
        MaxFileSize { value, unit }
    }

    pub fn bytes(value: f64) -> Self {
        Self::new(value, SizeUnit::B)
    }

    pub fn kb(value: f64) -> Self {
        Self::new(value, SizeUnit::KB)
    }

    pub fn mb(value: f64) -> Self {
        Self::new(value, SizeUnit::MB)
    }

    pub fn gb(value: f64) -> Self {
        Self::new(value, SizeUnit::GB)
    }
}

impl FromStr for MaxFileSize {
    type Err = SinkError;

    /// Parses thresholds written as `<number><unit>`, e.g. `10MB` or `1.5 kb`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let split = s
            .find(|c: char| c.is_ascii_alphabetic())
            .ok_or_else(|| SinkError::InvalidConfig(format!("missing size unit in '{s}'")))?;
        let (value, unit) = s.split_at(split);
        let value = value
            .trim()
            .parse::<f64>()
            .map_err(|err| SinkError::InvalidConfig(format!("invalid size value in '{s}': {err}")))?;
        Ok(MaxFileSize::new(value, unit.trim().parse()?))
    }
}

/// Specifies the time zone whose calendar decides when a day has changed and
/// which date a retired file is named after.
///
/// # Examples
/// ```
/// use dayroll::TimeZone;
/// use chrono::FixedOffset;
///
/// let utc = TimeZone::UTC;
/// let local = TimeZone::Local;
/// let tokyo = TimeZone::Fix(FixedOffset::east_opt(9 * 3600).unwrap());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeZone {
    UTC,
    /// The system's local time zone, re-evaluated for every date so that
    /// daylight saving transitions are respected.
    #[default]
    Local,
    Fix(FixedOffset),
}

impl TimeZone {
    /// The calendar date of `instant` in this time zone.
    pub fn date_of(&self, instant: DateTime<Utc>) -> NaiveDate {
        match self {
            TimeZone::UTC => instant.date_naive(),
            TimeZone::Local => instant.with_timezone(&Local).date_naive(),
            TimeZone::Fix(offset) => instant.with_timezone(offset).date_naive(),
        }
    }
}

/// Immutable configuration of a [`FileSink`](crate::FileSink).
///
/// The live file is `<root>/<dirname>/<filename>.<extension>` where `<root>`
/// is `absolute_path`, or the process working directory when unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SinkConfig {
    pub dirname: String,
    pub filename: String,
    #[serde(alias = "extenstion")]
    pub extension: String,
    /// Reserved. Rotation always happens when the calendar day changes,
    /// whatever this holds.
    pub new_log_file_frequency: String,
    pub max_file_size: Option<MaxFileSize>,
    pub zip_archive: bool,
    pub absolute_path: Option<PathBuf>,
    #[serde(skip)]
    pub time_zone: TimeZone,
}

impl Default for SinkConfig {
    fn default() -> Self {
        SinkConfig {
            dirname: DEFAULT_DIRNAME.to_string(),
            filename: DEFAULT_FILENAME.to_string(),
            extension: DEFAULT_EXTENSION.to_string(),
            new_log_file_frequency: DEFAULT_FREQUENCY.to_string(),
            max_file_size: None,
            zip_archive: false,
            absolute_path: None,
            time_zone: TimeZone::default(),
        }
    }
}

impl SinkConfig {
    /// Check the configuration before any filesystem access happens.
    pub fn validate(&self) -> Result<(), SinkError> {
        for (name, value) in [("filename", &self.filename), ("extension", &self.extension)] {
            if value.is_empty() {
                return Err(SinkError::InvalidConfig(format!("{name} must not be empty")));
            }
            if value.contains(['/', '\\']) {
                return Err(SinkError::InvalidConfig(format!(
                    "{name} '{value}' must not contain a path separator"
                )));
            }
        }
        if self.extension.eq_ignore_ascii_case("zip") && self.zip_archive {
            return Err(SinkError::InvalidConfig(
                "extension 'zip' clashes with zip archival".to_string(),
            ));
        }
        if let Some(max) = &self.max_file_size {
            if !max.value.is_finite() || max.value <= 0.0 {
                return Err(SinkError::InvalidConfig(format!(
                    "maxFileSize value must be a positive number, got {}",
                    max.value
                )));
            }
        }
        Ok(())
    }

    /// The directory holding the live and retired files.
    pub fn directory(&self) -> Result<PathBuf, SinkError> {
        let root = match &self.absolute_path {
            Some(root) => root.to_owned(),
            None => std::env::current_dir().map_err(|source| SinkError::DirectoryUnavailable {
                path: PathBuf::from("."),
                source,
            })?,
        };
        Ok(root.join(&self.dirname))
    }

    /// The file name of the live log file.
    pub fn live_file_name(&self) -> String {
        format!("{}.{}", self.filename, self.extension)
    }

    /// Whether retired files carry the base filename after their date.
    pub fn needs_custom_name(&self) -> bool {
        self.filename != DEFAULT_FILENAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_option_surface() {
        let config = SinkConfig::default();
        assert_eq!(config.dirname, "logs");
        assert_eq!(config.filename, "current");
        assert_eq!(config.extension, "log");
        assert_eq!(config.new_log_file_frequency, "24h");
        assert_eq!(config.live_file_name(), "current.log");
        assert!(!config.needs_custom_name());
        assert!(!config.zip_archive);
        assert!(config.max_file_size.is_none());
    }

    #[test]
    fn deserializes_legacy_keys() {
        let config: SinkConfig = serde_json::from_str(
            r#"{
                "dirname": "app-logs",
                "filename": "api",
                "extenstion": "txt",
                "maxFileSize": { "value": 10, "unit": "mb" },
                "zipArchive": true,
                "absolutePath": "/var/tmp"
            }"#,
        )
        .unwrap();
        assert_eq!(config.extension, "txt");
        assert_eq!(config.max_file_size, Some(MaxFileSize::mb(10.0)));
        assert!(config.zip_archive);
        assert_eq!(config.directory().unwrap(), PathBuf::from("/var/tmp/app-logs"));
        assert!(config.needs_custom_name());
        assert_eq!(config.new_log_file_frequency, "24h");
    }

    #[test]
    fn size_unit_accepts_both_cases() {
        let lower: MaxFileSize = serde_json::from_str(r#"{"value": 1, "unit": "b"}"#).unwrap();
        let upper: MaxFileSize = serde_json::from_str(r#"{"value": 1, "unit": "GB"}"#).unwrap();
        assert_eq!(lower.unit, SizeUnit::B);
        assert_eq!(upper.unit, SizeUnit::GB);
        assert_eq!("Kb".parse::<SizeUnit>().unwrap(), SizeUnit::KB);
        assert!("tb".parse::<SizeUnit>().is_err());
    }

    #[test]
    fn parses_threshold_strings() {
        assert_eq!("10MB".parse::<MaxFileSize>().unwrap(), MaxFileSize::mb(10.0));
        assert_eq!(" 1.5 kb ".parse::<MaxFileSize>().unwrap(), MaxFileSize::kb(1.5));
        assert!("MB".parse::<MaxFileSize>().is_err());
        assert!("12".parse::<MaxFileSize>().is_err());
    }

    #[test]
    fn ranks_follow_scale() {
        let ranks: Vec<u8> = SizeUnit::ALL.iter().map(|u| u.rank()).collect();
        assert_eq!(ranks, vec![0, 1, 2, 3]);
        assert_eq!(SizeUnit::MB.bytes(), 1024 * 1024);
    }

    #[test]
    fn rejects_invalid_configs() {
        let bad_size = SinkConfig {
            max_file_size: Some(MaxFileSize::kb(0.0)),
            ..SinkConfig::default()
        };
        assert!(matches!(bad_size.validate(), Err(SinkError::InvalidConfig(_))));

        let bad_name = SinkConfig {
            filename: "a/b".to_string(),
            ..SinkConfig::default()
        };
        assert!(bad_name.validate().is_err());

        let empty_ext = SinkConfig {
            extension: String::new(),
            ..SinkConfig::default()
        };
        assert!(empty_ext.validate().is_err());

        let zip_clash = SinkConfig {
            extension: "zip".to_string(),
            zip_archive: true,
            ..SinkConfig::default()
        };
        assert!(zip_clash.validate().is_err());

        assert!(SinkConfig::default().validate().is_ok());
    }

    #[test]
    fn fixed_time_zone_moves_the_date() {
        let instant = DateTime::parse_from_rfc3339("2024-01-01T23:30:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let plus_two = TimeZone::Fix(FixedOffset::east_opt(2 * 3600).unwrap());
        assert_eq!(TimeZone::UTC.date_of(instant), NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(plus_two.date_of(instant), NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
    }
}
