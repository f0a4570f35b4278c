//! Rotation decisions. Nothing in here touches the filesystem.

use {
    crate::config::{MaxFileSize, SizeUnit, TimeZone},
    chrono::{DateTime, Utc},
    std::fmt,
};

/// A byte count expressed in the largest unit for which the value is at
/// least one, e.g. `1536` bytes is `1.5 KB`. Zero bytes is `0 B`, and sizes
/// beyond the gigabyte range stay in `GB`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HumanSize {
    pub value: f64,
    pub unit: SizeUnit,
}

impl HumanSize {
    pub fn from_bytes(bytes: u64) -> Self {
        let unit = SizeUnit::ALL
            .iter()
            .rev()
            .copied()
            .find(|unit| bytes >= unit.bytes())
            .unwrap_or(SizeUnit::B);
        HumanSize {
            value: bytes as f64 / unit.bytes() as f64,
            unit,
        }
    }
}

impl fmt::Display for HumanSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} {}", self.value, self.unit)
    }
}

/// Decides whether the live log file is due for rotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationPolicy {
    time_zone: TimeZone,
    max_file_size: Option<MaxFileSize>,
}

impl RotationPolicy {
    pub fn new(time_zone: TimeZone, max_file_size: Option<MaxFileSize>) -> Self {
        RotationPolicy {
            time_zone,
            max_file_size,
        }
    }

    /// Returns true iff `created_at` and `now` fall on different calendar
    /// dates in the policy's time zone.
    ///
    /// Rotation is calendar-aligned: a file created at 23:59 is due one
    /// minute later, a file created at 00:01 lives until the next midnight.
    pub fn is_date_rotation_due(&self, created_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        self.time_zone.date_of(created_at) != self.time_zone.date_of(now)
    }

    /// Returns true iff a size threshold is configured and
    /// [`is_size_rotation_due`] holds for it.
    pub fn is_size_rotation_due(&self, current_size: u64) -> bool {
        self.max_file_size
            .as_ref()
            .is_some_and(|threshold| is_size_rotation_due(current_size, threshold))
    }
}

/// Coarse size gate.
///
/// The byte count is converted to a [`HumanSize`] and the rotation is due iff
/// its value reaches the threshold value AND the threshold unit ranks no
/// higher than the measured unit. Both halves are required, which means a
/// `10 MB` threshold is never met by a file measured in bytes, and a `900 B`
/// threshold is not met by a file measured as `2 KB` either.
///
/// # Examples
/// ```
/// use dayroll::{is_size_rotation_due, MaxFileSize};
///
/// assert!(!is_size_rotation_due(500, &MaxFileSize::mb(10.0)));
/// assert!(is_size_rotation_due(3 * 1024 * 1024, &MaxFileSize::kb(2.0)));
/// ```
pub fn is_size_rotation_due(current_size: u64, threshold: &MaxFileSize) -> bool {
    let measured = HumanSize::from_bytes(current_size);
    measured.value >= threshold.value && threshold.unit.rank() <= measured.unit.rank()
}
