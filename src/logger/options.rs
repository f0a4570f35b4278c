//! Logger options and their merging.
//!
//! Options are plain values. [`LoggerOptions::apply`] merges a set of
//! [`LoggerOverrides`] into a copy of the options and never touches shared
//! state, so two loggers built from the same base cannot affect each other.

use {
    super::{format::Color, level::Level, notify::NotifyOptions},
    crate::config::SinkConfig,
    serde::{Deserialize, Serialize},
    std::collections::BTreeMap,
};

/// Color and text of a line segment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Format {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Format {
    pub fn color(color: Color) -> Self {
        Format {
            color: Some(color),
            text: None,
        }
    }

    /// `other`'s fields where set, ours otherwise.
    fn merged(&self, other: &Format) -> Format {
        Format {
            color: other.color.or(self.color),
            text: other.text.clone().or_else(|| self.text.clone()),
        }
    }
}

/// Which levels are kept off the console.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Silent {
    /// `true` silences every level, `false` none.
    Flag(bool),
    /// Silences only the listed levels.
    Levels(Vec<Level>),
}

impl Default for Silent {
    fn default() -> Self {
        Silent::Flag(false)
    }
}

impl Silent {
    pub fn silences(&self, level: Level) -> bool {
        match self {
            Silent::Flag(all) => *all,
            Silent::Levels(levels) => levels.contains(&level),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageOptions {
    /// Fixed text printed after the level, e.g. a service name.
    #[serde(rename = "static")]
    pub static_text: Option<Format>,
    pub level: BTreeMap<Level, Format>,
    pub timestamp: bool,
    /// Accepted for compatibility; message text is printed uncolored.
    pub color: Color,
}

impl Default for MessageOptions {
    fn default() -> Self {
        let level = [
            (Level::Silly, Color::BrightWhite),
            (Level::Debug, Color::Green),
            (Level::Verbose, Color::Magenta),
            (Level::Http, Color::Green),
            (Level::Info, Color::Blue),
            (Level::Warn, Color::Yellow),
            (Level::Error, Color::Red),
        ]
        .into_iter()
        .map(|(level, color)| (level, Format::color(color)))
        .collect();
        MessageOptions {
            static_text: None,
            level,
            timestamp: true,
            color: Color::White,
        }
    }
}

/// Effective options of a [`Logger`](crate::Logger).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LoggerOptions {
    pub silent: Silent,
    /// Enables the rotating file sink.
    pub file: Option<SinkConfig>,
    pub notify: Option<NotifyOptions>,
    pub message: MessageOptions,
    /// Print the caller's file name in this color; `None` hides it.
    pub show_source_file: Option<Color>,
    pub colors: bool,
    pub name: Option<String>,
}

impl Default for LoggerOptions {
    fn default() -> Self {
        LoggerOptions {
            silent: Silent::default(),
            file: None,
            notify: None,
            message: MessageOptions::default(),
            show_source_file: Some(Color::BrightGreen),
            colors: true,
            name: None,
        }
    }
}

/// Partial [`MessageOptions`]; per-level formats merge field by field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageOverrides {
    #[serde(rename = "static")]
    pub static_text: Option<Format>,
    pub level: BTreeMap<Level, Format>,
    pub timestamp: Option<bool>,
    pub color: Option<Color>,
}

/// Partial [`LoggerOptions`]. Every field left `None` keeps the base value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LoggerOverrides {
    pub silent: Option<Silent>,
    pub file: Option<SinkConfig>,
    pub notify: Option<NotifyOptions>,
    pub message: Option<MessageOverrides>,
    pub show_source_file: Option<Color>,
    pub colors: Option<bool>,
    pub name: Option<String>,
}

impl LoggerOptions {
    /// Return a copy of these options with `overrides` merged in.
    ///
    /// # Examples
    /// ```
    /// use dayroll::{LoggerOptions, LoggerOverrides};
    ///
    /// let base = LoggerOptions::default();
    /// let quiet = base.apply(LoggerOverrides {
    ///     colors: Some(false),
    ///     ..LoggerOverrides::default()
    /// });
    /// assert!(!quiet.colors);
    /// assert!(base.colors);
    /// ```
    pub fn apply(&self, overrides: LoggerOverrides) -> LoggerOptions {
        let message = match overrides.message {
            Some(message) => self.message.apply(message),
            None => self.message.clone(),
        };
        LoggerOptions {
            silent: overrides.silent.unwrap_or_else(|| self.silent.clone()),
            file: overrides.file.or_else(|| self.file.clone()),
            notify: overrides.notify.or_else(|| self.notify.clone()),
            message,
            show_source_file: overrides.show_source_file.or(self.show_source_file),
            colors: overrides.colors.unwrap_or(self.colors),
            name: overrides.name.or_else(|| self.name.clone()),
        }
    }
}

impl MessageOptions {
    fn apply(&self, overrides: MessageOverrides) -> MessageOptions {
        let static_text = match (&self.static_text, overrides.static_text) {
            (Some(base), Some(over)) => Some(base.merged(&over)),
            (base, over) => over.or_else(|| base.clone()),
        };
        let mut level = self.level.clone();
        for (lvl, format) in overrides.level {
            let merged = level.get(&lvl).map_or_else(|| format.clone(), |base| base.merged(&format));
            level.insert(lvl, merged);
        }
        MessageOptions {
            static_text,
            level,
            timestamp: overrides.timestamp.unwrap_or(self.timestamp),
            color: overrides.color.unwrap_or(self.color),
        }
    }
}

#[cfg(test)]
mod tests {
    use {super::*, crate::config::MaxFileSize};

    #[test]
    fn defaults_match_original_palette() {
        let options = LoggerOptions::default();
        assert_eq!(options.silent, Silent::Flag(false));
        assert_eq!(options.show_source_file, Some(Color::BrightGreen));
        assert!(options.colors);
        assert!(options.message.timestamp);
        assert_eq!(options.message.level[&Level::Error].color, Some(Color::Red));
        assert_eq!(options.message.level[&Level::Silly].color, Some(Color::BrightWhite));
        assert_eq!(options.message.level.len(), 7);
    }

    #[test]
    fn apply_leaves_base_untouched() {
        let base = LoggerOptions::default();
        let merged = base.apply(LoggerOverrides {
            silent: Some(Silent::Flag(true)),
            name: Some("worker".to_string()),
            ..LoggerOverrides::default()
        });
        assert_eq!(merged.silent, Silent::Flag(true));
        assert_eq!(merged.name.as_deref(), Some("worker"));
        assert_eq!(base, LoggerOptions::default());
    }

    #[test]
    fn apply_merges_levels_field_by_field() {
        let base = LoggerOptions::default();
        let mut level = BTreeMap::new();
        level.insert(
            Level::Info,
            Format {
                color: None,
                text: Some("i".to_string()),
            },
        );
        level.insert(Level::Warn, Format::color(Color::BrightYellow));
        let merged = base.apply(LoggerOverrides {
            message: Some(MessageOverrides {
                level,
                timestamp: Some(false),
                ..MessageOverrides::default()
            }),
            ..LoggerOverrides::default()
        });
        let info = &merged.message.level[&Level::Info];
        assert_eq!(info.color, Some(Color::Blue));
        assert_eq!(info.text.as_deref(), Some("i"));
        assert_eq!(merged.message.level[&Level::Warn].color, Some(Color::BrightYellow));
        assert_eq!(merged.message.level[&Level::Debug].color, Some(Color::Green));
        assert!(!merged.message.timestamp);
    }

    #[test]
    fn apply_chains_without_losing_earlier_overrides() {
        let file = SinkConfig {
            max_file_size: Some(MaxFileSize::kb(64.0)),
            ..SinkConfig::default()
        };
        let first = LoggerOptions::default().apply(LoggerOverrides {
            file: Some(file.clone()),
            ..LoggerOverrides::default()
        });
        let second = first.apply(LoggerOverrides {
            colors: Some(false),
            ..LoggerOverrides::default()
        });
        assert_eq!(second.file, Some(file));
        assert!(!second.colors);
    }

    #[test]
    fn silent_accepts_flag_or_levels() {
        let flag: Silent = serde_json::from_str("true").unwrap();
        assert!(flag.silences(Level::Info));
        let levels: Silent = serde_json::from_str(r#"["debug", "silly"]"#).unwrap();
        assert!(levels.silences(Level::Debug));
        assert!(!levels.silences(Level::Error));
    }

    #[test]
    fn overrides_deserialize_from_json() {
        let overrides: LoggerOverrides = serde_json::from_str(
            r#"{
                "showSourceFile": "cyan",
                "message": { "static": { "text": "api", "color": "brightBlue" } },
                "file": { "filename": "api", "zipArchive": true }
            }"#,
        )
        .unwrap();
        let merged = LoggerOptions::default().apply(overrides);
        assert_eq!(merged.show_source_file, Some(Color::Cyan));
        assert_eq!(merged.message.static_text.unwrap().text.as_deref(), Some("api"));
        let file = merged.file.unwrap();
        assert_eq!(file.filename, "api");
        assert_eq!(file.dirname, "logs");
        assert!(file.zip_archive);
    }
}
