//! Rendering of log lines.
//!
//! A line reads `[HH:MM:SS][LEVEL][static][source.rs]: message\n`. The
//! timestamp, static and source segments are optional. Console lines may be
//! colored; file and notification lines never are.

use {
    super::{level::Level, options::LoggerOptions},
    chrono::Local,
    colored::Colorize,
    serde::{Deserialize, Serialize},
};

/// Terminal colors available for log line segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Color {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    Gray,
    Grey,
    BrightRed,
    BrightGreen,
    BrightYellow,
    BrightBlue,
    BrightMagenta,
    BrightCyan,
    BrightWhite,
}

impl From<Color> for colored::Color {
    fn from(color: Color) -> Self {
        match color {
            Color::Black => colored::Color::Black,
            Color::Red => colored::Color::Red,
            Color::Green => colored::Color::Green,
            Color::Yellow => colored::Color::Yellow,
            Color::Blue => colored::Color::Blue,
            Color::Magenta => colored::Color::Magenta,
            Color::Cyan => colored::Color::Cyan,
            Color::White => colored::Color::White,
            Color::Gray | Color::Grey => colored::Color::BrightBlack,
            Color::BrightRed => colored::Color::BrightRed,
            Color::BrightGreen => colored::Color::BrightGreen,
            Color::BrightYellow => colored::Color::BrightYellow,
            Color::BrightBlue => colored::Color::BrightBlue,
            Color::BrightMagenta => colored::Color::BrightMagenta,
            Color::BrightCyan => colored::Color::BrightCyan,
            Color::BrightWhite => colored::Color::BrightWhite,
        }
    }
}

/// Where the rendered line goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Target {
    Console,
    Plain,
}

pub(crate) struct LineFormatter<'a> {
    options: &'a LoggerOptions,
    colorize: bool,
}

impl<'a> LineFormatter<'a> {
    pub(crate) fn new(options: &'a LoggerOptions, target: Target) -> Self {
        LineFormatter {
            options,
            colorize: target == Target::Console && options.colors,
        }
    }

    fn paint(&self, text: &str, color: Option<Color>) -> String {
        if self.colorize {
            text.color(color.unwrap_or(Color::White)).to_string()
        } else {
            text.to_string()
        }
    }

    fn timestamp(&self) -> String {
        if !self.options.message.timestamp {
            return String::new();
        }
        let time = Local::now().format("%H:%M:%S").to_string();
        format!("[{}]", self.paint(&time, Some(Color::BrightBlue)))
    }

    fn extras(&self, source: &str) -> String {
        let mut extras = String::new();
        if let Some(text) = self.options.message.static_text.as_ref().and_then(|f| f.text.as_deref()) {
            let color = self.options.message.static_text.as_ref().and_then(|f| f.color);
            extras.push_str(&format!("[{}]", self.paint(text, color)));
        }
        if let Some(color) = self.options.show_source_file {
            extras.push_str(&format!("[{}]", self.paint(source, Some(color))));
        }
        extras
    }

    /// Render one line, newline included. `source` is the caller's file name.
    pub(crate) fn line(&self, level: Level, message: &str, source: &str) -> String {
        let level_color = self.options.message.level.get(&level).and_then(|f| f.color);
        format!(
            "{}[{}]{}: {message}\n",
            self.timestamp(),
            self.paint(level.as_str(), level_color),
            self.extras(source)
        )
    }
}

/// The last component of a source path, e.g. `main.rs` for `src/bin/main.rs`.
pub(crate) fn source_file_name(file: &str) -> &str {
    file.rsplit(['/', '\\']).next().unwrap_or(file)
}
