use {
    serde::{Deserialize, Serialize},
    std::fmt,
};

/// Log levels, most severe first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Error,
    Warn,
    Info,
    Http,
    Verbose,
    Debug,
    Silly,
}

impl Level {
    pub const ALL: [Level; 7] = [
        Level::Error,
        Level::Warn,
        Level::Info,
        Level::Http,
        Level::Verbose,
        Level::Debug,
        Level::Silly,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Error => "ERROR",
            Level::Warn => "WARN",
            Level::Info => "INFO",
            Level::Http => "HTTP",
            Level::Verbose => "VERBOSE",
            Level::Debug => "DEBUG",
            Level::Silly => "SILLY",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_upper_case() {
        let names: Vec<String> = Level::ALL.iter().map(ToString::to_string).collect();
        assert_eq!(names, ["ERROR", "WARN", "INFO", "HTTP", "VERBOSE", "DEBUG", "SILLY"]);
    }

    #[test]
    fn serializes_lower_case() {
        assert_eq!(serde_json::to_string(&Level::Http).unwrap(), r#""http""#);
        let level: Level = serde_json::from_str(r#""verbose""#).unwrap();
        assert_eq!(level, Level::Verbose);
    }
}
