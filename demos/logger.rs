use dayroll::{Level, Logger, LoggerOptions, LoggerOverrides, MaxFileSize, Silent, SinkConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let options = LoggerOptions::default().apply(LoggerOverrides {
        silent: Some(Silent::Levels(vec![Level::Debug, Level::Silly])),
        file: Some(SinkConfig {
            filename: "app".to_string(),
            max_file_size: Some(MaxFileSize::kb(256.0)),
            ..SinkConfig::default()
        }),
        ..LoggerOverrides::default()
    });
    let logger = Logger::new(options, None)?;

    logger.info("This is an info message")?;
    logger.warn("This is a warning message")?;
    logger.error("This is an error message")?;
    logger.debug("Only in the file")?;
    logger.line_break()?;

    let worker = logger.duplicate(LoggerOverrides {
        name: Some("worker".to_string()),
        file: Some(SinkConfig {
            filename: "worker".to_string(),
            ..SinkConfig::default()
        }),
        ..LoggerOverrides::default()
    })?;
    worker.http("GET /jobs 200")?;

    Ok(())
}
