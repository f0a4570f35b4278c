use {
    dayroll::{FileSink, MaxFileSize, TimeZone},
    tracing_subscriber::util::SubscriberInitExt,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let sink = FileSink::builder()
        .dirname("logs")
        .filename("tracing")
        .max_file_size(MaxFileSize::mb(5.0))
        .time_zone(TimeZone::Local)
        .zip_archive(true)
        .build()?;
    let (non_blocking, _guard) = tracing_appender::non_blocking(sink);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .finish()
        .try_init()?;

    tracing::info!("This is an info message");
    tracing::warn!("This is a warning message");
    tracing::error!("This is an error message");

    Ok(())
}
