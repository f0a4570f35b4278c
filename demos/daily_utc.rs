use {
    dayroll::{FileSink, TimeZone},
    std::io::Write,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut sink = FileSink::builder()
        .dirname("logs")
        .filename("daily")
        .time_zone(TimeZone::UTC)
        .build()?;

    // Retired at the first write after UTC midnight
    writeln!(sink, "System startup - UTC dates are used for rotation")?;
    writeln!(sink, "Configuration loaded successfully")?;
    writeln!(sink, "Server listening on port 8080")?;

    println!("writing to {}", sink.current_path().display());
    Ok(())
}
