use dayroll::{FileSink, SinkConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config: SinkConfig = serde_json::from_str(
        r#"{
            "dirname": "logs",
            "filename": "access",
            "maxFileSize": { "value": 1, "unit": "mb" }
        }"#,
    )?;
    let mut access = FileSink::open(config)?;
    let mut errors = FileSink::builder().dirname("logs").filename("errors").extension("txt").build()?;

    access.write("GET /health 200\n")?;
    access.write("POST /orders 201\n")?;
    errors.write("POST /payments 502 upstream timeout\n")?;

    println!("{}", access.current_path().display());
    println!("{}", errors.current_path().display());
    Ok(())
}
