use dayroll::{FileSink, MaxFileSize};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut sink = FileSink::builder()
        .dirname("logs")
        .filename("sized")
        .max_file_size(MaxFileSize::kb(4.0))
        .zip_archive(true)
        .build()?;

    for i in 0..500 {
        sink.write(&format!("request {i} served in {}ms\n", i % 37))?;
    }

    for retired in sink.retired_files()? {
        println!("{}", retired.display());
    }
    Ok(())
}
