use rand::Rng;
use std::fs::File;
use std::io::Error;
use std::path::Path;

pub const EVENT_HEADER: [&str; 11] = [
    "event", "actor", "request", "item", "amount", "days", "date", "rating", "category",
    "deposit", "note",
];

/// Writes a listing followed by `requests` borrow requests from random
/// borrowers.
pub fn generate_csv(path: &Path, requests: usize) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);
    let mut rng = rand::thread_rng();

    wtr.write_record(EVENT_HEADER)?;
    wtr.write_record(["list_item", "1", "", "1", "5.0", "", "", "", "tools", "", "Drill"])?;

    for i in 1..=requests {
        let borrower: u16 = rng.gen_range(2..=51);
        wtr.write_record([
            "request",
            &borrower.to_string(),
            &i.to_string(),
            "1",
            "",
            "3",
            "2025-03-01",
            "",
            "",
            "",
            "",
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

pub fn generate_large_csv(path: &Path, size_mb: usize) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);
    let mut rng = rand::thread_rng();

    wtr.write_record(EVENT_HEADER)?;
    wtr.write_record(["list_item", "1", "", "1", "5.0", "", "", "", "tools", "", "Drill"])?;

    let target_size = (size_mb * 1024 * 1024) as u64;
    let mut request_id = 1;

    // Check size every 5000 rows to avoid syscall overhead
    loop {
        for _ in 0..5000 {
            let borrower: u16 = rng.gen_range(2..=51);
            wtr.write_record([
                "request",
                &borrower.to_string(),
                &request_id.to_string(),
                "1",
                "",
                "3",
                "2025-03-01",
                "",
                "",
                "",
                "",
            ])?;
            request_id += 1;
        }
        wtr.flush()?; // Flush to ensure file size is updated
        if std::fs::metadata(path)?.len() >= target_size {
            break;
        }
    }
    Ok(())
}
