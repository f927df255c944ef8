use std::fs::File;
use std::io::Error;
use std::path::Path;

pub fn generate_invoice_csv(path: &Path, rows: usize) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);

    wtr.write_record(["id", "invoice_number", "date_due", "amount"])?;

    for i in 1..=rows {
        let id = i.to_string();
        let number = format!("INV-2024-{i:03}");
        wtr.write_record([id.as_str(), number.as_str(), "2026-03-15", "1.0"])?;
    }

    wtr.flush()?;
    Ok(())
}
