use crate::domain::invoice::{Invoice, InvoiceCatalog};
use crate::error::{PaymentError, Result};
use std::io::Read;

/// Reads an invoice catalog from a CSV source.
///
/// This reader wraps `csv::Reader` and provides an iterator over
/// `Result<Invoice>`. It handles whitespace trimming and flexible record
/// lengths automatically, so a malformed row surfaces as an error without
/// poisoning the rest of the stream.
pub struct InvoiceReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> InvoiceReader<R> {
    /// Creates a new `InvoiceReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and deserializes invoices.
    pub fn invoices(self) -> impl Iterator<Item = Result<Invoice>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(PaymentError::from))
    }

    /// Collects the whole stream into a catalog, failing on the first
    /// malformed row or duplicate id.
    pub fn into_catalog(self) -> Result<InvoiceCatalog> {
        let invoices = self.invoices().collect::<Result<Vec<_>>>()?;
        InvoiceCatalog::new(invoices)
    }
}
