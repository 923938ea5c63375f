use crate::error::WalletError;
use serde::Deserialize;
use std::io::Read;

/// One scanner event: which station read it and the raw QR text.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct ScanRecord {
    #[serde(default)]
    pub station: Option<String>,
    pub payload: String,
}

/// Reads scanner events from a CSV source with `station,payload` columns.
///
/// Payloads are usually JSON, so they are expected to be quoted.
pub struct ScanReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> ScanReader<R> {
    /// Creates a new `ScanReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Lazily reads and deserializes scan records.
    pub fn records(self) -> impl Iterator<Item = Result<ScanRecord, WalletError>> {
        self.reader.into_deserialize().map(|result| {
            result.map_err(|e| WalletError::MalformedPayload(format!("unreadable scan row: {e}")))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_valid_stream() {
        let data = "station,payload\ngate-1,\"{\"\"orderId\"\":\"\"ord-1\"\"}\"\ngate-2,ord-2";
        let records: Vec<_> = ScanReader::new(data.as_bytes()).records().collect();

        assert_eq!(records.len(), 2);
        let first = records[0].as_ref().unwrap();
        assert_eq!(first.station.as_deref(), Some("gate-1"));
        assert_eq!(first.payload, r#"{"orderId":"ord-1"}"#);
        assert_eq!(records[1].as_ref().unwrap().payload, "ord-2");
    }

    #[test]
    fn test_reader_missing_payload_column() {
        let data = "station,payload\ngate-1";
        let records: Vec<_> = ScanReader::new(data.as_bytes()).records().collect();
        assert!(matches!(records[0], Err(WalletError::MalformedPayload(_))));
    }
}
