use crate::{
    error::AdapterError,
    file::csv::{error::FileError, settings::CsvSettings},
    source::RowSource,
};
use async_trait::async_trait;
use model::records::row::RowData;
use std::{fs::File, path::Path};
use tracing::debug;

/// Streams rows out of a CSV file with a header line.
pub struct CsvDataSource {
    path: String,
    headers: Vec<String>,
    data_iter: csv::StringRecordsIntoIter<File>,
    /// Tracks how many records have been consumed from the file.
    rows_read: u64,
}

impl CsvDataSource {
    pub fn open(path: &str, settings: CsvSettings) -> Result<Self, FileError> {
        if !Path::new(path).exists() {
            return Err(FileError::NotFound(path.to_string()));
        }

        let mut builder = csv::ReaderBuilder::new();
        let builder = builder
            .delimiter(settings.delimiter as u8)
            .has_headers(true)
            .flexible(settings.flexible);

        let mut reader = builder.from_reader(File::open(path)?);
        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(normalize_col_name)
            .collect();

        if headers.iter().all(|h| h.is_empty()) {
            return Err(FileError::InvalidFormat(format!(
                "{path}: missing header row"
            )));
        }

        debug!(path, columns = ?headers, "Opened CSV source");

        Ok(CsvDataSource {
            path: path.to_string(),
            headers,
            data_iter: reader.into_records(),
            rows_read: 0,
        })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows_read(&self) -> u64 {
        self.rows_read
    }

    fn to_row(&self, record: &csv::StringRecord) -> RowData {
        let mut row = RowData::new(&self.path);
        for (ordinal, header) in self.headers.iter().enumerate() {
            if header.is_empty() {
                continue;
            }
            let cell = record
                .get(ordinal)
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(String::from);
            row.insert(header, cell);
        }
        row
    }
}

#[async_trait]
impl RowSource for CsvDataSource {
    async fn next_row(&mut self) -> Result<Option<RowData>, AdapterError> {
        match self.data_iter.next() {
            Some(Ok(record)) => {
                self.rows_read += 1;
                Ok(Some(self.to_row(&record)))
            }
            Some(Err(e)) => Err(FileError::ReadError {
                record: self.rows_read + 1,
                message: e.to_string(),
            }
            .into()),
            // End of file
            None => Ok(None),
        }
    }

    fn describe(&self) -> String {
        format!("csv:{}", self.path)
    }
}

/// Lower-cases a header and folds punctuation into underscores so
/// `Order ID` and `order-id` both land on `order_id`.
pub fn normalize_col_name(name: &str) -> String {
    name.trim()
        .trim_start_matches('\u{feff}')
        .replace([' ', '-', '.', '(', ')', ','], "_")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_normalize_col_name() {
        assert_eq!(normalize_col_name("Order ID"), "order_id");
        assert_eq!(normalize_col_name("event-time"), "event_time");
        assert_eq!(normalize_col_name("\u{feff}Email"), "email");
    }

    #[tokio::test]
    async fn test_reads_rows_with_lowercased_keys() {
        let file = write_csv("Order_ID,Value,Email\nA1,25.50,a@b.com\nA2,,\n");
        let path = file.path().to_str().unwrap();
        let mut source = CsvDataSource::open(path, CsvSettings::default()).unwrap();

        let first = source.next_row().await.unwrap().unwrap();
        assert_eq!(first.get("order_id"), Some("A1"));
        assert_eq!(first.get("value"), Some("25.50"));
        assert_eq!(first.get("email"), Some("a@b.com"));

        let second = source.next_row().await.unwrap().unwrap();
        assert_eq!(second.get("order_id"), Some("A2"));
        assert_eq!(second.get("value"), None);

        assert!(source.next_row().await.unwrap().is_none());
        assert_eq!(source.rows_read(), 2);
    }

    #[tokio::test]
    async fn test_custom_delimiter() {
        let file = write_csv("id;amount\n7;3.10\n");
        let path = file.path().to_str().unwrap();
        let mut source = CsvDataSource::open(path, CsvSettings::new(';')).unwrap();

        let row = source.next_row().await.unwrap().unwrap();
        assert_eq!(row.first_of(&["order_id", "id"]), Some("7"));
        assert_eq!(row.first_of(&["value", "amount"]), Some("3.10"));
    }

    #[test]
    fn test_missing_file() {
        let err = CsvDataSource::open("/nonexistent/orders.csv", CsvSettings::default())
            .err()
            .unwrap();
        assert!(matches!(err, FileError::NotFound(_)));
    }
}
