use crate::error::AdapterError;
use async_trait::async_trait;
use model::records::row::RowData;

/// A single-pass, pull-based stream of input rows.
///
/// Implementations hold at most a small read buffer; callers drain rows one
/// at a time so arbitrarily large files or result sets never sit in memory.
/// A source cannot be rewound once read.
#[async_trait]
pub trait RowSource: Send {
    /// Returns the next row, or `None` once the source is exhausted.
    async fn next_row(&mut self) -> Result<Option<RowData>, AdapterError>;

    /// Short description used in logs (file path, query label, ...).
    fn describe(&self) -> String;
}

/// In-memory source, mostly useful in tests and for piping pre-built rows.
pub struct VecSource {
    rows: std::vec::IntoIter<RowData>,
}

impl VecSource {
    pub fn new(rows: Vec<RowData>) -> Self {
        VecSource {
            rows: rows.into_iter(),
        }
    }
}

#[async_trait]
impl RowSource for VecSource {
    async fn next_row(&mut self) -> Result<Option<RowData>, AdapterError> {
        Ok(self.rows.next())
    }

    fn describe(&self) -> String {
        "in-memory rows".to_string()
    }
}
