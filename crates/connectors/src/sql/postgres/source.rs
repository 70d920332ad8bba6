use crate::{
    error::AdapterError,
    source::RowSource,
    sql::{
        base::error::DbError,
        postgres::utils::{connect_client, json_to_cell, wrap_as_json_rows},
    },
};
use async_trait::async_trait;
use futures_util::TryStreamExt;
use model::records::row::RowData;
use std::pin::Pin;
use tokio_postgres::{Client, RowStream};
use tracing::{debug, info};

/// Streams the result set of an arbitrary query, one row at a time.
///
/// The query is sent once; rows are pulled off the wire as the caller asks
/// for them, so the full result set is never buffered.
pub struct PgQuerySource {
    // Dropping the client closes the connection, so it lives as long as the stream.
    _client: Client,
    stream: Pin<Box<RowStream>>,
    label: String,
    rows_read: u64,
}

impl PgQuerySource {
    pub async fn open(url: &str, query: &str) -> Result<Self, AdapterError> {
        if query.trim().is_empty() {
            return Err(DbError::InvalidQuery("query is empty".into()).into());
        }

        let client = connect_client(url).await?;
        let sql = wrap_as_json_rows(query);
        debug!(sql = %sql, "Running source query");

        let params: Vec<String> = Vec::new();
        let stream = client.query_raw(&sql, params).await.map_err(DbError::from)?;
        info!("Postgres source query started");

        Ok(PgQuerySource {
            _client: client,
            stream: Box::pin(stream),
            label: "postgres query".to_string(),
            rows_read: 0,
        })
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = label.to_string();
        self
    }
}

#[async_trait]
impl RowSource for PgQuerySource {
    async fn next_row(&mut self) -> Result<Option<RowData>, AdapterError> {
        let Some(row) = self.stream.try_next().await.map_err(DbError::from)? else {
            return Ok(None);
        };
        self.rows_read += 1;

        let json: Option<String> = row.try_get(0).map_err(DbError::from)?;
        let json = json.ok_or_else(|| {
            DbError::Decode(format!("row {} produced no JSON", self.rows_read))
        })?;
        Ok(Some(decode_json_row(&self.label, &json)?))
    }

    fn describe(&self) -> String {
        format!("postgres:{}", self.label)
    }
}

/// Turns one `row_to_json` object into a string-valued row.
pub fn decode_json_row(source: &str, json: &str) -> Result<RowData, DbError> {
    let value: serde_json::Value =
        serde_json::from_str(json).map_err(|e| DbError::Decode(e.to_string()))?;
    let serde_json::Value::Object(map) = value else {
        return Err(DbError::Decode(format!("expected a JSON object, got {json}")));
    };

    Ok(RowData::from_pairs(
        source,
        map.iter().map(|(k, v)| (k.as_str(), json_to_cell(v))),
    ))
}
