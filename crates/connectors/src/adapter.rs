use crate::{
    error::AdapterError,
    file::csv::{settings::CsvSettings, source::CsvDataSource},
    source::RowSource,
    sql::postgres::source::PgQuerySource,
};
use std::fmt;

/// Where input rows come from. Resolved once at start-up.
#[derive(Clone)]
pub enum SourceSpec {
    Csv {
        path: String,
        settings: CsvSettings,
    },
    Postgres {
        url: String,
        query: String,
    },
}

impl SourceSpec {
    pub fn csv(path: &str) -> Self {
        SourceSpec::Csv {
            path: path.to_string(),
            settings: CsvSettings::default(),
        }
    }

    pub fn postgres(url: &str, query: &str) -> Self {
        SourceSpec::Postgres {
            url: url.to_string(),
            query: query.to_string(),
        }
    }

    pub async fn open(&self) -> Result<Box<dyn RowSource>, AdapterError> {
        match self {
            SourceSpec::Csv { path, settings } => {
                let source = CsvDataSource::open(path, settings.clone())?;
                Ok(Box::new(source))
            }
            SourceSpec::Postgres { url, query } => {
                if url.trim().is_empty() {
                    return Err(AdapterError::MissingProperty("database url".into()));
                }
                let source = PgQuerySource::open(url, query).await?;
                Ok(Box::new(source))
            }
        }
    }
}

// Connection strings may embed passwords; keep them out of logs.
impl fmt::Debug for SourceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceSpec::Csv { path, settings } => f
                .debug_struct("Csv")
                .field("path", path)
                .field("settings", settings)
                .finish(),
            SourceSpec::Postgres { query, .. } => f
                .debug_struct("Postgres")
                .field("url", &"<redacted>")
                .field("query", query)
                .finish(),
        }
    }
}
