use thiserror::Error;

/// All errors coming from the database/query layer.
#[derive(Debug, Error)]
pub enum DbError {
    /// Any PostgreSQL driver error raised while running or streaming a query.
    #[error("PostgreSQL error: {0}")]
    PgError(#[from] tokio_postgres::Error),

    /// A row could not be decoded into a field map.
    #[error("Row decode error: {0}")]
    Decode(String),

    /// The source query is unusable as written.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),
}

/// Errors happening during adapter or connection setup.
#[derive(Debug, Error)]
pub enum ConnectorError {
    #[error("Invalid connection URL: {0}")]
    InvalidUrl(String),

    #[error("Connection failed: {0}")]
    Connection(#[from] tokio_postgres::Error),

    #[error("TLS configuration error: {0}")]
    TlsConfig(#[from] native_tls::Error),
}
