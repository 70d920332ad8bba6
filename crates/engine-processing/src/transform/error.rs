use thiserror::Error;

/// Why a row did not become an event.
///
/// Ineligible rows are expected in a backfill; they are counted as skipped,
/// never as failures.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ineligible {
    #[error("missing order id")]
    MissingOrderId,

    #[error("value is missing, non-numeric or not positive")]
    InvalidValue,

    #[error("event time is missing or unparseable")]
    InvalidTimestamp,

    #[error("event time is older than the attribution window")]
    OutsideWindow,

    #[error("event time is in the future")]
    FutureTimestamp,

    #[error("no click id, browser id or UTM source")]
    MissingAttribution,
}

impl Ineligible {
    /// Stable key used in counters and the run summary.
    pub fn label(&self) -> &'static str {
        match self {
            Ineligible::MissingOrderId => "missing_order_id",
            Ineligible::InvalidValue => "invalid_value",
            Ineligible::InvalidTimestamp => "invalid_timestamp",
            Ineligible::OutsideWindow => "outside_window",
            Ineligible::FutureTimestamp => "future_timestamp",
            Ineligible::MissingAttribution => "missing_attribution",
        }
    }
}
