pub mod conversion;

pub use conversion::{ConversionEvent, CustomData, MatchKeys, OfflineEvent, UserData, WebEvent};

/// Every event produced by the backfill is a purchase.
pub const PURCHASE_EVENT_NAME: &str = "Purchase";
