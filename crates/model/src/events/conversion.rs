use crate::core::mode::EventMode;
use serde::{Deserialize, Serialize};

/// A purchase ready to be submitted to the Conversions API.
///
/// Both variants serialize to the bare payload the API expects, so a batch is
/// just a JSON array of these.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ConversionEvent {
    Web(WebEvent),
    Offline(OfflineEvent),
}

impl ConversionEvent {
    pub fn event_id(&self) -> &str {
        match self {
            ConversionEvent::Web(event) => &event.event_id,
            ConversionEvent::Offline(event) => &event.event_id,
        }
    }

    pub fn event_time(&self) -> i64 {
        match self {
            ConversionEvent::Web(event) => event.event_time,
            ConversionEvent::Offline(event) => event.event_time,
        }
    }

    pub fn order_id(&self) -> &str {
        match self {
            ConversionEvent::Web(event) => &event.custom_data.order_id,
            ConversionEvent::Offline(event) => &event.order_id,
        }
    }

    pub fn mode(&self) -> EventMode {
        match self {
            ConversionEvent::Web(_) => EventMode::Web,
            ConversionEvent::Offline(_) => EventMode::Offline,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebEvent {
    pub event_name: String,
    pub event_time: i64,
    pub action_source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_source_url: Option<String>,
    pub event_id: String,
    pub user_data: UserData,
    pub custom_data: CustomData,
}

/// Identity signals for web matching. Hashed fields carry SHA-256 hex
/// digests; network fields and cookies are sent as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub em: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ph: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_ip_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_user_agent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fbc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fbp: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomData {
    pub currency: String,
    pub value: f64,
    pub order_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfflineEvent {
    pub event_name: String,
    pub event_time: i64,
    pub value: f64,
    pub currency: String,
    pub order_id: String,
    pub match_keys: MatchKeys,
    pub event_id: String,
    pub action_source: String,
}

/// Hashed identity signals for offline matching.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchKeys {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
}
