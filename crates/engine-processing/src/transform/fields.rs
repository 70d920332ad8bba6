use crate::transform::error::Ineligible;
use chrono::{DateTime, Utc};
use engine_core::normalize::{
    clean_text, normalize_currency, normalize_phone, parse_timestamp, validate_email,
    validate_numeric,
};
use model::records::row::RowData;

// Accepted column names per logical field, most specific first.
pub const ORDER_ID: &[&str] = &["order_id", "id"];
pub const VALUE: &[&str] = &["value", "amount"];
pub const EVENT_TIME: &[&str] = &["event_time", "created_at"];
pub const EMAIL: &[&str] = &["email"];
pub const PHONE: &[&str] = &["phone"];
pub const ZIP: &[&str] = &["zip", "postal_code"];
pub const CURRENCY: &[&str] = &["currency"];
pub const CLIENT_IP: &[&str] = &["client_ip_address", "ip"];
pub const USER_AGENT: &[&str] = &["client_user_agent", "user_agent"];
pub const SOURCE_URL: &[&str] = &["event_source_url", "source_url"];
pub const FBC: &[&str] = &["fbc"];
pub const FBP: &[&str] = &["fbp"];
pub const FBCLID: &[&str] = &["fbclid"];
pub const UTM_SOURCE: &[&str] = &["utm_source"];

/// A row after validation and coercion. Identity fields are still clear
/// text here; hashing happens when the payload is assembled.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedFields {
    pub order_id: String,
    pub value: f64,
    pub event_time: DateTime<Utc>,
    pub currency: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub zip: Option<String>,
    pub client_ip: Option<String>,
    pub user_agent: Option<String>,
    pub source_url: Option<String>,
    pub signals: AttributionSignals,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributionSignals {
    pub fbc: Option<String>,
    pub fbp: Option<String>,
    pub fbclid: Option<String>,
    pub utm_source: Option<String>,
}

impl AttributionSignals {
    pub fn any(&self) -> bool {
        self.fbc.is_some() || self.fbp.is_some() || self.fbclid.is_some() || self.utm_source.is_some()
    }
}

impl NormalizedFields {
    /// Validates the required fields in order (order id, value, event time)
    /// and coerces the optional ones. Bad optional fields are dropped rather
    /// than failing the row.
    pub fn from_row(row: &RowData) -> Result<Self, Ineligible> {
        let order_id = row
            .first_of(ORDER_ID)
            .map(String::from)
            .ok_or(Ineligible::MissingOrderId)?;
        let value = validate_numeric(row.first_of(VALUE)).ok_or(Ineligible::InvalidValue)?;
        let event_time =
            parse_timestamp(row.first_of(EVENT_TIME)).ok_or(Ineligible::InvalidTimestamp)?;

        Ok(NormalizedFields {
            order_id,
            value,
            event_time,
            currency: normalize_currency(row.first_of(CURRENCY)),
            email: validate_email(row.first_of(EMAIL)),
            phone: normalize_phone(row.first_of(PHONE)),
            zip: clean_text(row.first_of(ZIP)),
            client_ip: clean_text(row.first_of(CLIENT_IP)),
            user_agent: clean_text(row.first_of(USER_AGENT)),
            source_url: clean_text(row.first_of(SOURCE_URL)),
            signals: AttributionSignals {
                fbc: clean_text(row.first_of(FBC)),
                fbp: clean_text(row.first_of(FBP)),
                fbclid: clean_text(row.first_of(FBCLID)),
                utm_source: clean_text(row.first_of(UTM_SOURCE)),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> RowData {
        RowData::from_pairs(
            "test",
            pairs.iter().map(|(k, v)| (*k, Some(v.to_string()))),
        )
    }

    #[test]
    fn test_required_fields_checked_in_order() {
        assert_eq!(
            NormalizedFields::from_row(&row(&[("value", "-1"), ("event_time", "junk")])),
            Err(Ineligible::MissingOrderId)
        );
        assert_eq!(
            NormalizedFields::from_row(&row(&[("id", "A1"), ("value", "0"), ("event_time", "junk")])),
            Err(Ineligible::InvalidValue)
        );
        assert_eq!(
            NormalizedFields::from_row(&row(&[("id", "A1"), ("amount", "5"), ("event_time", "junk")])),
            Err(Ineligible::InvalidTimestamp)
        );
    }

    #[test]
    fn test_aliases_and_optional_fields() {
        let fields = NormalizedFields::from_row(&row(&[
            ("id", "A7"),
            ("amount", "12.5"),
            ("created_at", "1700000000"),
            ("email", "not-an-email"),
            ("phone", "(555) 123-4567"),
            ("postal_code", " 94107 "),
            ("currency", "eur"),
            ("ip", "203.0.113.9"),
            ("user_agent", "Mozilla/5.0"),
            ("utm_source", "newsletter"),
        ]))
        .unwrap();

        assert_eq!(fields.order_id, "A7");
        assert_eq!(fields.value, 12.5);
        assert_eq!(fields.event_time.timestamp(), 1_700_000_000);
        assert_eq!(fields.currency, "EUR");
        assert_eq!(fields.email, None);
        assert_eq!(fields.phone.as_deref(), Some("+5551234567"));
        assert_eq!(fields.zip.as_deref(), Some("94107"));
        assert_eq!(fields.client_ip.as_deref(), Some("203.0.113.9"));
        assert_eq!(fields.user_agent.as_deref(), Some("Mozilla/5.0"));
        assert_eq!(fields.signals.utm_source.as_deref(), Some("newsletter"));
        assert!(fields.signals.any());
    }

    #[test]
    fn test_no_signals() {
        let fields = NormalizedFields::from_row(&row(&[
            ("order_id", "A1"),
            ("value", "1"),
            ("event_time", "1700000000"),
        ]))
        .unwrap();
        assert!(!fields.signals.any());
        assert_eq!(fields.currency, "USD");
    }
}
