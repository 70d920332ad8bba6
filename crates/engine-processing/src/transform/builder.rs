use crate::transform::{
    error::Ineligible,
    fields::NormalizedFields,
    validation::{check_attribution, check_window},
};
use chrono::{DateTime, Utc};
use engine_core::hash::{dedup_event_id, hash_pii};
use model::{
    core::mode::EventMode,
    events::{
        ConversionEvent, CustomData, MatchKeys, OfflineEvent, PURCHASE_EVENT_NAME, UserData,
        WebEvent,
    },
    records::row::RowData,
};

/// Run-wide inputs to event building.
#[derive(Debug, Clone)]
pub struct BuildContext {
    /// Pixel or dataset id; scopes event ids.
    pub namespace: String,
    /// Reference instant for the eligibility window, fixed for the run.
    pub now: DateTime<Utc>,
    pub strict_attribution: bool,
}

impl BuildContext {
    pub fn new(namespace: &str, strict_attribution: bool) -> Self {
        BuildContext {
            namespace: namespace.to_string(),
            now: Utc::now(),
            strict_attribution,
        }
    }

    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }
}

/// Turns one raw row into a conversion event, or says why it can't.
///
/// Gates run in a fixed order and the first failure wins: order id, value,
/// event time, window, then (web, strict only) attribution signals.
pub fn build_event(
    row: &RowData,
    mode: EventMode,
    ctx: &BuildContext,
) -> Result<ConversionEvent, Ineligible> {
    let fields = NormalizedFields::from_row(row)?;
    check_window(mode, fields.event_time, ctx.now)?;
    check_attribution(mode, ctx.strict_attribution, &fields.signals)?;

    let event = match mode {
        EventMode::Web => ConversionEvent::Web(web_event(fields, ctx)),
        EventMode::Offline => ConversionEvent::Offline(offline_event(fields, ctx)),
    };
    Ok(event)
}

fn web_event(fields: NormalizedFields, ctx: &BuildContext) -> WebEvent {
    let event_id = dedup_event_id(&ctx.namespace, &fields.order_id);
    let event_time = fields.event_time.timestamp();

    // A bare click id can stand in for the click cookie.
    let fbc = fields.signals.fbc.or_else(|| {
        fields
            .signals
            .fbclid
            .as_ref()
            .map(|clid| format!("fb.1.{}.{clid}", fields.event_time.timestamp_millis()))
    });

    WebEvent {
        event_name: PURCHASE_EVENT_NAME.to_string(),
        event_time,
        action_source: EventMode::Web.action_source().to_string(),
        event_source_url: fields.source_url,
        event_id,
        user_data: UserData {
            em: fields.email.as_deref().map(hash_pii),
            ph: fields.phone.as_deref().map(hash_pii),
            zp: fields.zip.as_deref().map(hash_pii),
            client_ip_address: fields.client_ip,
            client_user_agent: fields.user_agent,
            fbc,
            fbp: fields.signals.fbp,
        },
        custom_data: CustomData {
            currency: fields.currency,
            value: fields.value,
            order_id: fields.order_id,
        },
    }
}

fn offline_event(fields: NormalizedFields, ctx: &BuildContext) -> OfflineEvent {
    OfflineEvent {
        event_name: PURCHASE_EVENT_NAME.to_string(),
        event_time: fields.event_time.timestamp(),
        value: fields.value,
        currency: fields.currency,
        event_id: dedup_event_id(&ctx.namespace, &fields.order_id),
        order_id: fields.order_id,
        match_keys: MatchKeys {
            email: fields.email.as_deref().map(hash_pii),
            phone: fields.phone.as_deref().map(hash_pii),
            zip: fields.zip.as_deref().map(hash_pii),
        },
        action_source: EventMode::Offline.action_source().to_string(),
    }
}
