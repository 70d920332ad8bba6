use crate::transform::{error::Ineligible, fields::AttributionSignals};
use chrono::{DateTime, Utc};
use model::core::mode::EventMode;

/// Accepts `now - window <= event_time <= now`.
pub fn check_window(
    mode: EventMode,
    event_time: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<(), Ineligible> {
    if event_time > now {
        return Err(Ineligible::FutureTimestamp);
    }
    if event_time < now - mode.window() {
        return Err(Ineligible::OutsideWindow);
    }
    Ok(())
}

/// Web events in strict mode need something to attribute them with.
/// Offline events have no such requirement.
pub fn check_attribution(
    mode: EventMode,
    strict: bool,
    signals: &AttributionSignals,
) -> Result<(), Ineligible> {
    match mode {
        EventMode::Web if strict && !signals.any() => Err(Ineligible::MissingAttribution),
        _ => Ok(()),
    }
}
