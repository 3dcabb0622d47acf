//! Disconnect-log rows.

use super::format::{format_timestamp, UNAVAILABLE};
use crate::model::DisconnectEvent;

/// Label used for an outage that has not recovered yet.
pub const ONGOING: &str = "ongoing";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutageDuration {
    Resolved(i64),
    /// No recovery time known; never measured against the current clock.
    Ongoing,
    /// Recovery time before the start, or an interval too large to
    /// represent.
    Unknown,
}

impl DisconnectEvent {
    /// Reported duration, or the one implied by the recovery time.
    pub fn duration(&self) -> OutageDuration {
        if let Some(secs) = self.duration_s.filter(|d| *d > 0) {
            return OutageDuration::Resolved(secs);
        }
        let Some(up) = self.up_at_ms else {
            return OutageDuration::Ongoing;
        };
        match up.checked_sub(self.down_at_ms) {
            Some(ms) if ms >= 0 => OutageDuration::Resolved((ms as f64 / 1000.0).round() as i64),
            _ => OutageDuration::Unknown,
        }
    }
}

/// One rendered line of the disconnect list.
#[derive(Debug, Clone, PartialEq)]
pub struct OutageRow {
    pub id: i64,
    pub started: String,
    pub recovered: String,
    pub duration: String,
}

impl From<&DisconnectEvent> for OutageRow {
    fn from(event: &DisconnectEvent) -> Self {
        Self {
            id: event.id,
            started: format_timestamp(event.down_at_ms),
            recovered: event
                .up_at_ms
                .map(format_timestamp)
                .unwrap_or_else(|| UNAVAILABLE.to_string()),
            duration: match event.duration() {
                OutageDuration::Resolved(secs) => format!("{}s", secs),
                OutageDuration::Ongoing => ONGOING.to_string(),
                OutageDuration::Unknown => UNAVAILABLE.to_string(),
            },
        }
    }
}

pub fn outage_rows(events: &[DisconnectEvent]) -> Vec<OutageRow> {
    events.iter().map(OutageRow::from).collect()
}
