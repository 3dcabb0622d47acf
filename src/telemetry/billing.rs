//! Billing-cycle countdown.
//!
//! A cycle is anchored at the node's start date and repeats every
//! `cycle_days`. Only the remaining days of the current cycle are shown;
//! nothing here is ever written back to the node.

use super::format::format_price;
use crate::model::NodeSummary;

pub const DAY_MS: i64 = 24 * 3600 * 1000;

/// Cycle lengths offered as a transient override in the overview.
pub const CYCLE_PRESETS: [(u32, &str); 4] = [
    (30, "Monthly (30 days)"),
    (90, "Quarterly (90 days)"),
    (180, "Half-year (180 days)"),
    (365, "Yearly (365 days)"),
];

/// Cycle length actually used: the override when set, the node's own
/// otherwise.
pub fn effective_cycle(cycle_days: Option<u32>, override_days: Option<u32>) -> Option<u32> {
    override_days.filter(|d| *d > 0).or(cycle_days.filter(|d| *d > 0))
}

/// Days left in the current cycle, or `None` when no cycle or start
/// date is configured.
///
/// A start date in the future counts as zero elapsed time, and an exact
/// cycle boundary reports a full cycle rather than zero.
pub fn remaining_days(
    cycle_days: Option<u32>,
    start_date_ms: Option<i64>,
    now_ms: i64,
    override_days: Option<u32>,
) -> Option<u32> {
    let cycle = effective_cycle(cycle_days, override_days)?;
    let start = start_date_ms.filter(|s| *s != 0)?;

    let cycle_ms = cycle as i64 * DAY_MS;
    let elapsed = now_ms.saturating_sub(start).max(0);
    let remainder = cycle_ms - elapsed % cycle_ms;
    let days = (remainder + DAY_MS - 1) / DAY_MS;

    Some(days as u32)
}

/// The overview card's billing line.
#[derive(Debug, Clone, PartialEq)]
pub struct BillingLine {
    pub price: Option<String>,
    pub cycle_days: Option<u32>,
    pub remaining_days: Option<u32>,
}

impl BillingLine {
    /// `None` when the node has neither a price nor a cycle.
    pub fn for_node(node: &NodeSummary, override_days: Option<u32>, now_ms: i64) -> Option<Self> {
        let cycle = effective_cycle(node.cycle_days, override_days);
        let price = node.price_cents.filter(|c| *c != 0);
        if price.is_none() && cycle.is_none() {
            return None;
        }

        Some(Self {
            price: price.map(format_price),
            cycle_days: cycle,
            remaining_days: remaining_days(node.cycle_days, node.start_date_ms, now_ms, override_days),
        })
    }

    pub fn render(&self) -> String {
        let mut out = self.price.clone().unwrap_or_default();
        if let Some(days) = self.cycle_days {
            out.push_str(&format!(" / {} days", days));
        }
        if let Some(left) = self.remaining_days {
            out.push_str(&format!(" · {} days left", left));
        }
        out.trim_start().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T: i64 = 1_700_000_000_000;

    #[test]
    fn test_mid_cycle() {
        assert_eq!(remaining_days(Some(30), Some(T), T + 15 * DAY_MS, None), Some(15));
    }

    #[test]
    fn test_exact_boundary_wraps_to_full_cycle() {
        assert_eq!(remaining_days(Some(30), Some(T), T + 30 * DAY_MS, None), Some(30));
        assert_eq!(remaining_days(Some(30), Some(T), T, None), Some(30));
    }

    #[test]
    fn test_future_start_clamps_elapsed() {
        assert_eq!(remaining_days(Some(30), Some(T), T - 5 * DAY_MS, None), Some(30));
    }

    #[test]
    fn test_partial_day_rounds_up() {
        assert_eq!(remaining_days(Some(30), Some(T), T + 15 * DAY_MS + 1, None), Some(15));
        assert_eq!(remaining_days(Some(30), Some(T), T + 30 * DAY_MS - 1, None), Some(1));
    }

    #[test]
    fn test_not_applicable() {
        for now in [0, T, T + 400 * DAY_MS] {
            assert_eq!(remaining_days(Some(0), Some(T), now, None), None);
            assert_eq!(remaining_days(None, Some(T), now, None), None);
            assert_eq!(remaining_days(Some(30), None, now, None), None);
            assert_eq!(remaining_days(Some(30), Some(0), now, None), None);
        }
    }

    #[test]
    fn test_override_wins() {
        assert_eq!(remaining_days(Some(30), Some(T), T + 40 * DAY_MS, Some(90)), Some(50));
        assert_eq!(remaining_days(None, Some(T), T + 40 * DAY_MS, Some(90)), Some(50));
        // zero override is "not set"
        assert_eq!(remaining_days(Some(30), Some(T), T + 40 * DAY_MS, Some(0)), Some(20));
    }

    #[test]
    fn test_billing_line_price_only() {
        let node = NodeSummary { price_cents: Some(1500), ..Default::default() };
        let line = BillingLine::for_node(&node, None, T).unwrap();
        assert_eq!(line.render(), "¥15.00");
    }

    #[test]
    fn test_billing_line_cycle_only() {
        let node = NodeSummary { cycle_days: Some(30), start_date_ms: Some(T), ..Default::default() };
        let line = BillingLine::for_node(&node, None, T + 10 * DAY_MS).unwrap();
        assert_eq!(line.render(), "/ 30 days · 20 days left");
    }

    #[test]
    fn test_billing_line_with_override() {
        let node = NodeSummary {
            price_cents: Some(999),
            cycle_days: Some(30),
            start_date_ms: Some(T),
            ..Default::default()
        };
        let line = BillingLine::for_node(&node, Some(365), T + 10 * DAY_MS).unwrap();
        assert_eq!(line.render(), "¥9.99 / 365 days · 355 days left");
        // the node itself is untouched
        assert_eq!(node.cycle_days, Some(30));
    }

    #[test]
    fn test_billing_line_absent() {
        assert!(BillingLine::for_node(&NodeSummary::default(), None, T).is_none());
    }
}
