//! Hardware selection from the unleased NIC inventory

use chrono::{DateTime, Duration, Utc};
use plunder_api::models::Lease;

/// Minutes after expiry during which a lease still counts as fresh
pub const DEFAULT_FRESHNESS_MINUTES: i64 = 10;

/// Picks the hardware to provision from a lease snapshot
pub trait LeaseSelector: Send + Sync {
    /// Return the hardware id to provision, or `None` when nothing qualifies
    fn select(&self, leases: &[Lease], now: DateTime<Utc>) -> Option<String>;
}

/// Keeps the last lease in inventory order whose expiry is within the
/// freshness window. The scan never stops early, so a later eligible lease
/// always wins over an earlier one regardless of their expiry times.
#[derive(Debug, Clone, Copy)]
pub struct LastEligible {
    pub freshness_window: Duration,
}

impl Default for LastEligible {
    fn default() -> Self {
        Self {
            freshness_window: Duration::minutes(DEFAULT_FRESHNESS_MINUTES),
        }
    }
}

impl LeaseSelector for LastEligible {
    fn select(&self, leases: &[Lease], now: DateTime<Utc>) -> Option<String> {
        select_target(leases, now, self.freshness_window)
    }
}

/// Last lease with `now - expiry < freshness_window`
pub fn select_target(leases: &[Lease], now: DateTime<Utc>, freshness_window: Duration) -> Option<String> {
    let mut selected = None;
    for lease in leases {
        if now - lease.expiry < freshness_window {
            selected = Some(lease.nic.clone());
        }
    }
    selected
}
