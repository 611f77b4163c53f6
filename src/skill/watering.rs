//! Watering-need inference
//!
//! The remote API has gone through several schema conventions for the
//! watering signal: an explicit boolean flag (snake_case and camelCase,
//! both accepted by the serde models), a free-form status string, and a
//! per-plant checkup history. All are kept as ordered strategies; do not
//! collapse them, deployments in the wild still emit each shape.
//!
//! Order: team-summary entry, then the plant detail (only fetched when the
//! summary is inconclusive), then the latest checkup. No signal anywhere
//! means the plant is classified as not needing water.

use crate::api::{Checkup, PlantDetail, PlantSummary};

/// Signal from a free-form status string, if it is conclusive.
fn status_signal(status: Option<&str>) -> Option<bool> {
    let status = status?.to_lowercase();
    if status.contains("needs water") || status.contains("thirsty") || status.contains("dry") {
        return Some(true);
    }
    if status.contains("healthy")
        || status.contains("watered")
        || status.contains("fine")
        || status == "ok"
    {
        return Some(false);
    }
    None
}

/// Strategy 1: the plant entry in the team detail.
pub fn from_summary(plant: &PlantSummary) -> Option<bool> {
    plant
        .needs_water
        .or_else(|| status_signal(plant.status.as_deref()))
}

fn from_checkup(checkup: &Checkup) -> Option<bool> {
    checkup
        .needs_water
        .or_else(|| status_signal(checkup.status.as_deref()))
}

/// Strategies 2 and 3: the plant detail record, then its latest checkup.
pub fn from_detail(detail: &PlantDetail) -> Option<bool> {
    detail
        .needs_water
        .or_else(|| status_signal(detail.status.as_deref()))
        .or_else(|| detail.latest_checkup().and_then(from_checkup))
}
