//! Entities returned by the gardening-status API
//!
//! The remote schema is unstable: the watering-need signal shows up as a
//! snake_case flag, a camelCase flag, or a free-form status string
//! depending on the endpoint and deployment. Serde aliases accept both
//! flag spellings; the status-string check lives in `skill::watering`.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Response of the health endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthReport {
    pub status: String,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TeamsResponse {
    pub teams: Vec<TeamSummary>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TeamSummary {
    pub id: String,
    pub name: String,
}

/// Team detail: summary entries for each plant on the team.
#[derive(Debug, Clone, Deserialize)]
pub struct TeamDetail {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub plants: Vec<PlantSummary>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlantSummary {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, alias = "needsWater")]
    pub needs_water: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlantDetail {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, alias = "needsWater")]
    pub needs_water: Option<bool>,
    #[serde(default, alias = "checkUps")]
    pub checkups: Vec<Checkup>,
}

impl PlantDetail {
    /// Most recent checkup by timestamp, if any.
    pub fn latest_checkup(&self) -> Option<&Checkup> {
        self.checkups.iter().max_by_key(|c| c.timestamp)
    }
}

/// Timestamped plant-status record.
#[derive(Debug, Clone, Deserialize)]
pub struct Checkup {
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, alias = "needsWater")]
    pub needs_water: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plant_summary_accepts_camel_case_flag() {
        let plant: PlantSummary =
            serde_json::from_str(r#"{"id":"p1","name":"Fern","needsWater":true}"#).unwrap();
        assert_eq!(plant.needs_water, Some(true));
    }

    #[test]
    fn test_plant_summary_accepts_snake_case_flag() {
        let plant: PlantSummary =
            serde_json::from_str(r#"{"id":"p1","name":"Fern","needs_water":false}"#).unwrap();
        assert_eq!(plant.needs_water, Some(false));
    }

    #[test]
    fn test_latest_checkup_picks_most_recent() {
        let detail: PlantDetail = serde_json::from_str(
            r#"{
                "id": "p1",
                "name": "Fern",
                "checkups": [
                    {"timestamp": "2024-05-01T10:00:00Z", "status": "fine"},
                    {"timestamp": "2024-05-03T10:00:00Z", "status": "needs water"},
                    {"timestamp": "2024-05-02T10:00:00Z", "status": "fine"}
                ]
            }"#,
        )
        .unwrap();
        let latest = detail.latest_checkup().unwrap();
        assert_eq!(latest.status.as_deref(), Some("needs water"));
    }

    #[test]
    fn test_missing_fields_default() {
        let detail: PlantDetail =
            serde_json::from_str(r#"{"id":"p1","name":"Fern"}"#).unwrap();
        assert!(detail.status.is_none());
        assert!(detail.needs_water.is_none());
        assert!(detail.checkups.is_empty());
        assert!(detail.latest_checkup().is_none());
    }
}
