//! Client for the remote gardening-status API

pub mod client;
pub mod models;

pub use client::{ApiError, GardenClient};
pub use models::{Checkup, HealthReport, PlantDetail, PlantSummary, TeamDetail, TeamSummary};
