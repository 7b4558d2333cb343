use serde::{Deserialize, Serialize};
use time::Date;
use uuid::Uuid;

use super::aggregate::{DailyTotals, FoodShare, PetWeightSeries, WeightPoint};
use crate::{
    calc::PetAge,
    feeding::FeedingResponse,
    pets::repo_types::Species,
};

#[derive(Debug, Deserialize)]
pub struct AnalyticsQuery {
    /// Window length; the UI offers 7, 30 and 90.
    pub days: Option<u16>,
    pub pet_id: Option<Uuid>,
    pub utc_offset_minutes: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    pub utc_offset_minutes: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct WindowInfo {
    #[serde(with = "crate::formats::iso_date")]
    pub start: Date,
    #[serde(with = "crate::formats::iso_date")]
    pub end: Date,
    pub days: u16,
    pub utc_offset_minutes: i32,
}

#[derive(Debug, Serialize)]
pub struct AnalyticsResponse {
    pub window: WindowInfo,
    pub pet_id: Option<Uuid>,
    pub daily_calories: Vec<DailyTotals>,
    pub food_distribution: Vec<FoodShare>,
    pub weight_series: Vec<PetWeightSeries>,
}

#[derive(Debug, Serialize)]
pub struct PetSummary {
    pub id: Uuid,
    pub name: String,
    pub species: Species,
    pub age: Option<PetAge>,
    pub target_weight: Option<f64>,
    pub latest_weight: Option<WeightPoint>,
    pub feedings_today: u32,
    pub consumed_today: f64,
    pub calories_today: f64,
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub pet_count: usize,
    pub food_count: usize,
    pub today: DailyTotals,
    pub pets: Vec<PetSummary>,
    pub recent_feedings: Vec<FeedingResponse>,
}
