use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::WeightRow;
use crate::calc::AmountInput;

#[derive(Debug, Deserialize)]
pub struct WeightRequest {
    pub pet_id: Uuid,
    pub weight: AmountInput,
    /// Defaults to now.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub weighed_at: Option<OffsetDateTime>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub locale: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WeightQuery {
    pub pet_id: Option<Uuid>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub since: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub until: Option<OffsetDateTime>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct WeightResponse {
    pub id: Uuid,
    pub pet_id: Uuid,
    pub pet_name: String,
    pub weight: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub weighed_at: OffsetDateTime,
    pub notes: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<WeightRow> for WeightResponse {
    fn from(r: WeightRow) -> Self {
        Self {
            id: r.id,
            pet_id: r.pet_id,
            pet_name: r.pet_name,
            weight: r.weight,
            weighed_at: r.weighed_at,
            notes: r.notes,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}
