use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use time::{OffsetDateTime, UtcOffset};
use tracing::instrument;

use super::{
    aggregate::{
        daily_totals, food_distribution, local_date, totals_by_pet, weight_series, DailyTotals,
        WeightPoint, Window,
    },
    dto::{AnalyticsQuery, AnalyticsResponse, DashboardQuery, DashboardResponse, PetSummary, WindowInfo},
};
use crate::{
    auth::AuthUser,
    calc::pet_age,
    error::{AppError, AppResult},
    feeding::FeedingResponse,
    state::AppState,
    store::ListFilter,
};

pub const DEFAULT_WINDOW_DAYS: u16 = 30;
pub const MAX_WINDOW_DAYS: u16 = 365;
const RECENT_FEEDINGS: i64 = 5;

pub fn analytics_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/analytics", get(analytics))
}

fn resolve_offset(state: &AppState, minutes: Option<i32>) -> AppResult<UtcOffset> {
    state
        .config
        .tracking
        .offset_for(minutes)
        .map_err(|e| AppError::validation(e.to_string()))
}

#[instrument(skip(state))]
pub async fn analytics(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<AnalyticsQuery>,
) -> AppResult<Json<AnalyticsResponse>> {
    let days = q.days.unwrap_or(DEFAULT_WINDOW_DAYS);
    if !(1..=MAX_WINDOW_DAYS).contains(&days) {
        return Err(AppError::validation(format!(
            "days must be between 1 and {MAX_WINDOW_DAYS}"
        )));
    }
    let offset = resolve_offset(&state, q.utc_offset_minutes)?;
    if let Some(pet_id) = q.pet_id {
        state
            .store
            .get_pet(user_id, pet_id)
            .await?
            .ok_or(AppError::NotFound("pet"))?;
    }

    let today = local_date(OffsetDateTime::now_utc(), offset);
    let window = Window::last_days(days, today, offset);
    let filter = ListFilter {
        pet_id: q.pet_id,
        since: Some(window.start_instant()),
        until: Some(window.end_instant()),
        ..Default::default()
    };
    let feedings = state.store.list_feedings(user_id, &filter).await?;
    let weights = state.store.list_weights(user_id, &filter).await?;

    Ok(Json(AnalyticsResponse {
        window: WindowInfo {
            start: window.start,
            end: window.end,
            days,
            utc_offset_minutes: i32::from(offset.whole_minutes()),
        },
        pet_id: q.pet_id,
        daily_calories: daily_totals(&feedings, &window),
        food_distribution: food_distribution(&feedings),
        weight_series: weight_series(&weights, offset),
    }))
}

#[instrument(skip(state))]
pub async fn dashboard(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<DashboardQuery>,
) -> AppResult<Json<DashboardResponse>> {
    let offset = resolve_offset(&state, q.utc_offset_minutes)?;
    let today = local_date(OffsetDateTime::now_utc(), offset);
    let window = Window::last_days(1, today, offset);

    let pets = state.store.list_pets(user_id).await?;
    let foods = state.store.list_foods(user_id).await?;
    let todays_feedings = state
        .store
        .list_feedings(
            user_id,
            &ListFilter {
                since: Some(window.start_instant()),
                until: Some(window.end_instant()),
                ..Default::default()
            },
        )
        .await?;
    let recent = state
        .store
        .list_feedings(user_id, &ListFilter::default().latest(RECENT_FEEDINGS))
        .await?;

    let today_totals = daily_totals(&todays_feedings, &window)
        .pop()
        .unwrap_or_else(|| DailyTotals::empty(today));
    let per_pet = totals_by_pet(&todays_feedings);

    let mut summaries = Vec::with_capacity(pets.len());
    for pet in &pets {
        let latest_weight = state
            .store
            .list_weights(user_id, &ListFilter::for_pet(Some(pet.id)).latest(1))
            .await?
            .into_iter()
            .next()
            .map(|w| WeightPoint {
                date: local_date(w.weighed_at, offset),
                weighed_at: w.weighed_at,
                weight: w.weight,
            });
        let totals = per_pet.get(&pet.id).copied().unwrap_or_default();
        summaries.push(PetSummary {
            id: pet.id,
            name: pet.name.clone(),
            species: pet.species,
            age: pet.birth_date.and_then(|b| pet_age(b, today)),
            target_weight: pet.target_weight,
            latest_weight,
            feedings_today: totals.feedings,
            consumed_today: totals.consumed,
            calories_today: totals.calories,
        });
    }

    Ok(Json(DashboardResponse {
        pet_count: pets.len(),
        food_count: foods.len(),
        today: today_totals,
        pets: summaries,
        recent_feedings: recent.into_iter().map(FeedingResponse::from).collect(),
    }))
}
