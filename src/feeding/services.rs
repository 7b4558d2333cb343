use time::OffsetDateTime;
use tracing::debug;
use uuid::Uuid;

use super::{
    dto::FeedingRequest,
    repo_types::{FeedingRow, FeedingWrite},
};
use crate::{
    calc::{round2, ConsumptionPolicy, FeedingAmounts},
    error::{AppError, AppResult},
    foods::repo_types::Food,
    forms::{non_negative, optional_non_negative, optional_text, AMOUNT, CALORIES, MAX_NOTES_LEN},
    state::AppState,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Derived {
    pub actual_consumed: f64,
    pub calories_consumed: Option<f64>,
}

/// Apply the active consumption policy and the food's calorie density.
pub fn derive(
    policy: ConsumptionPolicy,
    amounts: &FeedingAmounts,
    previous_put_out: Option<f64>,
    food: &Food,
) -> Derived {
    let consumed = round2(policy.consumed(amounts, previous_put_out));
    Derived {
        actual_consumed: consumed,
        calories_consumed: food.calories_for(consumed).map(round2),
    }
}

/// Validate a feeding form and produce the row to write.
///
/// `existing` is the stored entry on update: it keeps its `fed_at` when the form omits one
/// and is never its own predecessor.
pub async fn prepare_write(
    state: &AppState,
    user_id: Uuid,
    body: FeedingRequest,
    existing: Option<&FeedingRow>,
) -> AppResult<FeedingWrite> {
    let tracking = &state.config.tracking;
    let sep = tracking.separator_for(body.locale.as_deref());

    let amounts = FeedingAmounts {
        put_out: non_negative("amount_put_out", &body.amount_put_out, sep, AMOUNT)?,
        not_eaten: optional_non_negative(
            "amount_not_eaten",
            body.amount_not_eaten.as_ref(),
            sep,
            AMOUNT,
        )?,
        refilled: optional_non_negative(
            "amount_refilled",
            body.amount_refilled.as_ref(),
            sep,
            AMOUNT,
        )?,
    };
    let notes = optional_text("notes", body.notes, MAX_NOTES_LEN)?;
    let fed_at = body
        .fed_at
        .or(existing.map(|row| row.fed_at))
        .unwrap_or_else(OffsetDateTime::now_utc);

    state
        .store
        .get_pet(user_id, body.pet_id)
        .await?
        .ok_or(AppError::NotFound("pet"))?;
    let food = state
        .store
        .get_food(user_id, body.food_id)
        .await?
        .ok_or(AppError::NotFound("food"))?;

    let policy = tracking.consumption_policy;
    let previous = if policy.needs_previous_entry() {
        state
            .store
            .previous_put_out(user_id, body.pet_id, fed_at, existing.map(|row| row.id))
            .await?
    } else {
        None
    };

    let derived = derive(policy, &amounts, previous, &food);
    debug!(%policy, ?previous, consumed = derived.actual_consumed, "feeding derived");
    let actual_consumed = AMOUNT.fit("actual_consumed", derived.actual_consumed)?;
    let calories_consumed = derived
        .calories_consumed
        .map(|c| CALORIES.fit("calories_consumed", c))
        .transpose()?;

    Ok(FeedingWrite {
        pet_id: body.pet_id,
        food_id: body.food_id,
        amount_put_out: amounts.put_out,
        amount_not_eaten: amounts.not_eaten,
        amount_refilled: amounts.refilled,
        actual_consumed,
        calories_consumed,
        fed_at,
        notes,
    })
}
