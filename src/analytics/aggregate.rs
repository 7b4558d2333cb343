//! Reductions over feeding and weight rows for charts and the dashboard.
//!
//! Days are local calendar days under the window's UTC offset.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use time::{Date, Duration, OffsetDateTime, UtcOffset};
use uuid::Uuid;

use crate::{calc::round2, feeding::repo_types::FeedingRow, weights::repo_types::WeightRow};

/// Inclusive range of local calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: Date,
    pub end: Date,
    pub offset: UtcOffset,
}

impl Window {
    /// The `days` days ending with (and including) `today`.
    pub fn last_days(days: u16, today: Date, offset: UtcOffset) -> Self {
        let span = i64::from(days.max(1)) - 1;
        Self {
            start: today - Duration::days(span),
            end: today,
            offset,
        }
    }

    pub fn start_instant(&self) -> OffsetDateTime {
        self.start.midnight().assume_offset(self.offset)
    }

    /// First instant after the window.
    pub fn end_instant(&self) -> OffsetDateTime {
        (self.end.midnight() + Duration::days(1)).assume_offset(self.offset)
    }

    pub fn days(&self) -> impl Iterator<Item = Date> + '_ {
        std::iter::successors(Some(self.start), |d| d.next_day()).take_while(|d| *d <= self.end)
    }
}

pub fn local_date(at: OffsetDateTime, offset: UtcOffset) -> Date {
    at.to_offset(offset).date()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyTotals {
    #[serde(with = "crate::formats::iso_date")]
    pub date: Date,
    pub feedings: u32,
    pub consumed: f64,
    pub calories: f64,
}

impl DailyTotals {
    pub fn empty(date: Date) -> Self {
        Self {
            date,
            feedings: 0,
            consumed: 0.0,
            calories: 0.0,
        }
    }
}

/// One bucket per day of the window, zero-filled, oldest first.
/// Feedings without calories count toward grams only.
pub fn daily_totals(rows: &[FeedingRow], window: &Window) -> Vec<DailyTotals> {
    let mut buckets: BTreeMap<Date, DailyTotals> =
        window.days().map(|d| (d, DailyTotals::empty(d))).collect();

    for row in rows {
        let day = local_date(row.fed_at, window.offset);
        if let Some(bucket) = buckets.get_mut(&day) {
            bucket.feedings += 1;
            bucket.consumed += row.actual_consumed;
            bucket.calories += row.calories_consumed.unwrap_or(0.0);
        }
    }

    buckets
        .into_values()
        .map(|mut b| {
            b.consumed = round2(b.consumed);
            b.calories = round2(b.calories);
            b
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FoodShare {
    pub food_name: String,
    pub total_amount: f64,
    /// Percent of all grams consumed in the input.
    pub share: f64,
}

/// Consumed grams by food name, largest first.
pub fn food_distribution(rows: &[FeedingRow]) -> Vec<FoodShare> {
    let mut by_name: HashMap<&str, f64> = HashMap::new();
    for row in rows {
        *by_name.entry(row.food_name.as_str()).or_default() += row.actual_consumed;
    }
    let total: f64 = by_name.values().sum();

    let mut shares: Vec<FoodShare> = by_name
        .into_iter()
        .map(|(name, amount)| FoodShare {
            food_name: name.to_string(),
            total_amount: round2(amount),
            share: if total > 0.0 {
                round2(amount / total * 100.0)
            } else {
                0.0
            },
        })
        .collect();
    shares.sort_by(|a, b| {
        b.total_amount
            .total_cmp(&a.total_amount)
            .then_with(|| a.food_name.cmp(&b.food_name))
    });
    shares
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightPoint {
    #[serde(with = "crate::formats::iso_date")]
    pub date: Date,
    #[serde(with = "time::serde::rfc3339")]
    pub weighed_at: OffsetDateTime,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PetWeightSeries {
    pub pet_id: Uuid,
    pub pet_name: String,
    pub points: Vec<WeightPoint>,
}

/// Chronological weight points per pet, pets ordered by name.
pub fn weight_series(rows: &[WeightRow], offset: UtcOffset) -> Vec<PetWeightSeries> {
    let mut by_pet: HashMap<Uuid, PetWeightSeries> = HashMap::new();
    for row in rows {
        by_pet
            .entry(row.pet_id)
            .or_insert_with(|| PetWeightSeries {
                pet_id: row.pet_id,
                pet_name: row.pet_name.clone(),
                points: Vec::new(),
            })
            .points
            .push(WeightPoint {
                date: local_date(row.weighed_at, offset),
                weighed_at: row.weighed_at,
                weight: row.weight,
            });
    }

    let mut series: Vec<PetWeightSeries> = by_pet.into_values().collect();
    for s in &mut series {
        s.points.sort_by_key(|p| p.weighed_at);
    }
    series.sort_by(|a, b| a.pet_name.cmp(&b.pet_name).then(a.pet_id.cmp(&b.pet_id)));
    series
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PetTotals {
    pub feedings: u32,
    pub consumed: f64,
    pub calories: f64,
}

/// Totals per pet over whatever rows are passed in.
pub fn totals_by_pet(rows: &[FeedingRow]) -> HashMap<Uuid, PetTotals> {
    let mut totals: HashMap<Uuid, PetTotals> = HashMap::new();
    for row in rows {
        let t = totals.entry(row.pet_id).or_default();
        t.feedings += 1;
        t.consumed += row.actual_consumed;
        t.calories += row.calories_consumed.unwrap_or(0.0);
    }
    for t in totals.values_mut() {
        t.consumed = round2(t.consumed);
        t.calories = round2(t.calories);
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime, offset};

    fn feeding(pet: Uuid, food: &str, at: OffsetDateTime, consumed: f64, calories: Option<f64>) -> FeedingRow {
        FeedingRow {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            pet_id: pet,
            pet_name: "Rex".into(),
            food_id: Uuid::new_v4(),
            food_name: food.into(),
            food_brand: None,
            amount_put_out: consumed,
            amount_not_eaten: None,
            amount_refilled: None,
            actual_consumed: consumed,
            calories_consumed: calories,
            fed_at: at,
            notes: None,
            created_at: at,
            updated_at: at,
        }
    }

    fn weight(pet: Uuid, name: &str, at: OffsetDateTime, kg: f64) -> WeightRow {
        WeightRow {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            pet_id: pet,
            pet_name: name.into(),
            weight: kg,
            weighed_at: at,
            notes: None,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn window_spans_requested_days() {
        let w = Window::last_days(7, date!(2024 - 03 - 10), UtcOffset::UTC);
        assert_eq!(w.start, date!(2024 - 03 - 04));
        assert_eq!(w.days().count(), 7);
        assert_eq!(w.end_instant(), datetime!(2024-03-11 0:00 UTC));
    }

    #[test]
    fn three_feedings_same_day_share_one_bucket() {
        let pet = Uuid::new_v4();
        let rows = vec![
            feeding(pet, "Kibble", datetime!(2024-03-10 07:00 UTC), 50.0, Some(200.0)),
            feeding(pet, "Kibble", datetime!(2024-03-10 12:30 UTC), 30.0, Some(120.0)),
            feeding(pet, "Wet", datetime!(2024-03-10 19:45 UTC), 80.0, None),
        ];
        let w = Window::last_days(3, date!(2024 - 03 - 10), UtcOffset::UTC);
        let days = daily_totals(&rows, &w);

        assert_eq!(days.len(), 3);
        assert_eq!(days[0], DailyTotals::empty(date!(2024 - 03 - 08)));
        let last = &days[2];
        assert_eq!(last.date, date!(2024 - 03 - 10));
        assert_eq!(last.feedings, 3);
        assert_eq!(last.consumed, 160.0);
        assert_eq!(last.calories, 320.0);
    }

    #[test]
    fn buckets_follow_local_calendar() {
        let pet = Uuid::new_v4();
        // 23:30 UTC on the 9th is already the 10th at +02:00.
        let rows = vec![feeding(pet, "Kibble", datetime!(2024-03-09 23:30 UTC), 40.0, Some(1.0))];
        let w = Window::last_days(2, date!(2024 - 03 - 10), offset!(+2));
        let days = daily_totals(&rows, &w);
        assert_eq!(days[0].feedings, 0);
        assert_eq!(days[1].feedings, 1);
    }

    #[test]
    fn distribution_is_sorted_by_amount() {
        let pet = Uuid::new_v4();
        let at = datetime!(2024-03-10 08:00 UTC);
        let rows = vec![
            feeding(pet, "Wet", at, 25.0, None),
            feeding(pet, "Kibble", at, 50.0, None),
            feeding(pet, "Kibble", at, 25.0, None),
        ];
        let dist = food_distribution(&rows);
        assert_eq!(dist.len(), 2);
        assert_eq!(dist[0].food_name, "Kibble");
        assert_eq!(dist[0].total_amount, 75.0);
        assert_eq!(dist[0].share, 75.0);
        assert_eq!(dist[1].share, 25.0);
    }

    #[test]
    fn distribution_of_nothing_is_empty() {
        assert!(food_distribution(&[]).is_empty());
    }

    #[test]
    fn weight_series_is_chronological_per_pet() {
        let rex = Uuid::new_v4();
        let mia = Uuid::new_v4();
        let rows = vec![
            weight(rex, "Rex", datetime!(2024-03-05 09:00 UTC), 12.4),
            weight(mia, "Mia", datetime!(2024-03-02 09:00 UTC), 4.1),
            weight(rex, "Rex", datetime!(2024-03-01 09:00 UTC), 12.1),
        ];
        let series = weight_series(&rows, UtcOffset::UTC);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].pet_name, "Mia");
        let rex_points: Vec<f64> = series[1].points.iter().map(|p| p.weight).collect();
        assert_eq!(rex_points, vec![12.1, 12.4]);
        assert_eq!(series[1].points[0].date, date!(2024 - 03 - 01));
    }

    #[test]
    fn totals_group_by_pet() {
        let rex = Uuid::new_v4();
        let mia = Uuid::new_v4();
        let at = datetime!(2024-03-10 08:00 UTC);
        let rows = vec![
            feeding(rex, "Kibble", at, 10.0, Some(40.0)),
            feeding(rex, "Kibble", at, 15.5, None),
            feeding(mia, "Wet", at, 20.0, Some(18.0)),
        ];
        let totals = totals_by_pet(&rows);
        assert_eq!(totals[&rex].feedings, 2);
        assert_eq!(totals[&rex].consumed, 25.5);
        assert_eq!(totals[&rex].calories, 40.0);
        assert_eq!(totals[&mia].calories, 18.0);
    }
}
