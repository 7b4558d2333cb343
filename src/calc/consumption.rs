use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// How `actual_consumed` is derived from a feeding entry.
///
/// `RefillTracking` reads "put out" as the food served in this entry, with leftovers and
/// refills recorded alongside. `BowlWeight` reads "put out" as the current bowl weight and
/// counts the drop since the pet's previous entry as eaten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsumptionPolicy {
    #[default]
    RefillTracking,
    BowlWeight,
}

/// Raw amounts (grams) as entered for one feeding.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FeedingAmounts {
    pub put_out: f64,
    pub not_eaten: Option<f64>,
    pub refilled: Option<f64>,
}

impl ConsumptionPolicy {
    /// `previous_put_out` is only read by `BowlWeight`; a missing value counts as 0.
    pub fn consumed(self, amounts: &FeedingAmounts, previous_put_out: Option<f64>) -> f64 {
        match self {
            ConsumptionPolicy::RefillTracking => consumed_with_refills(
                amounts.put_out,
                amounts.not_eaten.unwrap_or(0.0),
                amounts.refilled.unwrap_or(0.0),
            ),
            ConsumptionPolicy::BowlWeight => {
                consumed_from_bowl_weight(amounts.put_out, previous_put_out.unwrap_or(0.0))
            }
        }
    }

    pub fn needs_previous_entry(self) -> bool {
        matches!(self, ConsumptionPolicy::BowlWeight)
    }
}

pub fn consumed_with_refills(put_out: f64, not_eaten: f64, refilled: f64) -> f64 {
    (put_out + refilled - not_eaten).max(0.0)
}

pub fn consumed_from_bowl_weight(current_weight: f64, previous_put_out: f64) -> f64 {
    (previous_put_out - current_weight).max(0.0)
}

impl fmt::Display for ConsumptionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsumptionPolicy::RefillTracking => f.write_str("refill_tracking"),
            ConsumptionPolicy::BowlWeight => f.write_str("bowl_weight"),
        }
    }
}

impl FromStr for ConsumptionPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "refill" | "refill_tracking" => Ok(ConsumptionPolicy::RefillTracking),
            "bowl" | "bowl_weight" => Ok(ConsumptionPolicy::BowlWeight),
            other => anyhow::bail!("unknown consumption policy: {other}"),
        }
    }
}
