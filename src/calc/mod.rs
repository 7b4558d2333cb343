//! Pure domain calculators: consumption, calories, amount parsing and pet age.

pub mod age;
pub mod amount;
pub mod calories;
pub mod consumption;

pub use age::{pet_age, PetAge};
pub use amount::{parse_amount, AmountInput, AmountParseError, DecimalSeparator};
pub use calories::compute_calories;
pub use consumption::{ConsumptionPolicy, FeedingAmounts};

/// Round to the two decimals the database keeps for amounts and calories.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
