//! Request-side checks shared by the entity handlers.

use serde::Deserialize;
use tracing::warn;

use crate::{
    calc::{AmountInput, DecimalSeparator},
    error::{AppError, AppResult},
};

pub const MAX_NAME_LEN: usize = 120;
pub const MAX_NOTES_LEN: usize = 2000;

/// `DELETE ...?confirm=true`; deletes cascade, so the client has to ask twice.
#[derive(Debug, Default, Deserialize)]
pub struct DeleteQuery {
    #[serde(default)]
    pub confirm: bool,
}

impl DeleteQuery {
    pub fn require(&self) -> AppResult<()> {
        if self.confirm {
            Ok(())
        } else {
            Err(AppError::ConfirmationRequired)
        }
    }
}

pub fn required_text(field: &str, value: &str) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        warn!(field, "required field missing");
        return Err(AppError::validation(format!("{field} is required")));
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(AppError::validation(format!("{field} is too long")));
    }
    Ok(trimmed.to_string())
}

/// Trimmed text, with blank input stored as absent.
pub fn optional_text(field: &str, value: Option<String>, max_len: usize) -> AppResult<Option<String>> {
    let Some(value) = value else { return Ok(None) };
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if trimmed.chars().count() > max_len {
        return Err(AppError::validation(format!("{field} is too long")));
    }
    Ok(Some(trimmed.to_string()))
}

/// Range and scale of a `NUMERIC(precision, scale)` column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Numeric {
    precision: i32,
    scale: i32,
}

pub const AMOUNT: Numeric = Numeric::new(8, 2);
pub const WEIGHT: Numeric = Numeric::new(6, 2);
pub const DENSITY: Numeric = Numeric::new(8, 4);
pub const CALORIES: Numeric = Numeric::new(10, 2);

impl Numeric {
    pub const fn new(precision: i32, scale: i32) -> Self {
        Self { precision, scale }
    }

    /// Largest storable value, e.g. 9999.99 for `NUMERIC(6,2)`.
    pub fn max(self) -> f64 {
        self.round(10f64.powi(self.precision - self.scale) - 10f64.powi(-self.scale))
    }

    pub fn round(self, value: f64) -> f64 {
        let factor = 10f64.powi(self.scale);
        (value * factor).round() / factor
    }

    /// Rounded `value`, or a validation error when the column cannot hold it.
    pub fn fit(self, field: &str, value: f64) -> AppResult<f64> {
        let rounded = self.round(value);
        if rounded > self.max() {
            warn!(field, value, "amount out of range");
            return Err(AppError::validation(format!(
                "{field} must not exceed {}",
                self.max()
            )));
        }
        Ok(rounded)
    }
}

pub fn non_negative(
    field: &str,
    value: &AmountInput,
    sep: DecimalSeparator,
    column: Numeric,
) -> AppResult<f64> {
    let v = value
        .resolve(sep)
        .map_err(|e| AppError::validation(format!("{field}: {e}")))?;
    if v < 0.0 {
        return Err(AppError::validation(format!("{field} must not be negative")));
    }
    column.fit(field, v)
}

pub fn optional_non_negative(
    field: &str,
    value: Option<&AmountInput>,
    sep: DecimalSeparator,
    column: Numeric,
) -> AppResult<Option<f64>> {
    value.map(|v| non_negative(field, v, sep, column)).transpose()
}

pub fn positive(
    field: &str,
    value: &AmountInput,
    sep: DecimalSeparator,
    column: Numeric,
) -> AppResult<f64> {
    let v = non_negative(field, value, sep, column)?;
    if v == 0.0 {
        return Err(AppError::validation(format!("{field} must be greater than zero")));
    }
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_required_text_is_rejected() {
        assert!(required_text("name", "   ").is_err());
        assert_eq!(required_text("name", "  Rex ").unwrap(), "Rex");
    }

    #[test]
    fn blank_optional_text_becomes_none() {
        assert_eq!(optional_text("breed", Some("  ".into()), 10).unwrap(), None);
        assert!(optional_text("breed", Some("x".repeat(11)), 10).is_err());
    }

    #[test]
    fn amounts_respect_sign_rules() {
        let sep = DecimalSeparator::Comma;
        assert_eq!(non_negative("a", &AmountInput::Text("0,0".into()), sep, AMOUNT).unwrap(), 0.0);
        assert!(non_negative("a", &AmountInput::Number(-1.0), sep, AMOUNT).is_err());
        assert!(positive("w", &AmountInput::Number(0.0), sep, WEIGHT).is_err());
        assert!(positive("w", &AmountInput::Number(0.001), sep, WEIGHT).is_err());
        assert_eq!(optional_non_negative("r", None, sep, AMOUNT).unwrap(), None);
    }

    #[test]
    fn delete_needs_confirmation() {
        assert!(DeleteQuery::default().require().is_err());
        assert!(DeleteQuery { confirm: true }.require().is_ok());
    }

    #[test]
    fn column_limits_follow_numeric_precision() {
        assert_eq!(WEIGHT.max(), 9999.99);
        assert_eq!(AMOUNT.max(), 999_999.99);
        assert_eq!(DENSITY.max(), 9999.9999);
        assert_eq!(CALORIES.max(), 99_999_999.99);
    }

    #[test]
    fn values_beyond_the_column_are_rejected() {
        let sep = DecimalSeparator::Dot;
        assert!(positive("weight", &AmountInput::Number(10_000.0), sep, WEIGHT).is_err());
        assert_eq!(positive("weight", &AmountInput::Number(9999.99), sep, WEIGHT).unwrap(), 9999.99);
        assert!(non_negative("density", &AmountInput::Number(12_345.0), sep, DENSITY).is_err());
        assert!(non_negative("put_out", &AmountInput::Number(1_000_000.0), sep, AMOUNT).is_err());
        // rounds up past the limit
        assert!(non_negative("put_out", &AmountInput::Number(999_999.996), sep, AMOUNT).is_err());
        assert!(CALORIES.fit("calories", 1e8).is_err());
    }

    #[test]
    fn values_are_rounded_to_the_column_scale() {
        let sep = DecimalSeparator::Dot;
        assert_eq!(
            non_negative("density", &AmountInput::Number(3.66666), sep, DENSITY).unwrap(),
            3.6667
        );
        assert_eq!(non_negative("put_out", &AmountInput::Number(12.345), sep, AMOUNT).unwrap(), 12.35);
    }
}
