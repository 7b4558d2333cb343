use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Decimal separator of the locale the user typed an amount in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecimalSeparator {
    #[default]
    Dot,
    Comma,
}

// Languages whose number formatting uses a decimal comma.
const COMMA_LANGUAGES: &[&str] = &[
    "bg", "ca", "cs", "da", "de", "el", "es", "et", "fi", "fr", "hr", "hu", "id", "it", "lt",
    "lv", "nb", "nl", "nn", "no", "pl", "pt", "ro", "ru", "sk", "sl", "sr", "sv", "tr", "uk",
    "vi",
];

impl DecimalSeparator {
    /// Separator for a BCP-47 tag such as `de-AT` or `en_US`; unknown tags use a dot.
    pub fn for_locale(tag: &str) -> Self {
        let language = tag
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        if COMMA_LANGUAGES.contains(&language.as_str()) {
            DecimalSeparator::Comma
        } else {
            DecimalSeparator::Dot
        }
    }

    fn chars(self) -> (char, char) {
        match self {
            DecimalSeparator::Dot => ('.', ','),
            DecimalSeparator::Comma => (',', '.'),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum AmountParseError {
    #[error("amount is empty")]
    Empty,
    #[error("`{0}` is not a number")]
    NotANumber(String),
    #[error("amount must be a finite number")]
    NotFinite,
}

/// Parse a user-entered amount.
///
/// When both separators appear, the locale's separator is the decimal point and the other one
/// groups thousands. Otherwise a foreign separator that only splits off groups of three digits
/// (`1,000` under a dot locale) groups thousands too, and any other foreign separator is taken
/// as the decimal point, so `3,5` and `3.5` read the same in either mode.
pub fn parse_amount(text: &str, separator: DecimalSeparator) -> Result<f64, AmountParseError> {
    let compact: String = text
        .trim()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\u{a0}' && *c != '\'')
        .collect();
    if compact.is_empty() {
        return Err(AmountParseError::Empty);
    }

    let (decimal, grouping) = separator.chars();
    let normalized = if compact.contains(decimal) && compact.contains(grouping) {
        compact.replace(grouping, "").replace(decimal, ".")
    } else if groups_thousands(&compact, grouping) {
        compact.replace(grouping, "")
    } else {
        compact.replace(grouping, ".").replace(decimal, ".")
    };

    let value: f64 = normalized
        .parse()
        .map_err(|_| AmountParseError::NotANumber(text.trim().to_string()))?;
    if !value.is_finite() {
        return Err(AmountParseError::NotFinite);
    }
    Ok(value)
}

/// `1,000` or `12,345,678`: a leading group of one to three digits, then groups of exactly three.
fn groups_thousands(text: &str, sep: char) -> bool {
    let is_digits = |g: &str| g.bytes().all(|b| b.is_ascii_digit());
    let mut groups = text.trim_start_matches(|c: char| c == '-' || c == '+').split(sep);
    let Some(head) = groups.next() else {
        return false;
    };
    if !(1..=3).contains(&head.len()) || !is_digits(head) || head.starts_with('0') {
        return false;
    }
    let mut rest = groups.peekable();
    rest.peek().is_some() && rest.all(|g| g.len() == 3 && is_digits(g))
}

/// An amount as it arrives in a request body: a JSON number or the text from a form field.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    Number(f64),
    Text(String),
}

impl AmountInput {
    pub fn resolve(&self, separator: DecimalSeparator) -> Result<f64, AmountParseError> {
        match self {
            AmountInput::Number(n) if n.is_finite() => Ok(*n),
            AmountInput::Number(_) => Err(AmountParseError::NotFinite),
            AmountInput::Text(s) => parse_amount(s, separator),
        }
    }
}

impl From<f64> for AmountInput {
    fn from(value: f64) -> Self {
        AmountInput::Number(value)
    }
}
