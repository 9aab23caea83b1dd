use chrono::{Datelike, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

/// One inline form error, keyed by the form control name the front end uses.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldFailure {
    MissingValue { field: &'static str },
    InvalidEmail { field: &'static str },
    InvalidCharacters { field: &'static str },
    NotANumber { field: &'static str },
    BelowMinimum { field: &'static str, minimum: String },
    AboveMaximum { field: &'static str, maximum: String },
}

impl FieldFailure {
    pub fn field(&self) -> &'static str {
        match self {
            Self::MissingValue { field }
            | Self::InvalidEmail { field }
            | Self::InvalidCharacters { field }
            | Self::NotANumber { field }
            | Self::BelowMinimum { field, .. }
            | Self::AboveMaximum { field, .. } => field,
        }
    }

    pub fn reason(&self) -> String {
        match self {
            Self::MissingValue { field } => format!("`{field}` is required"),
            Self::InvalidEmail { field } => format!("`{field}` must be a valid email address"),
            Self::InvalidCharacters { field } => {
                format!("`{field}` may only contain digits, spaces, and + - ( )")
            }
            Self::NotANumber { field } => format!("`{field}` must be a number"),
            Self::BelowMinimum { field, minimum } => {
                format!("`{field}` must be at least {minimum}")
            }
            Self::AboveMaximum { field, maximum } => {
                format!("`{field}` must be at most {maximum}")
            }
        }
    }
}

/// Numeric bounds applied to the category-specific quote forms. The default
/// vehicle-year ceiling tracks the clock (next year's models are quotable).
#[derive(Clone, Debug, PartialEq)]
pub struct QuoteFormRules {
    pub minimum_property_value: Decimal,
    pub minimum_vehicle_year: i32,
    pub maximum_vehicle_year: i32,
    pub minimum_employee_count: u32,
}

impl Default for QuoteFormRules {
    fn default() -> Self {
        Self {
            minimum_property_value: Decimal::from(50_000),
            minimum_vehicle_year: 1980,
            maximum_vehicle_year: Utc::now().year() + 1,
            minimum_employee_count: 1,
        }
    }
}

pub fn well_formed_email(value: &str) -> bool {
    let value = value.trim();
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !value.chars().any(char::is_whitespace)
}

pub fn allowed_phone(value: &str) -> bool {
    value
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '-' | '+' | ' ' | '(' | ')'))
}
