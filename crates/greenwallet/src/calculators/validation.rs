//! Input checks shared by every calculator.
//!
//! Calculators never coerce bad input to zero: a missing, unparseable, non-positive or
//! out-of-range quantity is rejected before any arithmetic runs.

use std::collections::BTreeMap;

use serde_json::Value;

use super::selection::Selection;

/// Loose key/value input as stored in profile presets or submitted by forms.
pub type InputFields = BTreeMap<String, Value>;

/// Recoverable input problem surfaced to the user before computation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("please fill in the required field `{field}`")]
    MissingField { field: &'static str },
    #[error("`{field}` must be a number, got '{raw}'")]
    NotANumber { field: &'static str, raw: String },
    #[error("`{field}` must be greater than zero, got {value}")]
    NotPositive { field: &'static str, value: f64 },
    #[error("`{field}` must be within {bounds}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        bounds: &'static str,
    },
    #[error("`{field}` must be a whole number, got {value}")]
    NotWholeNumber { field: &'static str, value: f64 },
    #[error("unknown {field} '{value}'")]
    UnknownSelection { field: &'static str, value: String },
    #[error("please choose different current and alternate transport modes")]
    SameTransportMode,
}

impl ValidationError {
    /// Stable machine-readable code so clients can tell the failure kinds apart.
    pub const fn code(&self) -> &'static str {
        match self {
            ValidationError::MissingField { .. } => "missing_field",
            ValidationError::NotANumber { .. } => "not_a_number",
            ValidationError::NotPositive { .. } => "not_positive",
            ValidationError::OutOfRange { .. } => "out_of_range",
            ValidationError::NotWholeNumber { .. } => "not_whole_number",
            ValidationError::UnknownSelection { .. } => "unknown_selection",
            ValidationError::SameTransportMode => "same_transport_mode",
        }
    }
}

pub(crate) fn require_present<T>(field: &'static str, value: Option<T>) -> Result<T, ValidationError> {
    value.ok_or(ValidationError::MissingField { field })
}

fn require_finite(field: &'static str, value: Option<f64>) -> Result<f64, ValidationError> {
    let value = require_present(field, value)?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ValidationError::NotANumber {
            field,
            raw: value.to_string(),
        })
    }
}

pub(crate) fn require_positive(
    field: &'static str,
    value: Option<f64>,
) -> Result<f64, ValidationError> {
    let value = require_finite(field, value)?;
    if value > 0.0 {
        Ok(value)
    } else {
        Err(ValidationError::NotPositive { field, value })
    }
}

/// Accepts values in `(0, max]`.
pub(crate) fn require_positive_at_most(
    field: &'static str,
    value: Option<f64>,
    max: f64,
    bounds: &'static str,
) -> Result<f64, ValidationError> {
    let value = require_positive(field, value)?;
    if value <= max {
        Ok(value)
    } else {
        Err(ValidationError::OutOfRange {
            field,
            value,
            bounds,
        })
    }
}

/// Accepts values in `[min, max]`.
pub(crate) fn require_between(
    field: &'static str,
    value: Option<f64>,
    min: f64,
    max: f64,
    bounds: &'static str,
) -> Result<f64, ValidationError> {
    let value = require_finite(field, value)?;
    if value <= 0.0 {
        return Err(ValidationError::NotPositive { field, value });
    }
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(ValidationError::OutOfRange {
            field,
            value,
            bounds,
        })
    }
}

pub(crate) fn require_whole(field: &'static str, value: Option<f64>) -> Result<f64, ValidationError> {
    let value = require_positive(field, value)?;
    if value.fract() == 0.0 {
        Ok(value)
    } else {
        Err(ValidationError::NotWholeNumber { field, value })
    }
}

/// Ceiling on any computed rupee, kilogram or score figure.
pub const MAX_IMPACT: f64 = 1.0e12;

/// Rejects a computed figure that overflowed or exceeds [`MAX_IMPACT`].
pub(crate) fn bounded_result(field: &'static str, value: f64) -> Result<f64, ValidationError> {
    if value.is_finite() && value.abs() <= MAX_IMPACT {
        Ok(value)
    } else {
        Err(ValidationError::OutOfRange {
            field,
            value,
            bounds: "[0, 1e12]",
        })
    }
}

/// Optional informational amount: absent is fine, present must be finite and non-negative.
pub(crate) fn optional_non_negative(
    field: &'static str,
    value: Option<f64>,
) -> Result<Option<f64>, ValidationError> {
    match value {
        None => Ok(None),
        Some(amount) if amount.is_finite() && amount >= 0.0 => Ok(Some(amount)),
        Some(amount) if amount.is_finite() => Err(ValidationError::OutOfRange {
            field,
            value: amount,
            bounds: "[0, inf)",
        }),
        Some(amount) => Err(ValidationError::NotANumber {
            field,
            raw: amount.to_string(),
        }),
    }
}

/// Reads a numeric field that may arrive as a JSON number or a numeric string.
///
/// Missing keys, `null` and blank strings read as `None` so the calculator reports the
/// field as missing rather than zero.
pub fn number_field(fields: &InputFields, key: &'static str) -> Result<Option<f64>, ValidationError> {
    match fields.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(number)) => number.as_f64().map(Some).ok_or_else(|| {
            ValidationError::NotANumber {
                field: key,
                raw: number.to_string(),
            }
        }),
        Some(Value::String(raw)) if raw.trim().is_empty() => Ok(None),
        Some(Value::String(raw)) => {
            raw.trim()
                .parse::<f64>()
                .map(Some)
                .map_err(|_| ValidationError::NotANumber {
                    field: key,
                    raw: raw.clone(),
                })
        }
        Some(other) => Err(ValidationError::NotANumber {
            field: key,
            raw: other.to_string(),
        }),
    }
}

/// Reads a categorical field by id, reporting unknown ids as [`ValidationError::UnknownSelection`].
pub fn selection_field<T: Selection>(
    fields: &InputFields,
    key: &str,
) -> Result<Option<T>, ValidationError> {
    match fields.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(raw)) if raw.trim().is_empty() => Ok(None),
        Some(Value::String(raw)) => T::parse(raw).map(Some),
        Some(other) => Err(ValidationError::UnknownSelection {
            field: T::FIELD,
            value: other.to_string(),
        }),
    }
}
