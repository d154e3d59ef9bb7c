use serde::{Deserialize, Serialize};

use crate::error::{CoachError, Result};

/// Message shown when a field does not coerce to a finite number.
pub const INVALID_NUMBER_MESSAGE: &str = "Please enter a valid number.";

/// The two form fields a submission carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementField {
    Weight,
    Height,
}

impl MeasurementField {
    pub fn label(&self) -> &'static str {
        match self {
            MeasurementField::Weight => "Weight",
            MeasurementField::Height => "Height",
        }
    }

    fn positive_message(&self) -> String {
        format!("{} must be a positive number.", self.label())
    }
}

/// A field-level validation failure, suitable for rendering next to the
/// offending input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: MeasurementField,
    pub message: String,
}

/// One submission's measurements. Created per form submission, never
/// persisted, discarded after use.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeasurementInput {
    pub weight_kg: f64,
    pub height_cm: f64,
}

impl MeasurementInput {
    /// Validate already-numeric measurements. Both must be finite and
    /// strictly greater than zero.
    pub fn new(weight_kg: f64, height_cm: f64) -> Result<Self> {
        let mut errors = Vec::new();
        check_number(MeasurementField::Weight, weight_kg, &mut errors);
        check_number(MeasurementField::Height, height_cm, &mut errors);
        if errors.is_empty() {
            Ok(Self {
                weight_kg,
                height_cm,
            })
        } else {
            Err(CoachError::Validation { errors })
        }
    }

    /// Coerce raw form strings to measurements. Failures are reported per
    /// field, weight first, so a caller can surface both messages at once.
    pub fn parse(raw_weight: &str, raw_height: &str) -> Result<Self> {
        let mut errors = Vec::new();
        let weight = check_raw(MeasurementField::Weight, raw_weight, &mut errors);
        let height = check_raw(MeasurementField::Height, raw_height, &mut errors);
        match (weight, height) {
            (Some(weight_kg), Some(height_cm)) => Ok(Self {
                weight_kg,
                height_cm,
            }),
            _ => Err(CoachError::Validation { errors }),
        }
    }
}

fn check_number(field: MeasurementField, value: f64, errors: &mut Vec<FieldError>) {
    if !value.is_finite() {
        errors.push(FieldError {
            field,
            message: INVALID_NUMBER_MESSAGE.to_string(),
        });
    } else if value <= 0.0 {
        errors.push(FieldError {
            field,
            message: field.positive_message(),
        });
    }
}

fn check_raw(field: MeasurementField, raw: &str, errors: &mut Vec<FieldError>) -> Option<f64> {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => {
            if value > 0.0 {
                Some(value)
            } else {
                errors.push(FieldError {
                    field,
                    message: field.positive_message(),
                });
                None
            }
        }
        _ => {
            errors.push(FieldError {
                field,
                message: INVALID_NUMBER_MESSAGE.to_string(),
            });
            None
        }
    }
}
