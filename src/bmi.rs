//! BMI computation and category classification.

use serde::{Deserialize, Serialize};

use crate::error::{CoachError, Result};
use crate::measurement::MeasurementInput;

/// BMI = weight (kg) / height (m)^2, with height supplied in centimeters.
pub fn bmi(weight_kg: f64, height_cm: f64) -> f64 {
    let height_m = height_cm / 100.0;
    weight_kg / (height_m * height_m)
}

/// The four ordered health-classification bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

/// Badge color associated with a category. Always derived from the category,
/// never set independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorTag {
    Blue,
    Green,
    Yellow,
    Red,
}

impl BmiCategory {
    /// Classify a BMI value into its band.
    ///
    /// The band cutoffs are checked in order with inclusive upper bounds, so
    /// values in the unlabelled gaps (24.9..25.0 and 29.9..30.0) fall through
    /// to Obese. That cascade is the observable contract and is kept as is.
    pub fn classify(bmi: f64) -> Self {
        if bmi < 18.5 {
            BmiCategory::Underweight
        } else if bmi <= 24.9 {
            BmiCategory::Normal
        } else if (25.0..=29.9).contains(&bmi) {
            BmiCategory::Overweight
        } else {
            BmiCategory::Obese
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BmiCategory::Underweight => "Underweight",
            BmiCategory::Normal => "Normal",
            BmiCategory::Overweight => "Overweight",
            BmiCategory::Obese => "Obese",
        }
    }

    pub fn color_tag(&self) -> ColorTag {
        match self {
            BmiCategory::Underweight => ColorTag::Blue,
            BmiCategory::Normal => ColorTag::Green,
            BmiCategory::Overweight => ColorTag::Yellow,
            BmiCategory::Obese => ColorTag::Red,
        }
    }
}

impl ColorTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColorTag::Blue => "blue",
            ColorTag::Green => "green",
            ColorTag::Yellow => "yellow",
            ColorTag::Red => "red",
        }
    }
}

/// A classified calculation result as displayed to the user: the BMI rounded
/// to one decimal place, its category, and the category's color tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BmiResult {
    pub value: String,
    pub category: BmiCategory,
    pub color: ColorTag,
}

impl BmiResult {
    /// Build a result from a raw BMI value.
    ///
    /// The non-finite guard is unreachable for validated inputs but is part
    /// of the observable contract: a NaN/infinite value surfaces a generic
    /// calculation error instead of a classified result.
    pub fn from_value(value: f64) -> Result<Self> {
        if value.is_nan() || !value.is_finite() {
            return Err(CoachError::Calculation {
                message: "Please check your inputs and try again.".to_string(),
            });
        }
        let category = BmiCategory::classify(value);
        Ok(Self {
            value: format!("{value:.1}"),
            category,
            color: category.color_tag(),
        })
    }

    /// Compute and classify in one step from validated measurements.
    pub fn compute(input: &MeasurementInput) -> Result<Self> {
        Self::from_value(bmi(input.weight_kg, input.height_cm))
    }
}
