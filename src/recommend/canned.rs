use async_trait::async_trait;

use crate::bmi::BmiCategory;
use crate::error::Result;
use crate::recommend::Recommender;

/// Deterministic, network-free recommender for local development and tests.
/// Output depends only on the BMI's category band.
pub struct CannedRecommender;

impl Default for CannedRecommender {
    fn default() -> Self {
        Self::new()
    }
}

impl CannedRecommender {
    pub fn new() -> Self {
        Self
    }

    fn advice(category: BmiCategory) -> &'static str {
        match category {
            BmiCategory::Underweight => {
                "Your BMI is below the healthy range.\n\
                 Exercise: focus on strength training 3 times a week to build lean mass.\n\
                 Diet: add calorie-dense whole foods such as nuts, dairy, and whole grains, and eat regular meals with a protein source in each."
            }
            BmiCategory::Normal => {
                "Your BMI is in the healthy range.\n\
                 Exercise: keep a mix of moderate cardio (150 minutes a week) and two strength sessions.\n\
                 Diet: maintain balanced meals built around vegetables, lean protein, and whole grains."
            }
            BmiCategory::Overweight => {
                "Your BMI is above the healthy range.\n\
                 Exercise: aim for 30-45 minutes of brisk cardio most days, plus two light strength sessions.\n\
                 Diet: reduce sugary drinks and refined snacks, and fill half of each plate with vegetables."
            }
            BmiCategory::Obese => {
                "Your BMI is well above the healthy range.\n\
                 Exercise: start with low-impact activity such as walking or swimming and build up gradually.\n\
                 Diet: work toward a modest calorie deficit with smaller portions and more fiber; consider discussing a plan with a professional."
            }
        }
    }
}

#[async_trait]
impl Recommender for CannedRecommender {
    async fn recommend(&self, bmi: f64) -> Result<String> {
        Ok(Self::advice(BmiCategory::classify(bmi)).to_string())
    }

    fn name(&self) -> &'static str {
        "canned"
    }
}
