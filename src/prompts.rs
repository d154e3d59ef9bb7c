//! Prompt templates for the recommendation provider.

/// Instruction template addressed to the trainer/nutritionist persona. The
/// wording is fixed; only the BMI value varies between submissions.
const RECOMMENDATION_TEMPLATE: &str = "You are a personal trainer and nutritionist. Based on the user's BMI, provide personalized exercise and diet recommendations. The recommendations should be tailored to improve their health and fitness.";

/// Build the full prompt for one BMI value. The raw number is interpolated
/// with its shortest round-trip representation, not the one-decimal display
/// string.
pub fn recommendation_prompt(bmi: f64) -> String {
    format!("{RECOMMENDATION_TEMPLATE}\n\nBMI: {bmi}\n")
}
