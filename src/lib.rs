//! BMI advisory pipeline: validate user measurements, compute and classify
//! BMI, and fetch free-text exercise/diet recommendations from a hosted
//! generative-text provider.

pub mod advisor;
pub mod bmi;
pub mod config;
pub mod error;
pub mod http;
pub mod measurement;
pub mod prompts;
pub mod recommend;
pub mod session;

// Load env from a simple, standardized location resolution.
// This uses dotenvy::dotenv() which loads .env if present and silently
// ignores if missing.
pub fn load_env() {
    let _ = dotenvy::dotenv();
}
