use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use bmi_coach::advisor::BmiAdvisor;
use bmi_coach::config::Config;
use bmi_coach::{http, load_env, recommend};

#[tokio::main]
async fn main() -> Result<()> {
    load_env();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("bmi_coach=info")),
        )
        .init();

    info!("Starting bmi-coach advisory server");

    let config = Config::load()?;
    let recommender = recommend::create_recommender(&config)?;
    let advisor = Arc::new(BmiAdvisor::new(recommender));

    http::serve(Arc::new(config), advisor).await
}
