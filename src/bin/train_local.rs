//! Обучение модели оттока без трекинга. Все параметры зашиты в TrainConfig::local().

use attrition_ml::config::TrainConfig;
use attrition_ml::{logging, pipeline};

fn main() -> anyhow::Result<()> {
    logging::init();

    let config = TrainConfig::local();
    let outcome = pipeline::run_local(&config)?;

    println!("✅ Accuracy: {}", outcome.report.accuracy);
    Ok(())
}
