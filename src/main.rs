/// Подготовка датасета и базовая линейная модель

use std::path::Path;

use anyhow::{Context, Result};
use linfa::prelude::*;
use linfa_linear::LinearRegression;
use ndarray::Array1;
use tracing_subscriber::EnvFilter;

use tabular_prep::{pipeline, PipelineConfig, PreparedData};

const BASELINE_FEATURE: &str = "Horsepower";

fn main() -> Result<()> {
    // Инициализация логирования
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => PipelineConfig::from_json_file(Path::new(&path))
            .with_context(|| format!("reading config {path}"))?,
        None => PipelineConfig::default(),
    };

    let data = pipeline::run(&config).context("preparing dataset")?;

    println!(
        "{:<14} {:>6} {:>10} {:>10} {:>10} {:>10}",
        "column", "count", "mean", "std", "min", "max"
    );
    for s in data.train_features.describe() {
        println!(
            "{:<14} {:>6} {:>10.3} {:>10.3} {:>10.3} {:>10.3}",
            s.name, s.count, s.mean, s.std, s.min, s.max
        );
    }

    println!();
    println!("{:<14} {:>10} {:>10}", "feature", "mean", "std");
    for f in data.stats.features() {
        println!("{:<14} {:>10.3} {:>10.3}", f.name, f.mean, f.std);
    }

    if data.train_features.column(BASELINE_FEATURE).is_some() {
        let mae = fit_baseline(&data, BASELINE_FEATURE)?;
        println!();
        println!("Linear baseline on '{}': test MAE {:.3}", BASELINE_FEATURE, mae);
    } else {
        tracing::info!("No '{}' column, skipping baseline", BASELINE_FEATURE);
    }

    Ok(())
}

/// Одномерная линейная регрессия на нормализованном признаке
fn fit_baseline(data: &PreparedData, feature: &str) -> Result<f64> {
    let train = data.normalized_train()?.select(&[feature])?.to_array()?;
    let test = data.normalized_test()?.select(&[feature])?.to_array()?;

    let dataset = Dataset::new(train, data.train_labels.clone());
    let model = LinearRegression::new()
        .fit(&dataset)
        .context("fitting linear baseline")?;

    let predictions: Array1<f64> = model.predict(&test);
    let mae = (&predictions - &data.test_labels)
        .mapv(f64::abs)
        .mean()
        .unwrap_or(0.0);
    tracing::info!("Baseline trained. MAE: {:.2}", mae);
    Ok(mae)
}
