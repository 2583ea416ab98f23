pub mod config;
pub mod curve;
pub mod driver;
pub mod invoker;
pub mod render;
pub mod report;
pub mod scenario;

use knapsack::{generate, generate_sweep, Corpus, InstanceRng};
use shared::{AppError, AppResult};
use tracing::info;

use config::{HarnessConfig, OutputRetention};
use driver::BenchmarkDriver;
use render::Figure;
use report::{build_summary, RunSummary};
use scenario::TIME_AXIS_LABEL;

/// Title used for summaries of the randomized stress corpus.
pub const STRESS_SCENARIO: &str = "Stress corpus";

/// Write the four-regime stress corpus described by `config`.
pub fn generate_stress_corpus(config: &HarnessConfig) -> AppResult<Corpus> {
    let mut rng = config
        .seed
        .map(InstanceRng::new)
        .unwrap_or_else(InstanceRng::from_entropy);
    info!(seed = rng.seed(), batch_size = config.batch_size, "generating stress corpus");
    generate(&config.corpus_layout(), config.batch_size, &mut rng)
}

/// Generate the stress corpus, then time every solver on it.
pub async fn run_stress(config: &HarnessConfig) -> AppResult<RunSummary> {
    let corpus = generate_stress_corpus(config)?;
    let run = BenchmarkDriver::new(config).run(&corpus, config.output).await?;
    Ok(build_summary(STRESS_SCENARIO, run))
}

/// Run every sweep scenario matching `filter` (all when empty), saving one
/// plot per scenario.
pub async fn run_sweeps(config: &HarnessConfig, filter: &[String]) -> AppResult<Vec<RunSummary>> {
    let selected: Vec<_> = config
        .scenarios
        .iter()
        .filter(|scenario| scenario.matches(filter))
        .collect();
    if selected.is_empty() {
        return Err(AppError::Config(format!(
            "no sweep scenario matches {filter:?}"
        )));
    }

    let driver = BenchmarkDriver::new(config);
    let mut summaries = Vec::with_capacity(selected.len());
    for scenario in selected {
        info!(scenario = %scenario.title, instances = scenario.plan.count, "starting sweep");
        let corpus = generate_sweep(&config.corpus_layout(), &scenario.plan)?;
        let run = driver.run(&corpus, OutputRetention::Discard).await?;

        let x = scenario.x_values();
        let mut figure = Figure::new(&scenario.title, &scenario.x_label, TIME_AXIS_LABEL);
        for series in &run.series {
            figure.plot(&x, &series.milliseconds(), &series.label)?;
        }
        figure.save(&config.plot_path(scenario))?;

        summaries.push(build_summary(&scenario.title, run));
    }
    Ok(summaries)
}
