use std::fs;

use knapsack::Corpus;
use serde::Serialize;
use shared::{AppError, AppResult};
use tracing::{info, warn};

use crate::config::{HarnessConfig, OutputRetention, SolverSpec};
use crate::invoker::{InvocationOutcome, OutputSink, SolverInvoker};

#[derive(Debug, Clone, Serialize)]
pub struct TimingSample {
    pub solver: String,
    pub instance_index: usize,
    pub elapsed_seconds: f64,
    pub outcome: InvocationOutcome,
}

impl TimingSample {
    pub fn elapsed_milliseconds(&self) -> f64 {
        self.elapsed_seconds * 1000.0
    }
}

/// Samples of one solver, index-aligned with the corpus.
#[derive(Debug, Clone, Serialize)]
pub struct TimingSeries {
    pub solver: String,
    pub label: String,
    pub samples: Vec<TimingSample>,
}

impl TimingSeries {
    fn new(solver: &SolverSpec) -> Self {
        Self {
            solver: solver.name.clone(),
            label: solver.label.clone(),
            samples: Vec::new(),
        }
    }

    pub fn seconds(&self) -> Vec<f64> {
        self.samples.iter().map(|sample| sample.elapsed_seconds).collect()
    }

    pub fn milliseconds(&self) -> Vec<f64> {
        self.samples
            .iter()
            .map(TimingSample::elapsed_milliseconds)
            .collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BenchmarkRun {
    pub corpus_len: usize,
    /// One series per solver, in roster order.
    pub series: Vec<TimingSeries>,
}

impl BenchmarkRun {
    pub fn series(&self, solver: &str) -> Option<&TimingSeries> {
        self.series.iter().find(|series| series.solver == solver)
    }
}

pub struct BenchmarkDriver<'a> {
    config: &'a HarnessConfig,
    invoker: SolverInvoker,
}

impl<'a> BenchmarkDriver<'a> {
    pub fn new(config: &'a HarnessConfig) -> Self {
        Self {
            config,
            invoker: SolverInvoker::new(config.timeout()),
        }
    }

    /// Time every roster solver on every corpus instance, strictly in order:
    /// all solvers finish instance `i` before instance `i + 1` starts.
    pub async fn run(&self, corpus: &Corpus, retention: OutputRetention) -> AppResult<BenchmarkRun> {
        let roster = &self.config.solvers;
        if retention != OutputRetention::Discard {
            fs::create_dir_all(&self.config.paths.results_dir).map_err(|err| {
                AppError::io(
                    format!(
                        "failed to create results directory {:?}",
                        self.config.paths.results_dir
                    ),
                    err,
                )
            })?;
        }

        let mut series: Vec<TimingSeries> = roster.iter().map(TimingSeries::new).collect();

        for (index, instance) in corpus.paths() {
            if !instance.is_file() {
                return Err(AppError::MissingInstance(instance));
            }
            info!(instance = index, of = corpus.len(), "running solvers");

            for (solver, timings) in roster.iter().zip(series.iter_mut()) {
                let sink = match self.config.result_path(retention, solver, index) {
                    Some(path) => OutputSink::File(path),
                    None => OutputSink::Discard,
                };
                let program = solver.program(&self.config.paths.build_dir);
                let invocation = self
                    .invoker
                    .invoke(&program, &solver.args, &instance, &sink)
                    .await?;

                let sample = TimingSample {
                    solver: solver.name.clone(),
                    instance_index: index,
                    elapsed_seconds: invocation.elapsed.as_secs_f64(),
                    outcome: invocation.outcome,
                };
                log_sample(solver, &sample);
                timings.samples.push(sample);
            }
        }

        Ok(BenchmarkRun {
            corpus_len: corpus.len(),
            series,
        })
    }
}

fn log_sample(solver: &SolverSpec, sample: &TimingSample) {
    let elapsed_ms = format!("{:.3}", sample.elapsed_milliseconds());
    match &sample.outcome {
        InvocationOutcome::Success => info!(
            solver = %solver.label,
            instance = sample.instance_index,
            elapsed_ms,
            "solver finished"
        ),
        InvocationOutcome::NonZeroExit { code } => warn!(
            solver = %solver.label,
            instance = sample.instance_index,
            elapsed_ms,
            code = ?code,
            "solver exited with failure status"
        ),
        InvocationOutcome::TimedOut => warn!(
            solver = %solver.label,
            instance = sample.instance_index,
            elapsed_ms,
            "solver timed out and was killed"
        ),
        InvocationOutcome::LaunchFailed { reason } => warn!(
            solver = %solver.label,
            instance = sample.instance_index,
            reason = %reason,
            "solver could not be run"
        ),
    }
}
