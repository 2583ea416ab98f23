use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::driver::{BenchmarkRun, TimingSeries};
use crate::invoker::InvocationOutcome;

#[derive(Debug, Clone, Serialize)]
pub struct SolverSummary {
    pub solver: String,
    pub label: String,
    pub samples: usize,
    pub total_ms: f64,
    pub mean_ms: f64,
    pub max_ms: f64,
    pub non_zero_exits: usize,
    pub launch_failures: usize,
    pub timeouts: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub scenario: String,
    pub generated_at: String,
    pub instances: usize,
    pub solvers: Vec<SolverSummary>,
    pub run: BenchmarkRun,
}

impl RunSummary {
    pub fn clean(&self) -> bool {
        self.solvers
            .iter()
            .all(|solver| solver.non_zero_exits + solver.launch_failures + solver.timeouts == 0)
    }

    pub fn render_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("# {}\n\n", self.scenario));
        out.push_str(&format!("- Generated: {}\n", self.generated_at));
        out.push_str(&format!("- Instances: {}\n", self.instances));
        out.push_str(&format!(
            "- All invocations succeeded: {}\n\n",
            if self.clean() { "yes" } else { "no" }
        ));

        out.push_str("| Solver | Samples | Total (ms) | Mean (ms) | Max (ms) | Non-zero | Launch failed | Timed out |\n");
        out.push_str("|---|---|---|---|---|---|---|---|\n");
        for solver in &self.solvers {
            out.push_str(&format!(
                "| {} | {} | {:.2} | {:.2} | {:.2} | {} | {} | {} |\n",
                solver.label,
                solver.samples,
                solver.total_ms,
                solver.mean_ms,
                solver.max_ms,
                solver.non_zero_exits,
                solver.launch_failures,
                solver.timeouts
            ));
        }
        out
    }

    pub fn render_table(&self) -> String {
        let mut out = format!(
            "{} | instances: {} | generated: {}\n",
            self.scenario, self.instances, self.generated_at
        );
        out.push_str(&format!(
            "{:<18} {:>8} {:>12} {:>11} {:>11} {:>9} {:>8} {:>9}\n",
            "Solver", "Samples", "Total(ms)", "Mean(ms)", "Max(ms)", "NonZero", "Launch", "TimedOut"
        ));
        out.push_str(&"-".repeat(93));
        out.push('\n');
        for solver in &self.solvers {
            out.push_str(&format!(
                "{:<18} {:>8} {:>12.2} {:>11.2} {:>11.2} {:>9} {:>8} {:>9}\n",
                truncate(&solver.label, 18),
                solver.samples,
                solver.total_ms,
                solver.mean_ms,
                solver.max_ms,
                solver.non_zero_exits,
                solver.launch_failures,
                solver.timeouts
            ));
        }
        out
    }
}

pub fn build_summary(scenario: impl Into<String>, run: BenchmarkRun) -> RunSummary {
    let solvers = run.series.iter().map(summarise_series).collect();
    RunSummary {
        scenario: scenario.into(),
        generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        instances: run.corpus_len,
        solvers,
        run,
    }
}

fn summarise_series(series: &TimingSeries) -> SolverSummary {
    let timings = series.milliseconds();
    let total_ms: f64 = timings.iter().sum();
    let max_ms = timings.iter().copied().fold(0.0, f64::max);
    let mean_ms = if timings.is_empty() {
        0.0
    } else {
        total_ms / timings.len() as f64
    };

    let mut summary = SolverSummary {
        solver: series.solver.clone(),
        label: series.label.clone(),
        samples: timings.len(),
        total_ms,
        mean_ms,
        max_ms,
        non_zero_exits: 0,
        launch_failures: 0,
        timeouts: 0,
    };
    for sample in &series.samples {
        match sample.outcome {
            InvocationOutcome::Success => {}
            InvocationOutcome::NonZeroExit { .. } => summary.non_zero_exits += 1,
            InvocationOutcome::TimedOut => summary.timeouts += 1,
            InvocationOutcome::LaunchFailed { .. } => summary.launch_failures += 1,
        }
    }
    summary
}

fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        value.to_string()
    } else if width <= 3 {
        "…".repeat(width)
    } else {
        let mut truncated = value.chars().take(width - 1).collect::<String>();
        truncated.push('…');
        truncated
    }
}
