use std::collections::HashSet;
use std::env::consts::EXE_SUFFIX;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum, ValueHint};
use knapsack::CorpusLayout;
use serde::Deserialize;
use shared::{AppError, AppResult};

use crate::scenario::{builtin_scenarios, SweepScenario};

const DEFAULT_TESTS_DIR: &str = "tests";
const DEFAULT_RESULTS_DIR: &str = "results";
const DEFAULT_BUILD_DIR: &str = "build";
const DEFAULT_PLOTS_DIR: &str = "plots";
const DEFAULT_TEST_PREFIX: &str = "test";
const DEFAULT_RESULT_PREFIX: &str = "file";
const DEFAULT_BATCH_SIZE: usize = 5;
const DEFAULT_TIMEOUT_SECS: u64 = 300;

#[derive(Debug, Parser)]
#[command(name = "knapsack-bench", about = "Benchmark harness for external 0/1-knapsack solvers")]
pub struct CliArgs {
    /// Optional path to a JSON configuration file.
    #[arg(long, value_name = "PATH", value_hint = ValueHint::FilePath, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding generated instance files.
    #[arg(long, value_name = "DIR", value_hint = ValueHint::DirPath, global = true)]
    pub tests_dir: Option<PathBuf>,

    /// Directory receiving solver output.
    #[arg(long, value_name = "DIR", value_hint = ValueHint::DirPath, global = true)]
    pub results_dir: Option<PathBuf>,

    /// Directory holding the solver executables.
    #[arg(long, value_name = "DIR", value_hint = ValueHint::DirPath, global = true)]
    pub build_dir: Option<PathBuf>,

    /// Directory receiving rendered plots.
    #[arg(long, value_name = "DIR", value_hint = ValueHint::DirPath, global = true)]
    pub plots_dir: Option<PathBuf>,

    /// Seed for corpus generation; a random seed is drawn and logged when absent.
    #[arg(long, value_name = "SEED", global = true)]
    pub seed: Option<u64>,

    /// Per-invocation solver timeout in seconds (0 waits forever).
    #[arg(long, value_name = "SECS", global = true)]
    pub timeout_secs: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate the randomized stress corpus without running any solver.
    Generate {
        /// Instances per difficulty regime.
        #[arg(long, value_name = "COUNT")]
        batch_size: Option<usize>,
    },
    /// Generate the stress corpus and time every solver on each instance.
    Stress {
        /// Instances per difficulty regime.
        #[arg(long, value_name = "COUNT")]
        batch_size: Option<usize>,

        /// How solver output is retained on disk.
        #[arg(long, value_enum)]
        output: Option<OutputRetention>,

        #[command(flatten)]
        format: ReportFormat,
    },
    /// Run the linear-sweep scenarios and plot one scaling curve per solver.
    Sweep {
        /// Only run scenarios with this title (repeatable).
        #[arg(long, value_name = "TITLE")]
        scenario: Vec<String>,

        #[command(flatten)]
        format: ReportFormat,
    },
}

#[derive(Debug, Clone, Copy, Default, clap::Args)]
pub struct ReportFormat {
    /// Print the summary as Markdown instead of the textual table.
    #[arg(long, conflicts_with = "json")]
    pub markdown: bool,

    /// Print the summary as JSON instead of the textual table.
    #[arg(long)]
    pub json: bool,
}

/// Where solver standard output goes during a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OutputRetention {
    /// One result file overwritten by every invocation.
    #[default]
    Shared,
    /// One result file per solver and instance.
    PerInvocation,
    /// Output is thrown away.
    Discard,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HarnessConfig {
    #[serde(default)]
    pub paths: PathSettings,
    #[serde(default = "default_solvers")]
    pub solvers: Vec<SolverSpec>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default)]
    pub output: OutputRetention,
    #[serde(default = "builtin_scenarios")]
    pub scenarios: Vec<SweepScenario>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            paths: PathSettings::default(),
            solvers: default_solvers(),
            timeout_secs: default_timeout_secs(),
            seed: None,
            batch_size: DEFAULT_BATCH_SIZE,
            output: OutputRetention::default(),
            scenarios: builtin_scenarios(),
        }
    }
}

impl HarnessConfig {
    pub fn from_cli(args: &CliArgs) -> AppResult<Self> {
        let mut config = if let Some(path) = args.config.as_ref() {
            Self::from_file(path)?
        } else {
            Self::default()
        };

        if let Some(dir) = args.tests_dir.clone() {
            config.paths.tests_dir = dir;
        }
        if let Some(dir) = args.results_dir.clone() {
            config.paths.results_dir = dir;
        }
        if let Some(dir) = args.build_dir.clone() {
            config.paths.build_dir = dir;
        }
        if let Some(dir) = args.plots_dir.clone() {
            config.paths.plots_dir = dir;
        }
        if let Some(seed) = args.seed {
            config.seed = Some(seed);
        }
        if let Some(timeout) = args.timeout_secs {
            config.timeout_secs = Some(timeout);
        }

        match &args.command {
            Command::Generate { batch_size } => {
                if let Some(batch_size) = batch_size {
                    config.batch_size = *batch_size;
                }
            }
            Command::Stress {
                batch_size, output, ..
            } => {
                if let Some(batch_size) = batch_size {
                    config.batch_size = *batch_size;
                }
                if let Some(output) = output {
                    config.output = *output;
                }
            }
            Command::Sweep { .. } => {}
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> AppResult<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|err| AppError::io(format!("failed to read config {path:?}"), err))?;
        serde_json::from_str(&contents)
            .map_err(|err| AppError::Config(format!("invalid harness config JSON: {err}")))
    }

    pub fn validate(&mut self) -> AppResult<()> {
        self.normalise();

        if self.batch_size == 0 {
            return Err(AppError::Config("batch size must be greater than zero".into()));
        }
        if self.solvers.is_empty() {
            return Err(AppError::Config("solver roster is empty".into()));
        }

        let mut names = HashSet::new();
        for solver in &self.solvers {
            if solver.name.trim().is_empty() {
                return Err(AppError::Config("solver names must not be empty".into()));
            }
            if !names.insert(solver.name.as_str()) {
                return Err(AppError::Config(format!(
                    "solver '{}' appears more than once in the roster",
                    solver.name
                )));
            }
        }

        for scenario in &self.scenarios {
            scenario.validate()?;
        }
        Ok(())
    }

    fn normalise(&mut self) {
        if self.timeout_secs == Some(0) {
            self.timeout_secs = None;
        }
        if self.scenarios.is_empty() {
            self.scenarios = builtin_scenarios();
        }
        for solver in &mut self.solvers {
            if solver.label.trim().is_empty() {
                solver.label = solver.name.clone();
            }
        }
        self.paths.normalise();
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    pub fn corpus_layout(&self) -> CorpusLayout {
        CorpusLayout::new(&self.paths.tests_dir, &self.paths.test_prefix)
    }

    /// Result file for one invocation, or `None` when output is discarded.
    pub fn result_path(
        &self,
        retention: OutputRetention,
        solver: &SolverSpec,
        instance_index: usize,
    ) -> Option<PathBuf> {
        let prefix = &self.paths.result_prefix;
        match retention {
            OutputRetention::Shared => Some(self.paths.results_dir.join(format!("{prefix}.out"))),
            OutputRetention::PerInvocation => Some(
                self.paths
                    .results_dir
                    .join(format!("{prefix}_{}_{instance_index}.out", solver.name)),
            ),
            OutputRetention::Discard => None,
        }
    }

    pub fn plot_path(&self, scenario: &SweepScenario) -> PathBuf {
        self.paths.plots_dir.join(scenario.file_name())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PathSettings {
    #[serde(default = "default_tests_dir")]
    pub tests_dir: PathBuf,
    #[serde(default = "default_results_dir")]
    pub results_dir: PathBuf,
    #[serde(default = "default_build_dir")]
    pub build_dir: PathBuf,
    #[serde(default = "default_plots_dir")]
    pub plots_dir: PathBuf,
    #[serde(default = "default_test_prefix")]
    pub test_prefix: String,
    #[serde(default = "default_result_prefix")]
    pub result_prefix: String,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            tests_dir: default_tests_dir(),
            results_dir: default_results_dir(),
            build_dir: default_build_dir(),
            plots_dir: default_plots_dir(),
            test_prefix: default_test_prefix(),
            result_prefix: default_result_prefix(),
        }
    }
}

impl PathSettings {
    fn normalise(&mut self) {
        if self.test_prefix.trim().is_empty() {
            self.test_prefix = default_test_prefix();
        }
        if self.result_prefix.trim().is_empty() {
            self.result_prefix = default_result_prefix();
        }
    }
}

/// One external solver in the benchmark roster.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SolverSpec {
    pub name: String,
    /// Legend label; falls back to `name`.
    #[serde(default)]
    pub label: String,
    /// Executable relative to the build directory, or absolute.
    #[serde(default)]
    pub executable: Option<PathBuf>,
    /// Arguments placed before the instance path.
    #[serde(default)]
    pub args: Vec<String>,
}

impl SolverSpec {
    pub fn new(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            executable: None,
            args: Vec::new(),
        }
    }

    pub fn with_executable(mut self, executable: impl Into<PathBuf>) -> Self {
        self.executable = Some(executable.into());
        self
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn program(&self, build_dir: &Path) -> PathBuf {
        match self.executable.as_ref() {
            Some(executable) => build_dir.join(executable),
            None => build_dir.join(format!("{}{EXE_SUFFIX}", self.name)),
        }
    }
}

fn default_solvers() -> Vec<SolverSpec> {
    vec![
        SolverSpec::new("bruteforce", "Brute"),
        SolverSpec::new("dynamicforweights", "Weights dynamic"),
        SolverSpec::new("dynamicforprofits", "Values dynamic"),
        SolverSpec::new("fptas", "FPTAS"),
    ]
}

fn default_timeout_secs() -> Option<u64> {
    Some(DEFAULT_TIMEOUT_SECS)
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

fn default_tests_dir() -> PathBuf {
    PathBuf::from(DEFAULT_TESTS_DIR)
}

fn default_results_dir() -> PathBuf {
    PathBuf::from(DEFAULT_RESULTS_DIR)
}

fn default_build_dir() -> PathBuf {
    PathBuf::from(DEFAULT_BUILD_DIR)
}

fn default_plots_dir() -> PathBuf {
    PathBuf::from(DEFAULT_PLOTS_DIR)
}

fn default_test_prefix() -> String {
    DEFAULT_TEST_PREFIX.to_string()
}

fn default_result_prefix() -> String {
    DEFAULT_RESULT_PREFIX.to_string()
}
