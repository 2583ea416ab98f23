#![cfg(unix)]

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use knapsack::{Corpus, CorpusLayout, Instance, Item, SweepAxis, SweepPlan};
use knapsack_bench::config::{HarnessConfig, OutputRetention, PathSettings, SolverSpec};
use knapsack_bench::driver::BenchmarkDriver;
use knapsack_bench::invoker::{InvocationOutcome, OutputSink, SolverInvoker};
use knapsack_bench::scenario::{SweepScenario, SweepVariable};
use shared::AppError;

fn sh_solver(name: &str, script: &str) -> SolverSpec {
    SolverSpec::new(name, name.to_uppercase())
        .with_executable("/bin/sh")
        .with_args(["-c", script])
}

fn config_in(root: &Path, solvers: Vec<SolverSpec>) -> HarnessConfig {
    let mut config = HarnessConfig {
        paths: PathSettings {
            tests_dir: root.join("tests"),
            results_dir: root.join("results"),
            build_dir: root.join("build"),
            plots_dir: root.join("plots"),
            ..PathSettings::default()
        },
        solvers,
        timeout_secs: Some(30),
        seed: Some(1234),
        batch_size: 1,
        ..HarnessConfig::default()
    };
    config.validate().expect("valid test config");
    config
}

fn tiny_corpus(config: &HarnessConfig, len: usize) -> Corpus {
    let layout = config.corpus_layout();
    fs::create_dir_all(&layout.dir).unwrap();
    for index in 1..=len {
        Instance::new(10, vec![Item::new(3, 4); index])
            .unwrap()
            .write_to(&layout.instance_path(index))
            .unwrap();
    }
    Corpus::new(layout, len)
}

fn log_script(name: &str, log: &Path) -> String {
    format!("echo \"{name} $0\" >> '{}'", log.display())
}

#[tokio::test]
async fn every_solver_runs_once_per_instance_in_roster_order() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("calls.log");
    let names = ["bruteforce", "dynamicforweights", "dynamicforprofits", "fptas"];
    let solvers = names.iter().map(|name| sh_solver(name, &log_script(name, &log))).collect();
    let config = config_in(dir.path(), solvers);

    let corpus = knapsack_bench::generate_stress_corpus(&config).unwrap();
    assert_eq!(corpus.len(), 4);
    let run = BenchmarkDriver::new(&config)
        .run(&corpus, OutputRetention::Discard)
        .await
        .unwrap();

    let calls = fs::read_to_string(&log).unwrap();
    let expected: Vec<String> = corpus
        .paths()
        .flat_map(|(_, path)| {
            names
                .iter()
                .map(move |name| format!("{name} {}", path.display()))
        })
        .collect();
    assert_eq!(calls.lines().collect::<Vec<_>>(), expected);

    assert_eq!(run.corpus_len, 4);
    assert_eq!(run.series.len(), names.len());
    for (series, name) in run.series.iter().zip(names) {
        assert_eq!(series.solver, name);
        let indices: Vec<_> = series.samples.iter().map(|s| s.instance_index).collect();
        assert_eq!(indices, vec![1, 2, 3, 4]);
        assert!(series.samples.iter().all(|s| s.elapsed_seconds >= 0.0));
        let seconds = series.seconds();
        let millis = series.milliseconds();
        assert_eq!(seconds.len(), 4);
        for ((sample, secs), ms) in series.samples.iter().zip(&seconds).zip(&millis) {
            assert_eq!(*secs, sample.elapsed_seconds);
            assert!((ms - secs * 1000.0).abs() < 1e-9);
        }
        assert!(series.samples.iter().all(|s| s.outcome.is_success()));
    }
    assert_eq!(run.series("fptas").unwrap().label, "FPTAS");
}

#[tokio::test]
async fn failing_and_missing_solvers_do_not_stop_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(
        dir.path(),
        vec![
            sh_solver("crashes", "exit 3"),
            SolverSpec::new("absent", "Absent").with_executable("/nonexistent/solver"),
            sh_solver("works", "cat \"$0\""),
        ],
    );
    let corpus = tiny_corpus(&config, 2);

    let run = BenchmarkDriver::new(&config)
        .run(&corpus, OutputRetention::Discard)
        .await
        .unwrap();

    let crashes = run.series("crashes").unwrap();
    assert!(crashes
        .samples
        .iter()
        .all(|s| s.outcome == InvocationOutcome::NonZeroExit { code: Some(3) }));
    let absent = run.series("absent").unwrap();
    assert_eq!(absent.samples.len(), 2);
    assert!(absent
        .samples
        .iter()
        .all(|s| matches!(s.outcome, InvocationOutcome::LaunchFailed { .. })));
    let works = run.series("works").unwrap();
    assert!(works.samples.iter().all(|s| s.outcome.is_success()));
}

#[tokio::test]
async fn gap_in_corpus_aborts_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path(), vec![sh_solver("noop", "exit 0")]);
    let corpus = tiny_corpus(&config, 3);
    fs::remove_file(corpus.instance_path(2)).unwrap();

    let err = BenchmarkDriver::new(&config)
        .run(&corpus, OutputRetention::Discard)
        .await
        .unwrap_err();

    match err {
        AppError::MissingInstance(path) => assert_eq!(path, corpus.instance_path(2)),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn shared_result_file_keeps_only_the_last_output() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(
        dir.path(),
        vec![sh_solver("first", "cat \"$0\""), sh_solver("second", "echo last")],
    );
    let corpus = tiny_corpus(&config, 2);

    BenchmarkDriver::new(&config)
        .run(&corpus, OutputRetention::Shared)
        .await
        .unwrap();

    let results: Vec<PathBuf> = fs::read_dir(&config.paths.results_dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect();
    assert_eq!(results, vec![config.paths.results_dir.join("file.out")]);
    assert_eq!(fs::read_to_string(&results[0]).unwrap(), "last\n");
}

#[tokio::test]
async fn per_invocation_retention_keys_output_by_solver_and_instance() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(
        dir.path(),
        vec![sh_solver("first", "cat \"$0\""), sh_solver("second", "echo done")],
    );
    let corpus = tiny_corpus(&config, 2);

    BenchmarkDriver::new(&config)
        .run(&corpus, OutputRetention::PerInvocation)
        .await
        .unwrap();

    let results = &config.paths.results_dir;
    assert_eq!(
        fs::read_to_string(results.join("file_first_2.out")).unwrap(),
        fs::read_to_string(corpus.instance_path(2)).unwrap()
    );
    assert_eq!(fs::read_to_string(results.join("file_second_1.out")).unwrap(), "done\n");
    assert_eq!(fs::read_dir(results).unwrap().count(), 4);
}

#[tokio::test]
async fn hung_solver_is_killed_at_the_timeout() {
    let dir = tempfile::tempdir().unwrap();
    let instance = dir.path().join("test_1.in");
    Instance::new(5, vec![Item::new(1, 1)]).unwrap().write_to(&instance).unwrap();
    let invoker = SolverInvoker::new(Some(Duration::from_millis(200)));

    let invocation = invoker
        .invoke(
            Path::new("/bin/sh"),
            &["-c".to_string(), "exec sleep 10".to_string()],
            &instance,
            &OutputSink::Discard,
        )
        .await
        .unwrap();

    assert_eq!(invocation.outcome, InvocationOutcome::TimedOut);
    assert!(invocation.elapsed >= Duration::from_millis(200));
    assert!(invocation.elapsed < Duration::from_secs(10));
}

#[tokio::test]
async fn unwritable_result_path_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let instance = dir.path().join("test_1.in");
    Instance::new(5, vec![Item::new(1, 1)]).unwrap().write_to(&instance).unwrap();
    let sink = OutputSink::File(dir.path().join("missing").join("file.out"));

    let result = SolverInvoker::default()
        .invoke(Path::new("/bin/sh"), &["-c".to_string(), "exit 0".to_string()], &instance, &sink)
        .await;

    assert!(matches!(result, Err(AppError::Io { .. })));
}

#[tokio::test]
async fn sweep_produces_one_plot_and_full_length_series() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(
        dir.path(),
        vec![sh_solver("fast", "exit 0"), sh_solver("reader", "cat \"$0\" > /dev/null")],
    );
    config.scenarios = vec![SweepScenario {
        title: "Tiny Sweep".into(),
        x_label: "Data size".into(),
        x_axis: SweepVariable::Items,
        plan: SweepPlan {
            count: 5,
            items: SweepAxis::new(5, 5),
            weight: SweepAxis::new(5, 5),
            value: SweepAxis::new(5, 5),
        },
    }];

    let summaries = knapsack_bench::run_sweeps(&config, &[]).await.unwrap();

    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].instances, 5);
    assert!(summaries[0].run.series.iter().all(|s| s.samples.len() == 5));
    let plot = config.paths.plots_dir.join("Tiny Sweep.svg");
    let svg = fs::read_to_string(plot).unwrap();
    assert!(svg.contains("Tiny Sweep"));
    assert!(svg.contains("FAST"));

    let first = Instance::read_from(&CorpusLayout::new(&config.paths.tests_dir, "test").instance_path(1)).unwrap();
    assert_eq!(first.capacity(), 11);
}

#[tokio::test]
async fn unknown_scenario_filter_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path(), vec![sh_solver("fast", "exit 0")]);

    let err = knapsack_bench::run_sweeps(&config, &["No Such Plot".to_string()])
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Config(_)));
}
