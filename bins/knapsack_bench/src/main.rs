use clap::Parser;
use tracing::info;

use knapsack_bench::config::{CliArgs, Command, HarnessConfig, ReportFormat};
use knapsack_bench::report::RunSummary;
use shared::{AppError, AppResult};

#[tokio::main(flavor = "current_thread")]
async fn main() -> AppResult<()> {
    shared::init_tracing()?;

    let cli = CliArgs::parse();
    let config = HarnessConfig::from_cli(&cli)?;
    info!(
        tests_dir = ?config.paths.tests_dir,
        build_dir = ?config.paths.build_dir,
        solvers = config.solvers.len(),
        timeout_secs = ?config.timeout_secs,
        "loaded harness configuration"
    );

    match &cli.command {
        Command::Generate { .. } => {
            let corpus = knapsack_bench::generate_stress_corpus(&config)?;
            println!(
                "Generated {} test cases in {:?}.",
                corpus.len(),
                corpus.dir()
            );
        }
        Command::Stress { format, .. } => {
            let summary = knapsack_bench::run_stress(&config).await?;
            print_summaries(&[summary], *format)?;
        }
        Command::Sweep { scenario, format } => {
            let summaries = knapsack_bench::run_sweeps(&config, scenario).await?;
            print_summaries(&summaries, *format)?;
        }
    }

    Ok(())
}

fn print_summaries(summaries: &[RunSummary], format: ReportFormat) -> AppResult<()> {
    if format.json {
        let json = serde_json::to_string_pretty(summaries)
            .map_err(|err| AppError::Message(format!("failed to serialise run summary: {err}")))?;
        println!("{json}");
        return Ok(());
    }

    for summary in summaries {
        if format.markdown {
            println!("{}", summary.render_markdown());
        } else {
            println!("{}", summary.render_table());
        }
    }
    Ok(())
}
