//! CLI binary for sift.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use sift::render::{
    RunReport, render_json, render_results, render_status, render_unavailable,
};
use sift::{FixtureSet, SearchBackend, SiftConfig, build_orchestrator};
use sift_search::{SearchError, SearchParams};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Sift: resilient search across interchangeable backends.
#[derive(Parser)]
#[command(name = "sift", version, about)]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Command,
}

/// Available commands.
#[derive(Subcommand)]
enum Command {
    /// Run a query against fixture backends and print the breaker status.
    Search {
        /// The query to run.
        query: String,

        /// JSON file describing the backends.
        #[arg(short, long)]
        fixtures: PathBuf,

        /// Number of results to request (defaults to the configured value).
        #[arg(short, long)]
        num_results: Option<usize>,

        /// Language code.
        #[arg(long)]
        lang: Option<String>,

        /// Country code.
        #[arg(long)]
        country: Option<String>,

        /// Run the query this many times to watch circuits open and recover.
        #[arg(long, default_value_t = 1)]
        repeat: u32,

        /// Pause between repeated runs, in milliseconds.
        #[arg(long, default_value_t = 0)]
        interval_ms: u64,

        /// Print responses as JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Print the config file path that would be used.
    ConfigPath,

    /// Write a default config file.
    InitConfig {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays parseable with --json.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("sift=info,sift_search=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Search {
            query,
            fixtures,
            num_results,
            lang,
            country,
            repeat,
            interval_ms,
            json,
        } => {
            let config = SiftConfig::load(cli.config.as_deref())?;
            let run = SearchRun {
                query,
                num_results,
                params: SearchParams { lang, country },
                repeat: repeat.max(1),
                interval: Duration::from_millis(interval_ms),
                json,
            };
            run_search(config, &fixtures, run).await
        }
        Command::ConfigPath => {
            println!("{}", config_path(cli.config).display());
            Ok(())
        }
        Command::InitConfig { force } => init_config(config_path(cli.config), force),
    }
}

struct SearchRun {
    query: String,
    num_results: Option<usize>,
    params: SearchParams,
    repeat: u32,
    interval: Duration,
    json: bool,
}

async fn run_search(
    config: SiftConfig,
    fixtures: &std::path::Path,
    run: SearchRun,
) -> anyhow::Result<()> {
    let set = FixtureSet::from_file(fixtures)
        .with_context(|| format!("loading fixtures from {}", fixtures.display()))?;
    let backends = set
        .backends()
        .into_iter()
        .map(|backend| backend as Arc<dyn SearchBackend>);
    let orchestrator = build_orchestrator(&config, backends)?;
    let num_results = run.num_results.unwrap_or(config.search.num_results);

    info!(order = ?orchestrator.try_order(), "search order");

    let mut runs = Vec::new();
    let mut last = Ok(());
    for attempt in 1..=run.repeat {
        if attempt > 1 && !run.interval.is_zero() {
            tokio::time::sleep(run.interval).await;
        }
        if run.repeat > 1 && !run.json {
            println!("--- run {attempt}/{} ---", run.repeat);
        }

        last = match orchestrator.search(&run.query, num_results, &run.params).await {
            Ok(response) => {
                if run.json {
                    runs.push(RunReport::Answered(response));
                } else {
                    print!("{}", render_results(&response));
                }
                Ok(())
            }
            Err(SearchError::AllBackendsUnavailable(report)) => {
                let err = anyhow::anyhow!("{report}");
                if run.json {
                    runs.push(RunReport::Unavailable(*report));
                } else {
                    print!("{}", render_unavailable(&report));
                }
                Err(err)
            }
            Err(e) => return Err(e.into()),
        };
    }

    let status = orchestrator.backend_status();
    if run.json {
        println!("{}", render_json(&runs, &status)?);
    } else {
        println!();
        print!("{}", render_status(&status));
    }

    last
}

fn config_path(explicit: Option<PathBuf>) -> PathBuf {
    explicit
        .or_else(|| std::env::var_os(sift::config::CONFIG_ENV_VAR).map(PathBuf::from))
        .unwrap_or_else(SiftConfig::default_config_path)
}

fn init_config(path: PathBuf, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists (pass --force to overwrite)",
            path.display()
        );
    }
    SiftConfig::default().save_to_file(&path)?;
    println!("wrote {}", path.display());
    Ok(())
}
