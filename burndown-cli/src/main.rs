use anyhow::{Context, Result};
use burndown_core::time::{format_date, today_in};
use burndown_core::{RequestConfig, RequestOverrides};
use burndown_tracker::{BurndownService, GitHubTracker};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod config;
mod server;

use config::Settings;

#[derive(Parser, Debug)]
#[command(
    name = "burndown",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("BURNDOWN_BUILD_SHA"), ")"),
    about = "Sprint burndown charts from GitHub milestones and projects"
)]
struct Cli {
    /// Config file (default: ~/.burndown/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute the burndown series for a sprint
    Chart {
        #[command(flatten)]
        request: RequestArgs,

        /// Sprint (iteration) title; defaults to the sprint running today
        #[arg(long)]
        sprint: Option<String>,

        /// simple | scope-aware
        #[arg(long)]
        policy: Option<String>,

        #[arg(long, value_enum, default_value_t = ChartFormat::Json)]
        format: ChartFormat,
    },

    /// List the project's sprints with planned/current/closed status
    Sprints {
        #[command(flatten)]
        request: RequestArgs,

        #[arg(long, value_enum, default_value_t = ListFormat::Table)]
        format: ListFormat,
    },

    /// Serve /api/burndownchart and /api/sprints over HTTP
    Serve {
        /// Listen address (default from config: 127.0.0.1:5000)
        #[arg(long)]
        addr: Option<String>,
    },
}

/// Per-invocation overrides shared by the data commands.
#[derive(Args, Debug)]
struct RequestArgs {
    /// Repository as owner/name
    #[arg(long)]
    repo: Option<String>,

    /// Tracker token (prefer GITHUB_TOKEN)
    #[arg(long)]
    token: Option<String>,

    /// Milestone title
    #[arg(long)]
    milestone: Option<String>,

    /// Project (v2) title
    #[arg(long)]
    project: Option<String>,
}

impl RequestArgs {
    fn overrides(self, sprint: Option<String>, policy: Option<String>) -> RequestOverrides {
        RequestOverrides {
            token: self.token,
            repo: self.repo,
            milestone: self.milestone,
            project: self.project,
            sprint,
            policy,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ChartFormat {
    Json,
    Csv,
    Table,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ListFormat {
    Json,
    Table,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays pipeable.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Command::Chart {
            request,
            sprint,
            policy,
            format,
        } => {
            let cfg = request_config(&settings, request.overrides(sprint, policy))?;
            let today = today_in(&cfg.timezone)?;
            let chart = service(&settings, &cfg)?.chart(&cfg, today).await?;

            match format {
                ChartFormat::Json => println!("{}", chart.to_json()?),
                ChartFormat::Csv => print!("{}", chart.to_csv()?),
                ChartFormat::Table => print!("{}", chart.to_table()),
            }
        }

        Command::Sprints { request, format } => {
            let cfg = request_config(&settings, request.overrides(None, None))?;
            let today = today_in(&cfg.timezone)?;
            let sprints = service(&settings, &cfg)?.sprints(&cfg, today).await?;

            match format {
                ListFormat::Json => println!("{}", serde_json::to_string_pretty(&sprints)?),
                ListFormat::Table => {
                    for s in &sprints {
                        println!(
                            "{:<24} {} .. {}  {:?}",
                            s.title,
                            format_date(s.start_date),
                            format_date(s.end_date),
                            s.status
                        );
                    }
                }
            }
        }

        Command::Serve { addr } => {
            let defaults = settings
                .request_config()
                .context("server needs request defaults")?;
            let addr = addr.unwrap_or_else(|| settings.server.addr.clone());
            let state = server::AppState::new(defaults, settings.github.api_base.clone());
            server::serve(&addr, state).await?;
        }
    }

    Ok(())
}

/// Settings-derived defaults with this invocation's overrides applied.
///
/// `--repo` may supply the only repository, so it is folded in before the
/// defaults are validated.
fn request_config(settings: &Settings, overrides: RequestOverrides) -> Result<RequestConfig> {
    let mut settings = settings.clone();
    if let Some(repo) = &overrides.repo {
        settings.github.repo = Some(repo.clone());
    }
    Ok(settings.request_config()?.apply(&overrides)?)
}

fn service(settings: &Settings, cfg: &RequestConfig) -> Result<BurndownService<GitHubTracker>> {
    let mut tracker = GitHubTracker::new(cfg)?;
    if let Some(base) = &settings.github.api_base {
        tracker = tracker.with_api_base(base.as_str());
    }
    Ok(BurndownService::new(tracker))
}
