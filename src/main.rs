//! uiforge — build and preview a React front end from a description.
//!
//! Usage:
//!   uiforge build --request "..." --repo <url>   Plan, scaffold, and preview a project
//!   uiforge tree <dir>                           Print a directory tree as the planner sees it
//!   uiforge init-config                          Write a default uiforge.toml

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use uiforge::config::{self, ForgeConfig};
use uiforge::coordinator::{BuildSummary, ConsoleReporter, Coordinator, TaskOutcome};
use uiforge::inference::OpenRouterClient;
use uiforge::tools::read_directory_structure;

const PREVIEW_POLL_INTERVAL: Duration = Duration::from_secs(2);

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(name = "uiforge")]
#[command(version)]
#[command(about = "Multi-agent Vite+React project scaffolder")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to uiforge.toml (defaults to ./uiforge.toml, then the user config dir).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level (debug, info, warn, error).
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Plan, scaffold, and preview a new front-end project.
    Build {
        /// Free-text UI description.
        #[arg(long, required_unless_present = "request_file", conflicts_with = "request_file")]
        request: Option<String>,

        /// Read the UI description from a file.
        #[arg(long)]
        request_file: Option<PathBuf>,

        /// Base Vite+React+shadcn (pnpm) git repository URL.
        #[arg(long)]
        repo: String,
    },

    /// Print a directory tree, skipping dependency and build noise.
    Tree {
        #[arg(default_value = ".")]
        dir: PathBuf,
    },

    /// Write a default config file.
    InitConfig {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();

    if let Err(e) = dotenv::dotenv() {
        debug!("No .env loaded: {}", e);
    }

    let config_path = cli.config.unwrap_or_else(resolve_config_path);

    match cli.command {
        Commands::Build {
            request,
            request_file,
            repo,
        } => {
            let request = match (request, request_file) {
                (Some(text), _) => text,
                (None, Some(path)) => std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read request file {}", path.display()))?,
                (None, None) => bail!("--request or --request-file is required"),
            };
            cmd_build(&config_path, &request, &repo).await
        }
        Commands::Tree { dir } => cmd_tree(&dir),
        Commands::InitConfig { force } => cmd_init_config(&config_path, force),
    }
}

// ---------------------------------------------------------------------------
// Command implementations
// ---------------------------------------------------------------------------

async fn cmd_build(config_path: &Path, request: &str, repo: &str) -> Result<()> {
    let mut cfg = config::load_config(config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;
    cfg.apply_env();
    cfg.validate_credentials()?;

    if request.trim().is_empty() {
        bail!("The UI description is empty");
    }

    let backend = Arc::new(OpenRouterClient::from_config(&cfg)?);
    let mut coordinator = Coordinator::new(cfg, backend, Arc::new(ConsoleReporter));

    println!(
        "{} Agents are starting the build process...",
        ">>>".green().bold()
    );
    let summary = coordinator.run_frontend_build(request, repo).await?;
    print_summary(&summary);

    if coordinator.preview_running() {
        println!(
            "{} Preview running. Press Ctrl+C to stop.",
            ">>>".green().bold()
        );
        watch_preview(&mut coordinator).await?;
        coordinator.stop_preview().await;
    } else if coordinator.preview().is_some() {
        println!("{} The dev server exited right after starting.", "!!!".red().bold());
        coordinator.stop_preview().await;
    }

    Ok(())
}

fn cmd_tree(dir: &Path) -> Result<()> {
    let tree = read_directory_structure(dir)?;
    println!("{tree}");
    Ok(())
}

fn cmd_init_config(config_path: &Path, force: bool) -> Result<()> {
    if config_path.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            config_path.display()
        );
    }
    config::save_config(&ForgeConfig::default(), config_path)?;
    println!("Wrote {}", config_path.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Block until Ctrl+C or until the dev server exits on its own.
async fn watch_preview(coordinator: &mut Coordinator) -> Result<()> {
    let mut poll = tokio::time::interval(PREVIEW_POLL_INTERVAL);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            result = &mut ctrl_c => {
                result.context("Failed to listen for Ctrl+C")?;
                println!("\n{} Shutting down...", "<<<".red().bold());
                return Ok(());
            }
            _ = poll.tick() => {
                if !coordinator.preview_running() {
                    println!("{} The dev server has exited.", "!!!".red().bold());
                    return Ok(());
                }
            }
        }
    }
}

fn resolve_config_path() -> PathBuf {
    let local = PathBuf::from("uiforge.toml");
    if local.exists() {
        local
    } else {
        config::default_config_path()
    }
}

fn print_summary(summary: &BuildSummary) {
    let elapsed = summary.finished_at - summary.started_at;

    println!();
    println!("{}", "=== Build Summary ===".bold());
    println!("  {}:  {}", "Build".bold(), summary.build_id);
    println!("  {}:  {}", "Project".bold(), summary.project_path.display());
    println!("  {}:  {}s", "Elapsed".bold(), elapsed.num_seconds());
    println!();
    for report in &summary.reports {
        let status = match &report.outcome {
            TaskOutcome::Completed { .. } => "done".green(),
            TaskOutcome::Failed { .. } => "failed".red(),
            TaskOutcome::Skipped { .. } => "skipped".yellow(),
        };
        println!("  [{}] {}", status, report.task.kind());
    }
    if summary.failed_tasks() > 0 {
        println!(
            "\n  {} task(s) need attention.",
            summary.failed_tasks().to_string().red()
        );
    }
    match &summary.preview_url {
        Some(url) => println!("\n  {}: {}", "Preview".bold(), url.cyan().underline()),
        None => println!("\n  {}: not running", "Preview".bold()),
    }
    println!();
}
