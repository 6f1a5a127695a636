mod commands;
mod lifecycle;
mod utils;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::Session;
use envctl_core::defaults::DEFAULT_PROJECT;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "envctl")]
#[command(about = "Start, stop and verify Azure environments without surprise bills", long_about = None)]
struct Cli {
    /// Config file (default: search ./envctl.kdl, ./.envctl/, ~/.config/envctl/)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Azure subscription to operate on (default: the az CLI's current one)
    #[arg(long, global = true, env = "AZURE_SUBSCRIPTION_ID")]
    subscription: Option<String>,

    /// Directory holding azure.yaml, used by startup (default: current directory)
    #[arg(long, global = true, env = "ENVCTL_PROJECT_DIR")]
    project_dir: Option<PathBuf>,

    /// Seconds between verification checks
    #[arg(long, global = true)]
    interval: Option<u64>,

    /// Maximum number of verification checks
    #[arg(long, global = true)]
    attempts: Option<u32>,

    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Delete every resource of an environment, then its resource group
    Shutdown {
        /// Environment name (it, qa, prod, ...)
        env: String,
        /// Skip the confirmation gate (CI use)
        #[arg(long)]
        force: bool,
    },
    /// Provision an environment with azd
    Startup {
        /// Environment name
        env: String,
        /// Skip the confirmation gate
        #[arg(long)]
        force: bool,
    },
    /// Wait until an environment is fully present, or gone with --absent
    Verify {
        /// Environment name
        env: String,
        #[arg(long)]
        absent: bool,
    },
    /// Show which environments are running and what they cost
    Status {
        /// Only this environment
        env: Option<String>,
    },
    /// Show the teardown order for an environment
    Plan {
        /// Environment name
        env: String,
        /// Enumerate the live resource group instead of the catalog
        #[arg(long)]
        live: bool,
    },
    /// Show cost estimates
    Costs {
        /// Print a Markdown table
        #[arg(long)]
        markdown: bool,
    },
    /// Shut down every environment at once
    #[command(name = "emergency-shutdown")]
    EmergencyShutdown {
        /// Skip the confirmation gate
        #[arg(long)]
        force: bool,
    },
    /// List configured environments
    Environments,
    /// Write a starter envctl.kdl
    Init {
        /// Project name used in resource group names
        #[arg(long, default_value = DEFAULT_PROJECT)]
        project: String,
        /// Write to ~/.config/envctl/ instead of the current directory
        #[arg(long)]
        global: bool,
    },
    /// Show version information
    Version,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // Commands that need no config
    match &cli.command {
        Commands::Version => {
            println!("envctl {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Commands::Init { project, global } => {
            return commands::init::handle(project, *global);
        }
        _ => {}
    }

    let session = load_session(&cli)?;

    match cli.command {
        Commands::Shutdown { env, force } => {
            commands::shutdown::handle(&session, &env, force).await?;
        }
        Commands::Startup { env, force } => {
            commands::startup::handle(&session, &env, force).await?;
        }
        Commands::Verify { env, absent } => {
            commands::verify::handle(&session, &env, absent).await?;
        }
        Commands::Status { env } => {
            commands::status::handle(&session, env.as_deref()).await?;
        }
        Commands::Plan { env, live } => {
            commands::plan::handle(&session, &env, live).await?;
        }
        Commands::Costs { markdown } => {
            commands::costs::handle(&session, markdown)?;
        }
        Commands::EmergencyShutdown { force } => {
            commands::emergency::handle(&session, force).await?;
        }
        Commands::Environments => {
            commands::environments::handle(&session)?;
        }
        Commands::Init { .. } | Commands::Version => {
            unreachable!("handled before config loading");
        }
    }

    Ok(())
}

fn load_session(cli: &Cli) -> anyhow::Result<Session> {
    let config_path = envctl_config::find_config_file(cli.config.as_deref())?;
    let mut manifest = envctl_core::load_manifest_or_default(config_path.as_deref())?;

    if let Some(interval) = cli.interval {
        manifest.verify.interval_secs = interval;
    }
    if let Some(attempts) = cli.attempts {
        if attempts == 0 {
            anyhow::bail!("--attempts must be at least 1");
        }
        manifest.verify.attempts = attempts;
    }

    Ok(Session {
        manifest,
        config_path,
        subscription: cli.subscription.clone().filter(|s| !s.is_empty()),
        project_dir: cli.project_dir.clone(),
    })
}
