// file: src/main.rs
// description: commandline application entry point with command handling
// reference: application bootstrap and orchestration

use anyhow::{Context, Result, anyhow, bail};
use clap::{ArgAction, Parser, Subcommand};
use mrgit::utils::logging::{format_error, format_success, format_warning};
use mrgit::{
    BranchName, CheckoutRequest, Config, JsonExporter, RefreshCoordinator, TableRenderer,
    TracingSink,
};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "mrgit")]
#[command(version)]
#[command(about = "Branch status across many local git repositories", long_about = None)]
struct Cli {
    #[arg(short, long, value_name = "FILE", env = "MRGIT_CONFIG")]
    config: Option<PathBuf>,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    color: bool,

    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show branch and modification status of every repository
    Status {
        /// Root directories to scan instead of the configured ones
        #[arg(short, long = "root", value_name = "DIR")]
        roots: Vec<PathBuf>,

        #[arg(long)]
        json: bool,

        #[arg(short, long)]
        pretty: bool,

        /// Write the JSON report to a file instead of stdout
        #[arg(short, long, value_name = "FILE", requires = "json")]
        output: Option<PathBuf>,
    },

    /// Switch a clean repository to another local branch
    Checkout {
        /// Repository name (directory name) or path
        repo: String,

        branch: String,

        #[arg(short, long = "root", value_name = "DIR")]
        roots: Vec<PathBuf>,

        #[arg(long, value_name = "SECS")]
        timeout_secs: Option<u64>,
    },

    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    mrgit::utils::logging::init_logger(cli.color, cli.verbose);
    colored::control::set_override(cli.color && std::io::stdout().is_terminal());

    info!("mrgit {}", env!("CARGO_PKG_VERSION"));

    let config_path = match cli.config {
        Some(path) => path,
        None => Config::default_path().context("Failed to locate configuration file")?,
    };
    Config::ensure_config_dir(&config_path)?;
    info!("Configuration file: {}", config_path.display());

    let config = load_config(&config_path)?;

    match cli.command {
        Commands::Status {
            roots,
            json,
            pretty,
            output,
        } => {
            cmd_status(&config, roots, json, pretty, output).await?;
        }
        Commands::Checkout {
            repo,
            branch,
            roots,
            timeout_secs,
        } => {
            cmd_checkout(config, roots, &repo, &branch, timeout_secs).await?;
        }
        Commands::Config => {
            cmd_config(&config, &config_path)?;
        }
    }

    Ok(())
}

fn load_config(path: &Path) -> Result<Config> {
    if path.exists() {
        return Config::load(Some(path)).context("Failed to load configuration");
    }

    warn!(
        "Config file {} not found, using default configuration",
        path.display()
    );
    Config::load(None).or_else(|e| {
        warn!("Falling back to built-in defaults: {}", e);
        Ok(Config::default())
    })
}

fn effective_roots(config: &Config, overrides: Vec<PathBuf>) -> Result<Vec<PathBuf>> {
    let roots = if overrides.is_empty() {
        config.roots.clone()
    } else {
        overrides
    };

    if roots.is_empty() {
        bail!("No root directories configured; add \"roots\" to the config file or pass --root");
    }
    Ok(roots)
}

async fn cmd_status(
    config: &Config,
    roots: Vec<PathBuf>,
    json: bool,
    pretty: bool,
    output: Option<PathBuf>,
) -> Result<()> {
    let roots = effective_roots(config, roots)?;
    let show_progress = !json && std::io::stderr().is_terminal();
    let coordinator = RefreshCoordinator::new(config.refresh.clone(), Arc::new(TracingSink))
        .with_progress(show_progress);

    let report = coordinator.discover(&roots).await;

    if json {
        let exporter = JsonExporter::new(pretty);
        match output {
            Some(path) => exporter.write(&report, &path)?,
            None => println!("{}", exporter.render(&report)?),
        }
    } else {
        print!("{}", TableRenderer::new().render(&report));
    }

    Ok(())
}

async fn cmd_checkout(
    mut config: Config,
    roots: Vec<PathBuf>,
    repo: &str,
    branch: &str,
    timeout_secs: Option<u64>,
) -> Result<()> {
    let roots = effective_roots(&config, roots)?;
    let target = BranchName::new(branch)?;
    if timeout_secs.is_some() {
        config.refresh.checkout_timeout_secs = timeout_secs;
    }

    let coordinator = RefreshCoordinator::new(config.refresh.clone(), Arc::new(TracingSink));
    let report = coordinator.discover(&roots).await;

    let entry = report
        .find(repo)
        .ok_or_else(|| anyhow!("Repository {} not found under the configured roots", repo))?;
    let handle = entry
        .handle
        .clone()
        .ok_or_else(|| anyhow!("Repository {} could not be opened", repo))?;

    match &entry.status {
        Ok(snapshot) if !snapshot.is_switchable() => {
            eprintln!(
                "{}",
                format_warning(&format!(
                    "{} has {} modified file(s); branch switching is disabled",
                    snapshot.name, snapshot.modified_count
                ))
            );
        }
        Ok(_) => {}
        Err(e) => bail!("Cannot read status of {}: {}", repo, e),
    }

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    match coordinator
        .request_checkout(CheckoutRequest::new(handle, target), &cancel)
        .await
    {
        Ok(current) => {
            println!(
                "{}",
                format_success(&format!("{} is now on branch {}", entry.name(), current))
            );
            Ok(())
        }
        Err(e) => {
            eprintln!("{}", format_error(&format!("{}: {}", entry.name(), e)));
            Err(e).context("Checkout failed")
        }
    }
}

fn cmd_config(config: &Config, path: &Path) -> Result<()> {
    println!("# {}", path.display());
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}
