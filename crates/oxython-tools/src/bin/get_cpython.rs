//! Clone or update a shallow, sparse CPython checkout at a release tag.
//!
//! ```text
//! get-cpython v3.14.0            # get recent
//! get-cpython v3.12.6 --force    # for downgrades
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use cpython_vendor::{
    Git, SyncOutcome, SyncPlan, SyncRequest, VendorRepoManager, VersionTag, DEFAULT_DIR,
    DEFAULT_URL,
};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{warn, Level};

#[derive(Parser, Debug)]
#[command(name = "get-cpython")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "Shallow partial clone of CPython at a tag, with upgrade and optional downgrade",
    long_about = None
)]
struct Cli {
    /// Tag like v3.12.6
    tag: String,

    /// Git URL
    #[arg(long, env = "CPYTHON_URL", default_value = DEFAULT_URL)]
    url: String,

    /// Target directory
    #[arg(long, env = "CPYTHON_DIR", default_value = DEFAULT_DIR)]
    dir: PathBuf,

    /// Permit switching to an older tag
    #[arg(long)]
    force: bool,

    /// Report what would happen without touching the checkout
    #[arg(long)]
    dry_run: bool,

    /// Git executable
    #[arg(long, env = "GIT_BIN", default_value = "git")]
    git: PathBuf,

    /// Log progress
    #[arg(short, long)]
    verbose: bool,

    /// Print the result as JSON and emit JSON-formatted log lines
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct PlanReport<'a> {
    dir: &'a PathBuf,
    requested: VersionTag,
    #[serde(flatten)]
    plan: SyncPlan,
}

#[derive(Serialize)]
struct OutcomeReport<'a> {
    dir: &'a PathBuf,
    requested: &'a str,
    #[serde(flatten)]
    outcome: SyncOutcome,
}

fn downgrade_hint(current: VersionTag, requested: &str) -> String {
    format!("Current {current} is newer than requested {requested}. Use --force to downgrade.")
}

fn run(cli: &Cli) -> Result<()> {
    let manager = VendorRepoManager::new(Git::new(&cli.git));
    let request = SyncRequest::new(&cli.tag)
        .with_url(&cli.url)
        .with_dir(&cli.dir)
        .allow_downgrade(cli.force);

    if cli.dry_run {
        let (requested, plan) = manager
            .plan(&request)
            .with_context(|| format!("cannot plan sync of {}", cli.dir.display()))?;
        if cli.json {
            let report = PlanReport {
                dir: &cli.dir,
                requested,
                plan,
            };
            println!("{}", serde_json::to_string(&report)?);
        } else {
            println!("{}: {} -> {}", cli.dir.display(), plan, requested);
        }
        return Ok(());
    }

    let outcome = manager.sync(&request)?;
    if let SyncOutcome::DowngradeRefused { current } = outcome {
        warn!("{}", downgrade_hint(current, &cli.tag));
    }
    if cli.json {
        let report = OutcomeReport {
            dir: &cli.dir,
            requested: &cli.tag,
            outcome,
        };
        println!("{}", serde_json::to_string(&report)?);
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::INFO } else { Level::WARN };
    oxython_tools::init_tracing(cli.json, level);

    if let Err(err) = run(&cli) {
        oxython_tools::exit_with_error(err);
    }
}
