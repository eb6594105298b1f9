//! Command-line front end: wires the installer to a real asset
//! directory, a console retry prompt, and stderr failure reports.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use rootstock_assets::DirSource;
use rootstock_install::{
    CrashReporter, FailurePrompt, InstallError, Installer, Outcome, PackageIndex, PrefixLayout,
    Recovery, StorageLocations, setup_storage_links,
};
use rootstock_links::LinkTables;

#[derive(Parser)]
#[command(name = "rootstock", version, about = "Materialize a bootstrap prefix tree")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Install the prefix tree, or repair a partial one.
    Install(InstallArgs),
    /// Report whether the marker binary says the prefix is installed.
    Status(StatusArgs),
    /// Rebuild the shared-storage symlinks under home/storage.
    Storage(StorageArgs),
}

#[derive(clap::Args)]
struct InstallArgs {
    /// Root of the prefix tree to materialize.
    #[arg(long)]
    prefix: PathBuf,

    /// Directory holding the pre-placed payload files.
    #[arg(long)]
    payload: PathBuf,

    /// Directory holding the asset tree and package archives.
    #[arg(long)]
    assets: PathBuf,

    /// Subtree of the asset directory to mirror into the prefix.
    #[arg(long, default_value = "")]
    asset_root: String,

    /// JSON package index. Without it no packages are installed.
    #[arg(long)]
    index: Option<PathBuf>,

    /// JSON link tables overriding the built-in ones.
    #[arg(long)]
    tables: Option<PathBuf>,

    /// Marker binary name; skips the run when bin/<NAME> is executable.
    #[arg(long)]
    marker: Option<String>,

    /// Script sourced from the generated profile when present.
    #[arg(long)]
    profile_override: Option<PathBuf>,

    /// Extra KEY=VALUE pairs for the environment file.
    #[arg(long = "env", value_name = "KEY=VALUE")]
    env: Vec<String>,

    /// Abort on failure instead of prompting for a retry.
    #[arg(long)]
    non_interactive: bool,
}

#[derive(clap::Args)]
struct StatusArgs {
    #[arg(long)]
    prefix: PathBuf,

    #[arg(long)]
    marker: String,
}

#[derive(clap::Args)]
struct StorageArgs {
    #[arg(long)]
    prefix: PathBuf,

    /// NAME=TARGET pairs to link under home/storage.
    #[arg(long = "link", value_name = "NAME=TARGET")]
    links: Vec<String>,
}

/// Asks on the terminal whether to wipe and retry.
struct ConsolePrompt;

impl FailurePrompt for ConsolePrompt {
    fn choose(&self, error: &InstallError) -> Recovery {
        eprintln!("install failed: {error}");
        eprint!("wipe the prefix and retry? [y/N] ");
        let _ = io::stderr().flush();

        let mut line = String::new();
        if io::stdin().read_line(&mut line).is_err() {
            return Recovery::Abort;
        }
        match line.trim() {
            "y" | "Y" | "yes" => Recovery::Retry,
            _ => Recovery::Abort,
        }
    }
}

struct StderrReporter;

impl CrashReporter for StderrReporter {
    fn report(&self, error: &InstallError) {
        eprintln!("error: {error}");
        let mut source = std::error::Error::source(error);
        while let Some(cause) = source {
            eprintln!("  caused by: {cause}");
            source = cause.source();
        }
    }
}

struct PairLocations(Vec<(String, PathBuf)>);

impl StorageLocations for PairLocations {
    fn locations(&self) -> Vec<(String, PathBuf)> {
        self.0.clone()
    }
}

fn split_pair(raw: &str, what: &str) -> anyhow::Result<(String, String)> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .with_context(|| format!("invalid {what} '{raw}': expected KEY=VALUE"))
}

fn build_installer(args: &InstallArgs) -> anyhow::Result<Installer> {
    let mut installer = Installer::new(
        PrefixLayout::new(&args.prefix),
        &args.payload,
        Box::new(DirSource::new(&args.assets)),
    )
    .with_asset_root(args.asset_root.clone());

    if let Some(path) = &args.index {
        let json = fs::read_to_string(path)
            .with_context(|| format!("failed to read package index {}", path.display()))?;
        let index = PackageIndex::parse(&json)
            .with_context(|| format!("failed to parse package index {}", path.display()))?;
        installer = installer.with_index(index);
    }

    if let Some(path) = &args.tables {
        let json = fs::read_to_string(path)
            .with_context(|| format!("failed to read link tables {}", path.display()))?;
        let tables = LinkTables::from_json(json.as_bytes())
            .with_context(|| format!("failed to parse link tables {}", path.display()))?;
        installer = installer.with_tables(tables);
    }

    if let Some(marker) = &args.marker {
        installer = installer.with_marker(marker.clone());
    }
    if let Some(path) = &args.profile_override {
        installer = installer.with_profile_override(path.clone());
    }

    let mut host_env = Vec::with_capacity(args.env.len());
    for raw in &args.env {
        host_env.push(split_pair(raw, "environment entry")?);
    }
    Ok(installer.with_host_env(host_env))
}

fn run_install(args: &InstallArgs) -> anyhow::Result<ExitCode> {
    let installer = build_installer(args)?;
    tracing::info!(prefix = %args.prefix.display(), "starting install");

    let outcome = if args.non_interactive {
        installer.run_with_recovery(&rootstock_install::AbortPrompt, &StderrReporter)
    } else {
        installer.run_with_recovery(&ConsolePrompt, &StderrReporter)
    };

    Ok(match outcome {
        Outcome::Completed => {
            println!("installed {}", args.prefix.display());
            ExitCode::SUCCESS
        }
        Outcome::AlreadyInstalled => {
            println!("already installed {}", args.prefix.display());
            ExitCode::SUCCESS
        }
        Outcome::PreflightFailed(reason) => {
            eprintln!("cannot install: {reason}");
            ExitCode::FAILURE
        }
        Outcome::Aborted => {
            eprintln!("aborted");
            ExitCode::from(2)
        }
    })
}

fn run_status(args: &StatusArgs) -> ExitCode {
    let layout = PrefixLayout::new(&args.prefix);
    let marker = layout.marker_binary(&args.marker);
    let installed = fs::metadata(&marker).is_ok_and(|meta| {
        use std::os::unix::fs::PermissionsExt;
        meta.is_file() && meta.permissions().mode() & 0o111 != 0
    });

    if installed {
        println!("installed");
        ExitCode::SUCCESS
    } else {
        println!("not installed");
        ExitCode::FAILURE
    }
}

fn run_storage(args: &StorageArgs) -> anyhow::Result<ExitCode> {
    let mut locations = Vec::with_capacity(args.links.len());
    for raw in &args.links {
        let (name, target) = split_pair(raw, "storage link")?;
        locations.push((name, PathBuf::from(target)));
    }

    let layout = PrefixLayout::new(&args.prefix);
    let created = setup_storage_links(&layout, &PairLocations(locations), &StderrReporter);
    println!("linked {created} storage locations");
    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match &cli.command {
        Command::Install(args) => run_install(args),
        Command::Status(args) => Ok(run_status(args)),
        Command::Storage(args) => run_storage(args),
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
