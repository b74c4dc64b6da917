//! USB device listing - CLI entry point.

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use env_logger::Env;
use std::path::PathBuf;

use lsusb::config::{Config, example_config};
use lsusb::output::generate_listing;
use lsusb::source::SysfsSource;
use lsusb::topology::{BuildPolicy, DeviceList};

#[derive(Parser)]
#[command(name = "lsusb")]
#[command(about = "List USB devices")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file path (default: auto-detect)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory to enumerate devices from (default: /sys/bus/usb/devices)
    #[arg(long)]
    sysfs: Option<PathBuf>,

    /// Show speed, device qualifier and endpoint details
    #[arg(short, long)]
    verbose: bool,

    /// Abort on the first device that cannot be read
    #[arg(long)]
    strict: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print blank example config file
    InitConfig,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Default log filter when `RUST_LOG` is unset; verbose shows decoded records.
fn log_filter(verbose: bool) -> &'static str {
    if verbose { "debug" } else { "warn" }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Subcommands need neither config nor devices
    match &cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            generate(*shell, &mut cmd, "lsusb", &mut std::io::stdout());
            return Ok(());
        }
        Some(Commands::InitConfig) => {
            print!("{}", example_config());
            return Ok(());
        }
        None => {}
    }

    let config = match &cli.config {
        Some(path) => Config::load_from_path(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => Config::load()?,
    };

    let sysfs_path = cli.sysfs.unwrap_or(config.settings.sysfs_path.clone());
    let verbose = cli.verbose || config.settings.verbose;
    env_logger::Builder::from_env(Env::default().default_filter_or(log_filter(verbose))).init();

    let policy = if cli.strict {
        BuildPolicy::Abort
    } else {
        config.settings.build_policy()
    };

    let source = SysfsSource::with_base_path(&sysfs_path);
    let handles = source
        .devices()
        .with_context(|| format!("enumerating {}", source.base_path().display()))?;

    let mut devices = DeviceList::new();
    devices.collect(
        &source,
        handles.into_iter().map(|child| child.handle),
        policy,
    )?;
    devices.sort();

    print!("{}", generate_listing(devices.devices(), verbose));

    devices.release();
    Ok(())
}
