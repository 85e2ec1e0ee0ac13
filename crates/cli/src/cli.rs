use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use rekindle_core::{Adjustment, RestorationMode};

use crate::commands;

#[derive(Debug, Parser)]
#[command(
    name = "rekindle",
    version,
    about = "Restore old photographs through a generative image API"
)]
pub struct Cli {
    /// Configuration file (TOML). Defaults to $REKINDLE_CONFIG, then ./rekindle.toml if present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Restore one or more photos and write the results
    Restore(RestoreArgs),
    /// Print the effective configuration with secrets redacted
    Config,
}

#[derive(Debug, Args, Clone)]
pub struct RestoreArgs {
    /// Photos to restore
    #[arg(value_name = "FILE", required = true)]
    pub files: Vec<PathBuf>,

    /// Restoration mode (standard or ultra); defaults to the configured mode
    #[arg(long)]
    pub mode: Option<RestorationMode>,

    /// Directory for restored images and their sidecars
    #[arg(long, default_value = ".")]
    pub out: PathBuf,

    /// API key to use instead of the platform default
    #[arg(long)]
    pub api_key: Option<String>,

    /// Photos restored at the same time (overrides the configuration)
    #[arg(long)]
    pub parallel: Option<usize>,

    /// Per-photo deadline in seconds (overrides the configuration)
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    #[arg(long, value_name = "50-150")]
    pub brightness: Option<f32>,

    #[arg(long, value_name = "50-150")]
    pub contrast: Option<f32>,

    #[arg(long, value_name = "0-200")]
    pub saturation: Option<f32>,

    #[arg(long, value_name = "0-100")]
    pub sharpness: Option<f32>,

    /// Print Prometheus metrics to stdout after the batch
    #[arg(long)]
    pub metrics: bool,
}

impl RestoreArgs {
    /// Adjustments given on the command line.
    pub fn adjustments(&self) -> Vec<(Adjustment, f32)> {
        [
            (Adjustment::Brightness, self.brightness),
            (Adjustment::Contrast, self.contrast),
            (Adjustment::Saturation, self.saturation),
            (Adjustment::Sharpness, self.sharpness),
        ]
        .into_iter()
        .filter_map(|(adjustment, value)| value.map(|v| (adjustment, v)))
        .collect()
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config = commands::load(self.config.as_deref())?;
        match self.command {
            Command::Restore(args) => commands::restore::run(config, args).await,
            Command::Config => commands::config::run(&config),
        }
    }
}
