use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "npugate",
    about = "npugate — NPU capacity admission filter",
    version,
    propagate_version = true,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a cluster snapshot: one decision per target.
    ///
    /// The snapshot is JSON: {"workload": {...}, "targets": [{...}, ...]}.
    Evaluate {
        /// Path to the snapshot file
        #[arg(short, long)]
        snapshot: PathBuf,
        /// Path to npugate.toml (defaults apply when omitted)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },
    /// Manage npugate.toml
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write a default npugate.toml
    Init {
        #[arg(short, long, default_value = "npugate.toml")]
        path: PathBuf,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the effective configuration
    Show {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("npugate=info".parse()?)
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Evaluate {
            snapshot,
            config,
            format,
        } => commands::evaluate::evaluate(&snapshot, config.as_deref(), &format),
        Commands::Config { action } => match action {
            ConfigAction::Init { path, force } => commands::config::init(&path, force),
            ConfigAction::Show { config } => commands::config::show(config.as_deref()),
        },
    }
}
