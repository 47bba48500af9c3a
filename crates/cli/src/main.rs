use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use vaultline_cli::commands::{backup, evaluate, events, reset, restore, status, summary, transfer};
use vaultline_node::config::NodeConfig;
use vaultline_node::telemetry;

#[derive(Parser)]
#[command(name = "vaultline")]
#[command(about = "Vaultline - multi-codec backup, restore and integrity ledger", long_about = None)]
struct Cli {
    /// TOML config file. `VAULTLINE_*` variables override it.
    #[arg(long, short, global = true, env = "VAULTLINE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Back up every file below the source root with every configured codec
    Backup {
        /// Overrides `source_root` from the config
        source: Option<PathBuf>,
    },
    /// Restore every artifact and verify it against the original hash
    Restore,
    /// Global and per-file summary replayed from the ledger
    Summary {
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the most recent ledger events
    Events {
        #[arg(long, short, default_value_t = 20)]
        tail: usize,
    },
    /// Ledger health and attack status
    Status,
    /// Compare codecs by compression ratio and encode time
    Evaluate,
    /// Mirror the artifact tree to another directory
    Transfer {
        /// Overrides `mirror_root` from the config
        #[arg(long)]
        to: Option<PathBuf>,
    },
    /// Return every attack view to Idle
    Reset,
}

fn main() -> anyhow::Result<()> {
    println!(r#"
__     __          _ _   _ _
\ \   / /_ _ _   _| | |_| (_)_ __   ___
 \ \ / / _` | | | | | __| | | '_ \ / _ \
  \ V / (_| | |_| | | |_| | | | | |  __/
   \_/ \__,_|\__,_|_|\__|_|_|_| |_|\___|

   Vaultline v0.1.0
    "#);

    let cli = Cli::parse();
    telemetry::init_logging("vaultline_node=warn");

    let cfg = NodeConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Commands::Backup { source } => backup::run(&cfg, source.as_deref()),
        Commands::Restore => restore::run(&cfg),
        Commands::Summary { json } => summary::run(&cfg.ledger_path, json),
        Commands::Events { tail } => events::run(&cfg.ledger_path, tail),
        Commands::Status => status::run(&cfg.ledger_path),
        Commands::Evaluate => evaluate::run(&cfg.ledger_path),
        Commands::Transfer { to } => transfer::run(&cfg, to.as_deref()),
        Commands::Reset => reset::run(&cfg),
    }
}
