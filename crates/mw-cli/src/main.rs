use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "mw")]
#[command(about = "Model Watch: NoF1 trading feed reporter", long_about = None)]
struct Cli {
    /// Default log filter when RUST_LOG is unset
    #[arg(
        long,
        global = true,
        default_value = "info",
        value_parser = ["trace", "debug", "info", "warn", "error"],
        ignore_case = true
    )]
    log_level: String,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll both feeds forever at the configured interval
    Run {
        /// Layered config paths in merge order (defaults apply when omitted)
        #[arg(long = "config")]
        config_paths: Vec<String>,

        /// Print reports to stdout instead of sending them
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },

    /// Run exactly one cycle and print its outcome
    Once {
        /// Layered config paths in merge order (defaults apply when omitted)
        #[arg(long = "config")]
        config_paths: Vec<String>,

        /// Print the report to stdout instead of sending it
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },

    /// Compute layered config hash + print canonical JSON
    ConfigHash {
        /// Paths in merge order (base -> env -> local overrides...)
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Snapshot file utilities
    Snapshot {
        #[command(subcommand)]
        cmd: SnapshotCmd,
    },
}

#[derive(Subcommand)]
enum SnapshotCmd {
    /// Summarize the persisted snapshot, one line per model
    Show {
        /// Snapshot file
        #[arg(long, default_value = mw_config::DEFAULT_SNAPSHOT_PATH)]
        path: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env.local if present (dev convenience).
    // Silent if the file does not exist; production injects env vars directly.
    let _ = dotenvy::from_filename(".env.local");

    let cli = Cli::parse();
    commands::init_tracing(&cli.log_level);

    match cli.cmd {
        Commands::Run {
            config_paths,
            dry_run,
        } => commands::run::run_forever(&config_paths, dry_run).await?,

        Commands::Once {
            config_paths,
            dry_run,
        } => commands::run::run_once(&config_paths, dry_run).await?,

        Commands::ConfigHash { paths } => {
            let path_refs: Vec<&str> = paths.iter().map(|s| s.as_str()).collect();
            let loaded = mw_config::load_layered_yaml(&path_refs)?;
            println!("config_hash={}", loaded.config_hash);
            println!("{}", loaded.canonical_json);
        }

        Commands::Snapshot { cmd } => match cmd {
            SnapshotCmd::Show { path } => commands::snapshot::show(&path)?,
        },
    }

    Ok(())
}
