//! SegKV CLI
//!
//! Demonstration harness for exercising the engine against a data directory.

use clap::{Parser, Subcommand};
use segkv::{Config, Engine};
use tracing_subscriber::{fmt, EnvFilter};

/// SegKV CLI
#[derive(Parser, Debug)]
#[command(name = "segkv-cli")]
#[command(about = "Minimal log-structured key-value store")]
#[command(version)]
struct Args {
    /// Data directory
    #[arg(short, long, default_value = "./segkv_data")]
    data_dir: String,

    /// Per-segment size limit in KB before rotation
    #[arg(short, long, default_value = "4096")]
    segment_kb: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Set a key-value pair
    Set {
        /// The key to set
        key: i64,

        /// The value to set
        value: String,
    },

    /// Get a value by key
    Get {
        /// The key to get
        key: i64,
    },

    /// Show engine statistics
    Stats,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,segkv=debug"));

    fmt().with_env_filter(filter).with_target(true).init();

    let args = Args::parse();

    let config = Config::builder()
        .data_dir(&args.data_dir)
        .segment_size_limit(args.segment_kb * 1024)
        .build();

    let mut engine = match Engine::open(config) {
        Ok(e) => e,
        Err(e) => {
            tracing::error!("Failed to open engine: {}", e);
            std::process::exit(1);
        }
    };

    let result = match args.command {
        Commands::Set { key, value } => engine.set(key, value.as_bytes()).map(|()| {
            println!("OK");
        }),
        Commands::Get { key } => engine.get(key).map(|value| match value {
            Some(bytes) => println!("{}", String::from_utf8_lossy(&bytes)),
            None => println!("(not found)"),
        }),
        Commands::Stats => {
            println!("segkv v{}", segkv::VERSION);
            println!("data dir:        {}", engine.data_dir().display());
            println!("segments:        {}", engine.segment_count());
            println!("active segment:  {}", engine.active_segment_id());
            println!("active bytes:    {}", engine.active_total_bytes());
            Ok(())
        }
    };

    if let Err(e) = result {
        tracing::error!("Command failed: {}", e);
        std::process::exit(1);
    }
}
