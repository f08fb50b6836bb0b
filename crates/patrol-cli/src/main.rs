mod registry;

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use patrol_client::ReqwestCaller;
use patrol_core::context::RunContext;
use patrol_core::runner::EndpointRunner;
use patrol_core::sink::RotatingFileSink;

#[derive(Parser)]
#[command(name = "patrol", version, about = "API smoke-test runner")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the endpoint registry against a base address
    Smoke {
        /// Base address the endpoint paths are appended to
        #[arg(short, long, env = "PATROL_BASE_URL")]
        base_url: String,

        /// Directory error logs are written to
        #[arg(short, long, default_value = "output")]
        output_dir: PathBuf,

        /// Base name of the rotating error log
        #[arg(long, default_value = "api-error")]
        log_base: String,

        /// Rotation threshold in KiB
        #[arg(long, default_value_t = 500)]
        max_log_kib: u64,
    },

    /// Print the built-in endpoint registry
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Setup tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("patrol=info".parse()?))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Smoke {
            base_url,
            output_dir,
            log_base,
            max_log_kib,
        } => {
            cmd_smoke(&base_url, &output_dir, &log_base, max_log_kib * 1024).await?;
        }
        Commands::List => cmd_list(),
    }

    Ok(())
}

/// Run the registry once. All failures are logged, none is fatal: the
/// exit code stays 0 whether the run was clean or not.
async fn cmd_smoke(
    base_url: &str,
    output_dir: &Path,
    log_base: &str,
    max_log_size: u64,
) -> Result<()> {
    let registry = registry::default_registry();
    let caller = ReqwestCaller::new().map_err(|e| anyhow::anyhow!(e))?;
    let runner = EndpointRunner::new(caller, base_url);

    let mut ctx = RunContext::new();
    let mut sink = RotatingFileSink::new(output_dir, log_base).with_max_size(max_log_size);

    let summary = runner.run(&registry, &mut ctx, &mut sink).await;

    println!(
        "Endpoints: {} registered, {} disabled",
        summary.total, summary.skipped
    );
    println!(
        "Calls:     {} issued, {} clean",
        summary.called, summary.succeeded
    );
    println!("Anomalies: {} records", summary.anomalies);

    let files = sink.written_paths();
    if files.is_empty() {
        println!("No error log written");
    } else {
        println!("Error log:");
        for file in files {
            println!("  {}", file.display());
        }
    }

    Ok(())
}

fn cmd_list() {
    let registry = registry::default_registry();

    println!("{} registered endpoints:\n", registry.len());
    for api in &registry {
        let flag = if api.enabled { ' ' } else { '-' };
        println!(
            "  [{flag}] {:<14} {:>4} {}",
            api.name,
            api.method.to_string(),
            api.path
        );
    }
    println!("\nEntries marked '-' are disabled and will be skipped.");
}
