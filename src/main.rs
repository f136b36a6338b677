use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use mcvisor::{Config, LogWriter, Platform, Subscribe, Supervisor};

/// Keeps a Minecraft server updated, backed up and running.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// TOML configuration file; built-in defaults are used when omitted.
    #[arg(long, short)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    setup_tracing();

    let cfg = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    let platform = Platform::detect()?;
    if let Some(seq) = platform.title_sequence(&format!("[{}]", mcvisor::console_tag())) {
        let mut out = std::io::stdout();
        let _ = out.write_all(seq.as_bytes());
        let _ = out.flush();
    }

    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::for_crate())];
    let sup = Supervisor::builder(cfg)
        .with_platform(platform)
        .with_subscribers(subs)
        .build()
        .context("cannot start supervisor")?;

    sup.run().await?;
    Ok(())
}

fn setup_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("mcvisor=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
