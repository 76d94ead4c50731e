use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use trustme_cli::orchestrator::Orchestrator;
use trustme_sign::tool::ProcessRunner;

#[derive(Parser)]
#[command(
    name = "trustme",
    about = "Re-signs the VSIX packages of an offline installer and patches their cache hashes"
)]
struct Cli {
    /// Path to the job configuration file
    config: PathBuf,
    /// Path where the generated PFX will be stored
    pfx: PathBuf,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let summary = Orchestrator::new(Arc::new(ProcessRunner))
        .run_from_file(&cli.config, &cli.pfx)
        .with_context(|| format!("re-signing job {} failed", cli.config.display()))?;

    log::info!("credential stored at {}", summary.credential.display());
    Ok(())
}
