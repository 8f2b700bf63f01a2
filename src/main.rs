mod cli;

use std::process::ExitCode;

use clap::Parser;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

use cli::Cli;
use cms_mirror::config::Context;
use cms_mirror::error::Error;
use cms_mirror::service::{CatalogMirror, MirrorService};

const INTERRUPTED: u8 = 130;

#[tokio::main]
async fn main() -> ExitCode {
  init_logging();

  match run(Cli::parse()).await {
    Ok(code) => code,
    Err(e) => {
      error!("Fatal error: {e}");
      ExitCode::FAILURE
    }
  }
}

async fn run(cli: Cli) -> Result<ExitCode, Error> {
  let service = MirrorService { context: Context::new(cli.into_config())? };

  tokio::select! {
    summary = service.mirror_catalog() => summary.map(|_| ExitCode::SUCCESS),
    Ok(()) = tokio::signal::ctrl_c() => {
      warn!("Download interrupted by user");
      warn!("Completed files have been kept, run again to resume");
      Ok(ExitCode::from(INTERRUPTED))
    }
  }
}

fn init_logging() {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("cms_mirror=info"));
  tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}
