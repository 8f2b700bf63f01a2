use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use cms_mirror::config::{Config, CMS_API_BASE, CMS_CATALOG_URL, DEFAULT_OUTPUT_DIR, USER_AGENT};

/// Bulk download the latest data of every dataset published on data.cms.gov. Files that were
/// downloaded by an earlier run are skipped, so an interrupted download resumes by running the
/// same command again.
#[derive(Parser)]
pub(crate) struct Cli {
  /// Output directory for downloaded files.
  #[clap(long, short, default_value = DEFAULT_OUTPUT_DIR)]
  pub(crate) output_dir: PathBuf,
  /// Delay between requests in seconds. Increase it to be more respectful of the server.
  #[clap(long, short, default_value = "0.5", value_parser = parse_delay)]
  pub(crate) delay: Duration,
  /// The `data.json` catalog listing all datasets.
  #[clap(long, env = "CMS_CATALOG_URL", default_value = CMS_CATALOG_URL)]
  pub(crate) catalog_url: String,
  /// Base URL of the data API serving API-only datasets page by page.
  #[clap(long, env = "CMS_API_BASE", default_value = CMS_API_BASE)]
  pub(crate) api_base: String,
}

impl Cli {
  pub(crate) fn into_config(self) -> Config {
    Config {
      output_dir: self.output_dir,
      delay: self.delay,
      catalog_url: self.catalog_url,
      api_base: self.api_base,
      user_agent: USER_AGENT.to_string(),
    }
  }
}

fn parse_delay(value: &str) -> Result<Duration, String> {
  let seconds = value
    .parse::<f64>()
    .map_err(|e| format!("`{value}` is not a number of seconds: {e}"))?;
  Duration::try_from_secs_f64(seconds).map_err(|_| format!("`{value}` is not a valid delay"))
}
