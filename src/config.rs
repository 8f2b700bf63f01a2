use std::path::PathBuf;
use std::time::Duration;

use reqwest::Client;

use crate::error::Error;

pub const DEFAULT_OUTPUT_DIR: &str = "cms_data";
pub const DEFAULT_DELAY_SECS: f64 = 0.5;
pub const CMS_CATALOG_URL: &str = "https://data.cms.gov/data.json";
pub const CMS_API_BASE: &str = "https://data.cms.gov/data-api/v1";
pub const USER_AGENT: &str = "CMS-Bulk-Downloader/1.0";

pub(crate) const METADATA_TIMEOUT: Duration = Duration::from_secs(30);
pub(crate) const TRANSFER_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub output_dir: PathBuf,
    /// Pause after every completed transfer and every fetched page.
    pub delay: Duration,
    pub catalog_url: String,
    /// Root of the data API; stats and pages live below `{api_base}/dataset/{id}`.
    pub api_base: String,
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            delay: Duration::from_secs_f64(DEFAULT_DELAY_SECS),
            catalog_url: CMS_CATALOG_URL.to_string(),
            api_base: CMS_API_BASE.to_string(),
            user_agent: USER_AGENT.to_string(),
        }
    }
}

/// Everything an operation of a run needs: the configuration and the HTTP client shared by all
/// requests.
#[derive(Debug, Clone)]
pub struct Context {
    pub client: Client,
    pub config: Config,
}

impl Context {
    pub fn new(config: Config) -> Result<Context, Error> {
        let client = Client::builder().user_agent(config.user_agent.as_str()).build()?;
        Ok(Context { client, config })
    }

    pub(crate) fn stats_url(&self, dataset_id: &str) -> String {
        format!("{base}/dataset/{dataset_id}/data/stats", base = self.api_base())
    }

    pub(crate) fn data_url(&self, dataset_id: &str) -> String {
        format!("{base}/dataset/{dataset_id}/data", base = self.api_base())
    }

    pub(crate) async fn pause(&self) {
        if !self.config.delay.is_zero() {
            tokio::time::sleep(self.config.delay).await;
        }
    }

    fn api_base(&self) -> &str {
        self.config.api_base.trim_end_matches('/')
    }
}

#[cfg(test)]
pub(crate) fn test_context(output_dir: &std::path::Path) -> Context {
    Context::new(Config {
        output_dir: output_dir.to_path_buf(),
        delay: Duration::ZERO,
        catalog_url: format!("{}/data.json", mockito::server_url()),
        api_base: format!("{}/data-api/v1", mockito::server_url()),
        user_agent: USER_AGENT.to_string(),
    })
    .unwrap()
}
