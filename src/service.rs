use std::path::Path;
use std::time::Instant;

use async_trait::async_trait;
use serde_json::Value;
use tokio::fs;
use tracing::{debug, error, info, warn};

use crate::config::{Context, METADATA_TIMEOUT};
use crate::download::fetch_file;
use crate::error::Error;
use crate::error::Error::CatalogError;
use crate::latest::{select_latest, Latest};
use crate::model::{Catalog, Dataset, Distribution};
use crate::progress::SpinnerHelper;
use crate::router::{dataset_dir_name, route, Route, Strategy};
use crate::stats::{DownloadStats, RunSummary};
use crate::table::fetch_table;

const METADATA_FILE: &str = "metadata.json";

#[async_trait]
pub trait CatalogMirror {
    /// Mirrors the latest distributions of every dataset of the catalog into the output
    /// directory. Only a catalog that cannot be fetched fails the run; everything else is
    /// logged and counted in the returned statistics.
    async fn mirror_catalog(&self) -> Result<RunSummary, Error>;
}

pub struct MirrorService {
    pub context: Context,
}

#[async_trait]
impl CatalogMirror for MirrorService {
    async fn mirror_catalog(&self) -> Result<RunSummary, Error> {
        let started = Instant::now();
        let output_dir = &self.context.config.output_dir;
        info!("Starting CMS bulk download...");
        info!("Output directory: {}", output_dir.display());
        fs::create_dir_all(output_dir).await?;

        let catalog = self.fetch_catalog().await.map_err(|e| {
            error!("Error fetching catalog: {e}");
            e
        })?;

        let mut stats = DownloadStats::default();
        let total = catalog.dataset.len();
        if total == 0 {
            error!("No datasets found in catalog!");
        } else {
            info!("Processing {total} datasets...");
        }

        for (idx, entry) in catalog.dataset.iter().enumerate() {
            info!("[{n}/{total}] Dataset {n} of {total}", n = idx + 1);
            stats += self.process_dataset(entry).await;
        }

        let summary = RunSummary { stats, elapsed: started.elapsed() };
        summary.report();
        Ok(summary)
    }
}

impl MirrorService {
    async fn fetch_catalog(&self) -> Result<Catalog, Error> {
        let catalog_url = &self.context.config.catalog_url;
        let spinner = SpinnerHelper::create(format!("Fetching dataset catalog from {catalog_url}"))?;
        info!("Fetching dataset catalog from {catalog_url}...");

        let response = self
            .context
            .client
            .get(catalog_url)
            .timeout(METADATA_TIMEOUT)
            .send()
            .await;
        let body = match response.and_then(|r| r.error_for_status()) {
            Ok(response) => response.text().await,
            Err(e) => Err(e),
        };
        spinner.finish_and_clear();

        let catalog = serde_json::from_str::<Catalog>(&body?).map_err(|e| {
            CatalogError(format!("{catalog_url} is not a valid catalog document: {e}"))
        })?;
        info!("Found {} datasets in catalog", catalog.dataset.len());
        Ok(catalog)
    }

    async fn process_dataset(&self, entry: &Value) -> DownloadStats {
        match self.mirror_dataset(entry).await {
            Ok(stats) => stats,
            Err(e) => {
                let identifier = entry.get("identifier").and_then(Value::as_str).unwrap_or("<no identifier>");
                error!("Error processing dataset {identifier}: {e}");
                DownloadStats::error()
            }
        }
    }

    async fn mirror_dataset(&self, entry: &Value) -> Result<DownloadStats, Error> {
        let dataset = Dataset::from_value(entry)?;
        info!("{}", "=".repeat(80));
        info!("Processing dataset: {}", dataset.title);
        info!("Identifier: {}", dataset.identifier);
        debug!("Description: {}", dataset.description);

        let dataset_dir = self
            .context
            .config
            .output_dir
            .join(dataset_dir_name(&dataset.identifier, &dataset.title));
        fs::create_dir_all(&dataset_dir).await?;
        fs::write(dataset_dir.join(METADATA_FILE), serde_json::to_vec_pretty(entry)?).await?;

        info!("Found {} total distributions/versions", dataset.distribution.len());
        let latest = select_latest(&dataset.distribution);
        match &latest {
            Latest::Dated { token, distributions } => {
                info!("Filtered to {} latest distribution(s) (latest: {token})", distributions.len())
            }
            Latest::Undated(_) => warn!("No temporal information found, downloading all distributions"),
        }
        let selected = latest.into_distributions();

        let mut stats = DownloadStats { datasets_processed: 1, ..DownloadStats::default() };
        for (idx, distribution) in selected.iter().enumerate() {
            let temporal = Some(distribution.temporal.as_str()).filter(|t| !t.is_empty()).unwrap_or("no date");
            info!("Processing distribution {}/{} (temporal: {temporal})", idx + 1, selected.len());
            stats += self.process_distribution(distribution, &dataset_dir, &dataset.title).await;
        }

        Ok(stats)
    }

    async fn process_distribution(
        &self,
        distribution: &Distribution,
        dataset_dir: &Path,
        dataset_title: &str,
    ) -> DownloadStats {
        let mut stats = DownloadStats::default();
        let description = format!("{dataset_title} - {title}", title = distribution.title);

        let outcome = match route(distribution) {
            Ok(None) => {
                debug!("No download URL for {description}, skipping");
                return stats;
            }
            Ok(Some(Route { strategy, file_name })) => {
                let destination = dataset_dir.join(file_name);
                match strategy {
                    Strategy::FlatFile { url } => {
                        fetch_file(&self.context, &url, &destination, &description).await
                    }
                    Strategy::PaginatedTable { dataset_id } => {
                        fetch_table(&self.context, &dataset_id, &destination, &description).await
                    }
                }
            }
            Err(e) => {
                error!("Error processing distribution {description}: {e}");
                Err(e)
            }
        };

        stats.record(&outcome);
        stats
    }
}
