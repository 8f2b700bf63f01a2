use std::ops::AddAssign;
use std::time::Duration;

use tracing::info;

use crate::error::Error;

/// Result of one successful fetch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transfer {
    /// The destination already existed; nothing was requested.
    Skipped { bytes: u64 },
    Downloaded { bytes: u64 },
}

/// Counters of a run. Every operation returns its own share and callers merge them with `+=`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DownloadStats {
    pub datasets_processed: u64,
    pub files_downloaded: u64,
    pub files_skipped: u64,
    pub errors: u64,
    pub total_bytes: u64,
}

impl DownloadStats {
    pub fn error() -> DownloadStats {
        DownloadStats { errors: 1, ..DownloadStats::default() }
    }

    pub fn record(&mut self, outcome: &Result<Transfer, Error>) {
        match outcome {
            Ok(Transfer::Skipped { .. }) => self.files_skipped += 1,
            Ok(Transfer::Downloaded { bytes }) => {
                self.files_downloaded += 1;
                self.total_bytes += bytes;
            }
            Err(_) => self.errors += 1,
        }
    }
}

impl AddAssign for DownloadStats {
    fn add_assign(&mut self, other: DownloadStats) {
        self.datasets_processed += other.datasets_processed;
        self.files_downloaded += other.files_downloaded;
        self.files_skipped += other.files_skipped;
        self.errors += other.errors;
        self.total_bytes += other.total_bytes;
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    pub stats: DownloadStats,
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn report(&self) {
        let DownloadStats { datasets_processed, files_downloaded, files_skipped, errors, total_bytes } =
            self.stats;
        let elapsed = self.elapsed.as_secs_f64();

        info!("{}", "=".repeat(80));
        info!("Download complete!");
        info!("Datasets processed: {datasets_processed}");
        info!("Files downloaded: {files_downloaded}");
        info!("Files skipped: {files_skipped}");
        info!("Errors: {errors}");
        info!(
            "Total data downloaded: {total_bytes} bytes ({mb:.2} MB)",
            mb = total_bytes as f64 / 1024.0 / 1024.0
        );
        info!("Time elapsed: {elapsed:.2} seconds ({minutes:.2} minutes)", minutes = elapsed / 60.0);
    }
}
