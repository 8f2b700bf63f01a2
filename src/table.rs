use std::path::Path;

use futures::stream;
use indicatif::ProgressBar;
use serde_json::Value;
use tracing::{error, info};

use crate::config::{Context, METADATA_TIMEOUT, TRANSFER_TIMEOUT};
use crate::download::{existing, file_name, remove_partial, save_stream};
use crate::error::Error;
use crate::model::TableStats;
use crate::progress::SpinnerHelper;
use crate::stats::Transfer;

/// Rows requested per page of the data API.
pub const BATCH_SIZE: u64 = 5000;

/// Downloads every row of an API-only dataset and stores them as one JSON array.
///
/// The file only appears once all pages were fetched. A failing page discards the rows
/// gathered so far, the next run starts again at offset 0.
pub async fn fetch_table(
    context: &Context,
    dataset_id: &str,
    destination: &Path,
    description: &str,
) -> Result<Transfer, Error> {
    if let Some(skipped) = existing(destination).await {
        return Ok(skipped);
    }

    match download_table(context, dataset_id, destination, description).await {
        Ok(transfer) => Ok(transfer),
        Err(e) => {
            error!("Error downloading API data for {dataset_id}: {e}");
            remove_partial(destination).await;
            Err(e)
        }
    }
}

async fn download_table(
    context: &Context,
    dataset_id: &str,
    destination: &Path,
    description: &str,
) -> Result<Transfer, Error> {
    info!("Fetching dataset stats: {description}");
    let total_rows = context
        .client
        .get(context.stats_url(dataset_id))
        .timeout(METADATA_TIMEOUT)
        .send()
        .await?
        .error_for_status()?
        .json::<TableStats>()
        .await?
        .total_rows;
    info!("Dataset has {total_rows} rows, downloading via API...");

    let spinner = SpinnerHelper::create(format!("Fetching rows of {description}"))?;
    let rows = fetch_rows(context, dataset_id, total_rows, &spinner).await;
    spinner.finish_and_clear();
    let rows = rows?;

    if let Some(parent) = destination.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let body = serde_json::to_vec_pretty(&rows)?;
    let bytes = save_stream(destination, stream::iter([Ok::<_, Error>(body)]), &ProgressBar::hidden()).await?;

    info!(
        "Downloaded API data: {name} ({bytes} bytes, {count} rows)",
        name = file_name(destination),
        count = rows.len()
    );
    Ok(Transfer::Downloaded { bytes })
}

async fn fetch_rows(
    context: &Context,
    dataset_id: &str,
    total_rows: u64,
    spinner: &ProgressBar,
) -> Result<Vec<Value>, Error> {
    let mut rows = Vec::new();
    let mut offset = 0;

    while offset < total_rows {
        let end = total_rows.min(offset + BATCH_SIZE);
        info!("Fetching rows {offset} to {end}");
        spinner.set_message(format!("Fetching rows {offset} to {end} of {total_rows}"));

        let batch = context
            .client
            .get(context.data_url(dataset_id))
            .query(&[("size", BATCH_SIZE), ("offset", offset)])
            .timeout(TRANSFER_TIMEOUT)
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<Value>>()
            .await?;

        rows.extend(batch);
        offset += BATCH_SIZE;
        context.pause().await;
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use mockito::{mock, Matcher};
    use serde_json::{json, Value};
    use tempfile::TempDir;

    use crate::config::test_context;
    use crate::stats::Transfer;
    use crate::table::fetch_table;

    fn page(offset: &str) -> Matcher {
        Matcher::AllOf(vec![
            Matcher::UrlEncoded("size".into(), "5000".into()),
            Matcher::UrlEncoded("offset".into(), offset.into()),
        ])
    }

    #[tokio::test]
    async fn given_rows_over_two_pages_when_fetch_table_then_write_concatenated_array() {
        // Given
        let dir = TempDir::new().unwrap();
        let destination = dir.path().join("enrollments.json");
        let _stats = mock("GET", "/data-api/v1/dataset/two-pages/data/stats")
            .with_status(200)
            .with_body(r#"{ "total_rows": 6000, "found_rows": 6000 }"#)
            .create();
        let first = mock("GET", "/data-api/v1/dataset/two-pages/data")
            .match_query(page("0"))
            .with_status(200)
            .with_body(r#"[{ "npi": "1" }, { "npi": "2" }]"#)
            .expect(1)
            .create();
        let second = mock("GET", "/data-api/v1/dataset/two-pages/data")
            .match_query(page("5000"))
            .with_status(200)
            .with_body(r#"[{ "npi": "3" }]"#)
            .expect(1)
            .create();

        // When
        let transfer = fetch_table(&test_context(dir.path()), "two-pages", &destination, "enrollments")
            .await
            .unwrap();

        // Then
        first.assert();
        second.assert();
        let written = std::fs::read(&destination).unwrap();
        assert_eq!(transfer, Transfer::Downloaded { bytes: written.len() as u64 });
        assert_eq!(
            serde_json::from_slice::<Value>(&written).unwrap(),
            json!([{ "npi": "1" }, { "npi": "2" }, { "npi": "3" }])
        );
    }

    #[tokio::test]
    async fn given_delay_when_fetch_table_then_pause_after_every_page() {
        // Given
        let dir = TempDir::new().unwrap();
        let destination = dir.path().join("paced.json");
        let _stats = mock("GET", "/data-api/v1/dataset/paced/data/stats")
            .with_status(200)
            .with_body(r#"{ "total_rows": 10000 }"#)
            .create();
        let _first = mock("GET", "/data-api/v1/dataset/paced/data")
            .match_query(page("0"))
            .with_body(r#"[{ "row": 1 }]"#)
            .create();
        let _second = mock("GET", "/data-api/v1/dataset/paced/data")
            .match_query(page("5000"))
            .with_body(r#"[{ "row": 2 }]"#)
            .create();
        let mut context = test_context(dir.path());
        context.config.delay = Duration::from_millis(200);

        // When
        let started = Instant::now();
        fetch_table(&context, "paced", &destination, "paced").await.unwrap();

        // Then
        assert!(started.elapsed() >= Duration::from_millis(400));
    }

    #[tokio::test]
    async fn given_empty_table_when_fetch_table_then_write_empty_array_without_paging() {
        // Given
        let dir = TempDir::new().unwrap();
        let destination = dir.path().join("empty.json");
        let _stats = mock("GET", "/data-api/v1/dataset/empty/data/stats")
            .with_status(200)
            .with_body(r#"{ "total_rows": 0 }"#)
            .create();
        let pages = mock("GET", "/data-api/v1/dataset/empty/data")
            .match_query(Matcher::Any)
            .expect(0)
            .create();

        // When
        fetch_table(&test_context(dir.path()), "empty", &destination, "empty").await.unwrap();

        // Then
        pages.assert();
        assert_eq!(std::fs::read_to_string(&destination).unwrap(), "[]");
    }

    #[tokio::test]
    async fn given_failing_second_page_when_fetch_table_then_error_and_no_file() {
        // Given
        let dir = TempDir::new().unwrap();
        let destination = dir.path().join("broken.json");
        let _stats = mock("GET", "/data-api/v1/dataset/broken/data/stats")
            .with_status(200)
            .with_body(r#"{ "total_rows": 12000 }"#)
            .create();
        let _first = mock("GET", "/data-api/v1/dataset/broken/data")
            .match_query(page("0"))
            .with_status(200)
            .with_body(r#"[{ "row": 1 }]"#)
            .create();
        let _second = mock("GET", "/data-api/v1/dataset/broken/data")
            .match_query(page("5000"))
            .with_status(500)
            .create();
        let third = mock("GET", "/data-api/v1/dataset/broken/data")
            .match_query(page("10000"))
            .expect(0)
            .create();

        // When
        let result = fetch_table(&test_context(dir.path()), "broken", &destination, "broken").await;

        // Then
        assert!(result.is_err());
        third.assert();
        assert!(!destination.exists());
        assert!(!dir.path().join("broken.json.part").exists());
    }

    #[tokio::test]
    async fn given_non_array_page_when_fetch_table_then_error() {
        // Given
        let dir = TempDir::new().unwrap();
        let destination = dir.path().join("object.json");
        let _stats = mock("GET", "/data-api/v1/dataset/object/data/stats")
            .with_status(200)
            .with_body(r#"{ "total_rows": 1 }"#)
            .create();
        let _page = mock("GET", "/data-api/v1/dataset/object/data")
            .match_query(page("0"))
            .with_status(200)
            .with_body(r#"{ "message": "rate limited" }"#)
            .create();

        // When
        let result = fetch_table(&test_context(dir.path()), "object", &destination, "object").await;

        // Then
        assert!(result.is_err());
        assert!(!destination.exists());
    }

    #[tokio::test]
    async fn given_existing_file_when_fetch_table_then_skip_without_request() {
        // Given
        let dir = TempDir::new().unwrap();
        let destination = dir.path().join("done.json");
        std::fs::write(&destination, "[]").unwrap();
        let stats = mock("GET", "/data-api/v1/dataset/done/data/stats").expect(0).create();

        // When
        let transfer = fetch_table(&test_context(dir.path()), "done", &destination, "done").await.unwrap();

        // Then
        assert_eq!(transfer, Transfer::Skipped { bytes: 2 });
        stats.assert();
    }
}
