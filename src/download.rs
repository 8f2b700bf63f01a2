use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use futures::{pin_mut, Stream, StreamExt};
use indicatif::ProgressBar;
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tracing::{error, info};

use crate::config::{Context, TRANSFER_TIMEOUT};
use crate::error::Error;
use crate::progress::TransferBarHelper;
use crate::stats::Transfer;

const PART_SUFFIX: &str = ".part";

/// Streams `url` into `destination`.
///
/// An existing destination counts as already downloaded and is never requested again. A failed
/// transfer leaves nothing behind at `destination`, so the next run retries it.
pub async fn fetch_file(
    context: &Context,
    url: &str,
    destination: &Path,
    description: &str,
) -> Result<Transfer, Error> {
    if let Some(skipped) = existing(destination).await {
        return Ok(skipped);
    }

    info!("Downloading: {description}");
    match download(context, url, destination, description).await {
        Ok(bytes) => {
            info!("Downloaded: {name} ({bytes} bytes)", name = file_name(destination));
            context.pause().await;
            Ok(Transfer::Downloaded { bytes })
        }
        Err(e) => {
            error!("Error downloading {url}: {e}");
            remove_partial(destination).await;
            Err(e)
        }
    }
}

async fn download(context: &Context, url: &str, destination: &Path, description: &str) -> Result<u64, Error> {
    let response = context
        .client
        .get(url)
        .timeout(TRANSFER_TIMEOUT)
        .send()
        .await?
        .error_for_status()?;

    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent).await?;
    }

    let bar = TransferBarHelper::create(description.to_string(), response.content_length())?;
    let written = save_stream(destination, response.bytes_stream(), &bar).await;
    bar.finish_and_clear();
    written
}

/// Reports an already present destination as [`Transfer::Skipped`].
pub(crate) async fn existing(destination: &Path) -> Option<Transfer> {
    let metadata = fs::metadata(destination).await.ok()?;
    info!(
        "Skipping (already exists): {name} ({bytes} bytes)",
        name = file_name(destination),
        bytes = metadata.len()
    );
    Some(Transfer::Skipped { bytes: metadata.len() })
}

/// Writes all chunks of `stream` to a `.part` sibling of `destination` and moves it into place
/// once the stream is exhausted. Returns the number of bytes written.
pub(crate) async fn save_stream<S, B, E>(destination: &Path, stream: S, bar: &ProgressBar) -> Result<u64, Error>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    Error: From<E>,
{
    let part = part_path(destination);
    let written = match write_chunks(&part, stream, bar).await {
        Ok(written) => fs::rename(&part, destination).await.map(|_| written).map_err(Error::IoError),
        Err(e) => Err(e),
    };

    if written.is_err() {
        remove_if_present(&part).await;
    }
    written
}

async fn write_chunks<S, B, E>(path: &Path, stream: S, bar: &ProgressBar) -> Result<u64, Error>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    Error: From<E>,
{
    pin_mut!(stream);
    let mut file = File::create(path).await?;
    let mut written = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        let chunk = chunk.as_ref();
        file.write_all(chunk).await?;
        written += chunk.len() as u64;
        bar.inc(chunk.len() as u64);
    }

    file.flush().await?;
    Ok(written)
}

/// Removes whatever a failed attempt left at `destination`, including its `.part` file.
pub(crate) async fn remove_partial(destination: &Path) {
    remove_if_present(&part_path(destination)).await;
    remove_if_present(destination).await;
}

async fn remove_if_present(path: &Path) {
    match fs::remove_file(path).await {
        Ok(()) => info!("Removed partial download {}", path.display()),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => error!("Could not remove partial download {}: {e}", path.display()),
    }
}

fn part_path(destination: &Path) -> PathBuf {
    let mut name = destination.file_name().map(OsString::from).unwrap_or_default();
    name.push(PART_SUFFIX);
    destination.with_file_name(name)
}

pub(crate) fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
