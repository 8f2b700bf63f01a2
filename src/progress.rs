use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::error::Error;

pub struct SpinnerHelper;

impl SpinnerHelper {
  pub fn create(message: String) -> Result<ProgressBar, Error> {
    let spinner = ProgressBar::new_spinner();
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner.set_style(
      ProgressStyle::default_spinner()
        // For more spinners check out the cli-spinners project:
        // https://github.com/sindresorhus/cli-spinners/blob/master/spinners.json
        .tick_strings(&[
          "□ □ □ □ □",
          "■ □ □ □ □",
          "□ ■ □ □ □",
          "□ □ ■ □ □",
          "□ □ □ ■ □",
          "□ □ □ □ ■",
          "■ ■ ■ ■ ■",
        ])
        .template("{spinner:.blue} {msg}")?,
    );
    spinner.set_message(message);
    Ok(spinner)
  }
}

pub struct TransferBarHelper;

impl TransferBarHelper {
  /// Byte progress bar for a streamed body. Falls back to a byte counting spinner when the
  /// server does not announce a content length.
  pub fn create(message: String, content_length: Option<u64>) -> Result<ProgressBar, Error> {
    let bar = match content_length {
      Some(length) => {
        let bar = ProgressBar::new(length);
        bar.set_style(
          ProgressStyle::default_bar()
            .template("{msg} [{bar:30.blue}] {bytes}/{total_bytes} ({bytes_per_sec})")?
            .progress_chars("■■□"),
        );
        bar
      }
      None => {
        let bar = ProgressBar::new_spinner();
        bar.set_style(ProgressStyle::default_spinner().template("{spinner:.blue} {msg} {bytes}")?);
        bar
      }
    };
    bar.set_message(message);
    Ok(bar)
  }
}
