//! Meeting actions: open URLs, copy to clipboard.

use tracing::info;

use crate::cli::OutputArgs;
use crate::error::{ClientError, ClientResult};

/// Opens `url` in the default browser.
pub fn open_url(url: &str) -> ClientResult<()> {
    info!(url = %url, "opening meeting URL");
    open::that(url).map_err(|e| ClientError::Action(format!("failed to open URL: {}", e)))
}

/// Copies `url` to the clipboard.
pub fn copy_url(url: &str) -> ClientResult<()> {
    info!(url = %url, "copying meeting URL to clipboard");

    let mut clipboard = arboard::Clipboard::new()
        .map_err(|e| ClientError::Action(format!("failed to access clipboard: {}", e)))?;

    clipboard
        .set_text(url)
        .map_err(|e| ClientError::Action(format!("failed to copy to clipboard: {}", e)))
}

/// Runs the actions requested by `--copy` and `--open`.
///
/// Both are attempted; the first failure is returned.
pub fn run_actions(url: &str, output: &OutputArgs) -> ClientResult<()> {
    let copied = if output.copy { copy_url(url) } else { Ok(()) };
    let opened = if output.open { open_url(url) } else { Ok(()) };
    if copied.is_ok() && output.copy && !output.json {
        eprintln!("Meet URL copied to clipboard.");
    }
    copied.and(opened)
}
