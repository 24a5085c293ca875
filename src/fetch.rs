use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;

use indicatif::ProgressBar;
use ureq::Agent;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

// generous enough for a multi-gigabyte DMG on a slow link, but a stalled
// server can never hang the pipeline forever
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30 * 60);

pub fn agent(global_timeout: Option<Duration>) -> Agent {
    Agent::new_with_config(
        Agent::config_builder()
            .user_agent(concat!("lumen-linux/", env!("CARGO_PKG_VERSION")))
            .timeout_connect(Some(CONNECT_TIMEOUT))
            .timeout_global(global_timeout)
            .build(),
    )
}

pub fn fetch_text(url: &str, timeout: Duration) -> Result<String, String> {
    let mut response = agent(Some(timeout))
        .get(url)
        .call()
        .map_err(|e| format!("failed to fetch {url}: {e}"))?;

    response
        .body_mut()
        .read_to_string()
        .map_err(|e| format!("failed to read {url}: {e}"))
}

/// Download `url` to `dest` with a byte progress bar and a bounded round
/// trip. The file is written next to `dest` and renamed into place, so a
/// failed download never leaves a partial file at the destination.
pub fn download(url: &str, dest: &Path, label: &str) -> Result<(), Box<dyn std::error::Error>> {
    download_with(url, dest, label, DOWNLOAD_TIMEOUT)
}

fn download_with(
    url: &str,
    dest: &Path,
    label: &str,
    timeout: Duration,
) -> Result<(), Box<dyn std::error::Error>> {
    let response = agent(Some(timeout))
        .get(url)
        .call()
        .map_err(|e| format!("failed to download {url}: {e}"))?;

    let total = response
        .headers()
        .get("content-length")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<u64>().ok());

    let bar = match total {
        Some(bytes) => ProgressBar::new(bytes),
        None => ProgressBar::new_spinner(),
    };
    bar.set_message(label.to_string());

    let parent = dest
        .parent()
        .ok_or("download destination has no parent directory")?;
    fs::create_dir_all(parent)?;

    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    let reader = response.into_body().into_reader();
    io::copy(&mut bar.wrap_read(reader), temp.as_file_mut())?;
    bar.finish_and_clear();

    temp.persist(dest)
        .map_err(|e| format!("failed to move download into place: {e}"))?;

    Ok(())
}
