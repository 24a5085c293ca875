use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use console::style;

use crate::config::Config;
use crate::fetch;
use crate::pipeline::fingerprint;

const MANIFEST_TIMEOUT: Duration = Duration::from_secs(15);
const BUNDLE_NAME: &str = "Lumen.dmg";

/// Resolve the source bundle: an explicit local path wins, then a cached
/// download, then a fresh fetch verified against the published checksums.
pub fn resolve(
    config: &Config,
    explicit: Option<&Path>,
    cached: &Path,
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    if let Some(path) = explicit {
        if !path.is_file() {
            return Err(format!("bundle not found at {}", path.display()).into());
        }
        return Ok(path.to_path_buf());
    }

    if cached.is_file() {
        println!("{}", style("Using the cached download.").dim());
        return Ok(cached.to_path_buf());
    }

    fetch::download(&config.bundle_url, cached, BUNDLE_NAME)?;
    verify_checksum(config, cached)?;

    Ok(cached.to_path_buf())
}

/// Checksum verification is best-effort on the manifest side: an unreachable
/// manifest downgrades to a warning, an actual mismatch is fatal and removes
/// the download.
fn verify_checksum(config: &Config, bundle: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let manifest = match fetch::fetch_text(&config.checksum_url, MANIFEST_TIMEOUT) {
        Ok(text) => text,
        Err(e) => {
            eprintln!(
                "{} checksum manifest unavailable, continuing unverified: {e}",
                style("warning:").yellow().bold()
            );
            return Ok(());
        }
    };

    let Some(expected) = expected_checksum(&manifest, BUNDLE_NAME) else {
        eprintln!(
            "{} no entry for {BUNDLE_NAME} in the checksum manifest, continuing unverified",
            style("warning:").yellow().bold()
        );
        return Ok(());
    };

    let actual = fingerprint::sha256_file(bundle)?;
    if actual != expected {
        fs::remove_file(bundle).ok();
        return Err(format!(
            "checksum mismatch for {BUNDLE_NAME}: expected {expected}, got {actual}"
        )
        .into());
    }

    Ok(())
}

/// Scan a `sha256sum`-style manifest for one file's digest. Handles the
/// binary-mode `*` prefix and paths.
pub fn expected_checksum(manifest: &str, name: &str) -> Option<String> {
    for line in manifest.lines() {
        let mut parts = line.split_whitespace();
        let (Some(hash), Some(file)) = (parts.next(), parts.next()) else {
            continue;
        };

        let file = file.trim_start_matches('*');
        if file == name || file.ends_with(&format!("/{name}")) {
            return Some(hash.to_ascii_lowercase());
        }
    }
    None
}
