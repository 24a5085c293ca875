use std::fs;
use std::io;
use std::path::Path;

use sha2::{Digest, Sha256};

/// Composite identity of the pipeline inputs: source bundle bytes, runtime
/// version, and host architecture. Equal fingerprints mean a fresh run would
/// reproduce the installed artifact byte for byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

pub fn compute(
    bundle: &Path,
    runtime: &semver::Version,
    arch: &str,
) -> Result<Fingerprint, Box<dyn std::error::Error>> {
    let digest = sha256_file(bundle)
        .map_err(|e| format!("failed to hash {}: {e}", bundle.display()))?;

    Ok(Fingerprint(format!("{digest}:{runtime}:{arch}")))
}

pub fn sha256_file(path: &Path) -> io::Result<String> {
    let mut file = fs::File::open(path)?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)?;

    Ok(format!("{:x}", hasher.finalize()))
}

pub fn sha256_bytes(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}
