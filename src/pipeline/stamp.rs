use std::fs;
use std::path::{Path, PathBuf};

use crate::pipeline::fingerprint::Fingerprint;

pub fn path(install_dir: &Path) -> PathBuf {
    install_dir.join(".stamp")
}

pub fn read(install_dir: &Path) -> Option<String> {
    fs::read_to_string(path(install_dir))
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Written only after every pipeline stage has succeeded, and atomically, so
/// a crashed run can never leave a stamp pointing at a partial install.
pub fn write(install_dir: &Path, fingerprint: &Fingerprint) -> Result<(), Box<dyn std::error::Error>> {
    fs::create_dir_all(install_dir)?;

    let mut temp = tempfile::NamedTempFile::new_in(install_dir)?;
    use std::io::Write;
    writeln!(temp, "{}", fingerprint.as_str())?;
    temp.persist(path(install_dir))
        .map_err(|e| format!("failed to write the install stamp: {e}"))?;

    Ok(())
}
