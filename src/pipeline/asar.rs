use std::path::Path;
use std::process::Command;

use crate::exec;
use crate::fsutil;

const APP_ASAR: &str = "Contents/Resources/app.asar";

/// Extract the bundle's application archive into a working tree and merge the
/// shipped `app.asar.unpacked` binaries back over it, so the tree is complete
/// before patching.
pub fn unpack(bundle: &Path, worktree: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let archive = bundle.join(APP_ASAR);
    if !archive.is_file() {
        return Err(format!("no app.asar inside {}", bundle.display()).into());
    }

    let mut cmd = Command::new("asar");
    cmd.arg("extract").arg(&archive).arg(worktree);
    exec::run_tool("unpack", &mut cmd)?;

    let unpacked = bundle.join(format!("{APP_ASAR}.unpacked"));
    if unpacked.is_dir() {
        fsutil::copy_tree(&unpacked, worktree)?;
    }

    Ok(())
}

/// Repack the working tree, leaving native binaries stored unpacked next to
/// the archive per Electron convention.
pub fn pack(worktree: &Path, dest: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new("asar");
    cmd.arg("pack")
        .arg(worktree)
        .arg(dest)
        .arg("--unpack")
        .arg("*.node");
    exec::run_tool("repack", &mut cmd)?;

    Ok(())
}
