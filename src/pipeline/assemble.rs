use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use console::style;
use serde_json::json;

use crate::config::Config;
use crate::fsutil;

/// Lay out the install directory: runtime, patched bundle, web assets, build
/// record, launch script. Each of those paths is overwritten; anything else
/// already in the directory is left alone.
pub fn assemble(
    install_dir: &Path,
    electron_dir: &Path,
    app_asar: &Path,
    worktree: &Path,
    bundle: &Path,
    config: &Config,
    installer: &Path,
) -> Result<u32, Box<dyn std::error::Error>> {
    fs::create_dir_all(install_dir)?;

    fsutil::replace_tree(electron_dir, &install_dir.join("electron"))?;

    let resources = install_dir.join("resources");
    fs::create_dir_all(&resources)?;
    fs::copy(app_asar, resources.join("app.asar"))?;

    let unpacked = PathBuf::from(format!("{}.unpacked", app_asar.display()));
    if unpacked.is_dir() {
        fsutil::replace_tree(&unpacked, &resources.join("app.asar.unpacked"))?;
    }

    let icns = bundle.join("Contents/Resources/Lumen.icns");
    if icns.is_file() {
        fs::copy(&icns, resources.join("lumen.icns"))?;
    }

    let build = build_number(worktree);
    fs::write(
        resources.join("build.json"),
        serde_json::to_string_pretty(&json!({ "buildNumber": build }))?,
    )?;

    let web = bundle.join("Contents/Resources/web");
    if web.is_dir() {
        fsutil::replace_tree(&web, &install_dir.join("content"))?;
    }

    let launcher = install_dir.join("lumen");
    fs::write(&launcher, generate_launcher(installer, config.disable_sandbox))?;
    fs::set_permissions(&launcher, fs::Permissions::from_mode(0o755))?;

    Ok(build)
}

/// The app's build number from package.json, accepting either a number or a
/// numeric string. Unreadable means build 0 and a warning; the updater then
/// simply offers the next release.
pub fn build_number(worktree: &Path) -> u32 {
    let parsed = fs::read_to_string(worktree.join("package.json"))
        .ok()
        .and_then(|content| serde_json::from_str::<serde_json::Value>(&content).ok())
        .and_then(|json| {
            let field = json.get("buildNumber")?.clone();
            field
                .as_u64()
                .or_else(|| field.as_str().and_then(|s| s.parse().ok()))
        })
        .and_then(|n| u32::try_from(n).ok());

    match parsed {
        Some(build) => build,
        None => {
            eprintln!(
                "{} no buildNumber in the app manifest, recording build 0",
                style("warning:").yellow().bold()
            );
            0
        }
    }
}

pub fn generate_launcher(installer: &Path, disable_sandbox: bool) -> String {
    let installer = installer.display();
    let sandbox = if disable_sandbox { " --no-sandbox" } else { "" };

    format!(
        r#"#!/usr/bin/env bash
# Generated by lumen-linux; rewritten on every install.
set -u
DIR="$(cd "$(dirname "${{BASH_SOURCE[0]}}")" && pwd)"
export LUMEN_INSTALLER="{installer}"
if ! pgrep -f "lumen-linux --agent" >/dev/null 2>&1; then
    "$LUMEN_INSTALLER" --agent >/dev/null 2>&1 &
fi
exec "$DIR/electron/electron" "$DIR/resources/app.asar"{sandbox} "$@"
"#
    )
}
