use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use console::style;
use semver::Version;

use crate::exec;
use crate::fsutil;

/// Native dependencies that ship compiled for macOS and must be rebuilt
/// against the Linux Electron ABI.
pub const NATIVE_MODULES: &[&str] = &["better-sqlite3", "keytar"];

const HEADERS_URL: &str = "https://electronjs.org/headers";

/// Rebuild each native module the app actually ships, in an isolated build
/// directory. The extracted tree lacks full build sources, so building
/// in-place is never attempted; the compiled module replaces the original
/// wholesale.
pub fn rebuild_all(
    worktree: &Path,
    electron: &Version,
    arch: &str,
    build_root: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    for name in NATIVE_MODULES {
        let installed = worktree.join("node_modules").join(name);
        let Some(version) = module_version(worktree, name)? else {
            println!("{}", style(format!("{name} not present, skipping.")).dim());
            continue;
        };

        let built = build_one(name, &version, electron, arch, build_root)?;
        fsutil::replace_tree(&built, &installed)?;
    }

    Ok(())
}

/// Version pinned by the app, from the module's own package.json. Absent
/// module means nothing to rebuild.
pub fn module_version(
    worktree: &Path,
    name: &str,
) -> Result<Option<String>, Box<dyn std::error::Error>> {
    let manifest = worktree.join("node_modules").join(name).join("package.json");
    if !manifest.is_file() {
        return Ok(None);
    }

    let content = fs::read_to_string(&manifest)?;
    let json: serde_json::Value = serde_json::from_str(&content)
        .map_err(|e| format!("malformed {}: {e}", manifest.display()))?;

    json.get("version")
        .and_then(|v| v.as_str())
        .map(|v| Some(v.to_string()))
        .ok_or_else(|| format!("no version field in {}", manifest.display()).into())
}

fn build_one(
    name: &str,
    version: &str,
    electron: &Version,
    arch: &str,
    build_root: &Path,
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let build_dir = build_root.join(format!("rebuild-{name}"));
    if build_dir.exists() {
        fs::remove_dir_all(&build_dir)?;
    }
    fs::create_dir_all(&build_dir)?;
    fs::write(build_dir.join("package.json"), "{ \"private\": true }\n")?;

    let mut cmd = Command::new("npm");
    cmd.current_dir(&build_dir)
        .arg("install")
        .arg(format!("{name}@{version}"))
        .args(["--no-audit", "--no-fund", "--loglevel=error"])
        .env("npm_config_runtime", "electron")
        .env("npm_config_target", electron.to_string())
        .env("npm_config_disturl", HEADERS_URL)
        .env("npm_config_arch", arch)
        .env("npm_config_build_from_source", "true");
    exec::run_tool("rebuild", &mut cmd)?;

    let built = build_dir.join("node_modules").join(name);
    if !built.is_dir() {
        return Err(format!("rebuild of {name}@{version} produced no module directory").into());
    }

    Ok(built)
}
