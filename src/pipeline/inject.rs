use std::fs;
use std::path::Path;

pub const MODULE_FILE: &str = "lumen-linux-updater.js";
const DIRECTIVE: &str = "require(\"./lumen-linux-updater.js\");";
const MODULE_SOURCE: &str = include_str!("../../assets/lumen-linux-updater.js");

/// Drop the updater bridge into the working tree and make the app load it
/// before any of its own code. Idempotent on forced re-runs: the module file
/// is always overwritten and the load directive is written at most once.
pub fn inject(worktree: &Path) -> Result<(), Box<dyn std::error::Error>> {
    fs::write(worktree.join(MODULE_FILE), MODULE_SOURCE)?;

    let entry = entry_point(worktree)?;
    let entry_path = worktree.join(&entry);
    let content = fs::read_to_string(&entry_path)
        .map_err(|e| format!("cannot read entry point {entry}: {e}"))?;

    fs::write(&entry_path, prepend_directive(&content))?;

    Ok(())
}

/// The file named by package.json `main`, with node's default when the field
/// is absent.
pub fn entry_point(worktree: &Path) -> Result<String, Box<dyn std::error::Error>> {
    let manifest = worktree.join("package.json");
    let content = fs::read_to_string(&manifest)
        .map_err(|e| format!("cannot read {}: {e}", manifest.display()))?;
    let json: serde_json::Value = serde_json::from_str(&content)
        .map_err(|e| format!("malformed {}: {e}", manifest.display()))?;

    Ok(json
        .get("main")
        .and_then(|v| v.as_str())
        .unwrap_or("index.js")
        .to_string())
}

pub fn prepend_directive(content: &str) -> String {
    if content.lines().any(|line| line.trim() == DIRECTIVE) {
        return content.to_string();
    }
    format!("{DIRECTIVE}\n{content}")
}
