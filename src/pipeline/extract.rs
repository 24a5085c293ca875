use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use console::style;

use crate::exec;

pub fn extract_dmg(dmg: &Path, scratch: &Path) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let out = scratch.join("dmg");
    fs::create_dir_all(&out)?;

    let mut cmd = Command::new("7z");
    cmd.arg("x")
        .arg("-y")
        .arg(format!("-o{}", out.display()))
        .arg(dmg);
    exec::run_tool("extract", &mut cmd)?;

    find_bundle(&out)
}

/// Locate the application bundle in the extracted tree: a directory named
/// `Lumen*.app`, searched a couple of levels deep since DMGs usually nest the
/// app inside a volume directory. Several matches pick the first in sorted
/// order, with a warning; that situation is ambiguous, not supported.
pub fn find_bundle(root: &Path) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let mut matches = collect_bundles(root, 2);
    matches.sort();

    match matches.len() {
        0 => Err(format!("no Lumen.app bundle found under {}", root.display()).into()),
        1 => Ok(matches.remove(0)),
        _ => {
            eprintln!(
                "{} several app bundles found, using {}",
                style("warning:").yellow().bold(),
                matches[0].display()
            );
            Ok(matches.remove(0))
        }
    }
}

fn collect_bundles(root: &Path, depth: usize) -> Vec<PathBuf> {
    let mut found = Vec::new();
    let Ok(entries) = fs::read_dir(root) else {
        return found;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }

        let name = entry.file_name().to_string_lossy().into_owned();
        if is_bundle_name(&name) {
            found.push(path);
        } else if depth > 0 {
            found.extend(collect_bundles(&path, depth - 1));
        }
    }

    found
}

pub fn is_bundle_name(name: &str) -> bool {
    name.starts_with("Lumen") && name.ends_with(".app")
}
