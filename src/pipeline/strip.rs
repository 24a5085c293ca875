use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Modules removed wholesale: the Sparkle bridge only works against the macOS
/// updater framework that the conversion strips out.
pub const STRIP_DIRS: &[&str] = &["node_modules/@lumen/mac-updater"];

/// Remove everything in the working tree that cannot run on Linux: the listed
/// macOS-only modules plus every compiled addon (those are Mach-O binaries
/// and get rebuilt for the target in the next stage).
pub fn strip(worktree: &Path) -> Result<usize, Box<dyn std::error::Error>> {
    let mut removed = 0usize;

    for rel in STRIP_DIRS {
        let path = worktree.join(rel);
        if path.exists() {
            fs::remove_dir_all(&path)?;
            removed += 1;
        }
    }

    removed += remove_native_binaries(worktree)?;
    Ok(removed)
}

pub fn is_platform_locked(name: &str) -> bool {
    name.ends_with(".node")
}

fn remove_native_binaries(root: &Path) -> io::Result<usize> {
    let mut removed = 0usize;
    let mut stack: Vec<PathBuf> = vec![root.to_path_buf()];

    while let Some(dir) = stack.pop() {
        let Ok(entries) = fs::read_dir(&dir) else {
            continue;
        };

        for entry in entries.flatten() {
            let Ok(ft) = entry.file_type() else {
                continue;
            };

            if ft.is_dir() {
                stack.push(entry.path());
            } else if is_platform_locked(&entry.file_name().to_string_lossy()) {
                fs::remove_file(entry.path())?;
                removed += 1;
            }
        }
    }

    Ok(removed)
}
