use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Copy a directory tree, preserving file permissions and symlinks.
pub fn copy_tree(src: &Path, dst: &Path) -> io::Result<()> {
    fs::create_dir_all(dst)?;

    let mut stack: Vec<(PathBuf, PathBuf)> = vec![(src.to_path_buf(), dst.to_path_buf())];

    while let Some((from, to)) = stack.pop() {
        for entry in fs::read_dir(&from)? {
            let entry = entry?;
            let target = to.join(entry.file_name());
            let ft = entry.file_type()?;

            if ft.is_symlink() {
                let link = fs::read_link(entry.path())?;
                if target.exists() || target.is_symlink() {
                    fs::remove_file(&target)?;
                }
                std::os::unix::fs::symlink(link, &target)?;
            } else if ft.is_dir() {
                fs::create_dir_all(&target)?;
                stack.push((entry.path(), target));
            } else {
                fs::copy(entry.path(), &target)?;
            }
        }
    }

    Ok(())
}

/// Replace `dst` with a copy of `src`, removing whatever was there before.
pub fn replace_tree(src: &Path, dst: &Path) -> io::Result<()> {
    if dst.exists() {
        fs::remove_dir_all(dst)?;
    }
    copy_tree(src, dst)
}
