use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use console::style;

use crate::exec;

const ENTRY_NAME: &str = "lumen.desktop";

/// Register the install with the desktop environment: a launcher entry plus
/// whatever icon sizes the bundle's icns file yields.
pub fn install(install_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let applications = applications_dir()?;
    fs::create_dir_all(&applications)?;
    fs::write(applications.join(ENTRY_NAME), desktop_entry(install_dir))?;

    if let Err(e) = install_icons(install_dir) {
        eprintln!(
            "{} could not install icons: {e}",
            style("warning:").yellow().bold()
        );
    }
    refresh_database(&applications);

    Ok(())
}

pub fn remove() -> Result<(), Box<dyn std::error::Error>> {
    let applications = applications_dir()?;
    let entry = applications.join(ENTRY_NAME);
    if entry.exists() {
        fs::remove_file(&entry)?;
    }

    if let Ok(sizes) = fs::read_dir(hicolor_dir()?) {
        for size in sizes.flatten() {
            let icon = size.path().join("apps/lumen.png");
            if icon.exists() {
                fs::remove_file(icon)?;
            }
        }
    }
    refresh_database(&applications);

    Ok(())
}

pub fn desktop_entry(install_dir: &Path) -> String {
    let launcher = install_dir.join("lumen");

    format!(
        r#"[Desktop Entry]
Type=Application
Name=Lumen
Comment=Notes that stay with you
Exec={} %U
Icon=lumen
Terminal=false
Categories=Office;Utility;
StartupWMClass=Lumen
"#,
        launcher.display()
    )
}

/// Sizes come out of `icns2png -x` encoded in the file names, e.g.
/// `lumen_512x512x32.png`.
pub fn parse_icon_size(file_name: &str) -> Option<u32> {
    let stem = file_name.strip_suffix(".png")?;
    let dims = stem.rsplit('_').next()?;
    let mut parts = dims.split('x');

    let width: u32 = parts.next()?.parse().ok()?;
    let height: u32 = parts.next()?.parse().ok()?;

    (width == height).then_some(width)
}

fn install_icons(install_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let icns = install_dir.join("resources/lumen.icns");
    if !icns.is_file() {
        return Ok(());
    }
    if !exec::on_path("icns2png") {
        println!(
            "{}",
            style("icns2png not found, skipping icon extraction.").dim()
        );
        return Ok(());
    }

    let scratch = tempfile::TempDir::new()?;
    let mut cmd = Command::new("icns2png");
    cmd.arg("-x")
        .arg("-o")
        .arg(scratch.path())
        .arg(&icns);
    exec::run_tool("icons", &mut cmd)?;

    let hicolor = hicolor_dir()?;
    for entry in fs::read_dir(scratch.path())?.flatten() {
        let name = entry.file_name().to_string_lossy().into_owned();
        let Some(size) = parse_icon_size(&name) else {
            continue;
        };

        let dest_dir = hicolor.join(format!("{size}x{size}/apps"));
        fs::create_dir_all(&dest_dir)?;
        fs::copy(entry.path(), dest_dir.join("lumen.png"))?;
    }

    Ok(())
}

fn refresh_database(applications: &Path) {
    if exec::on_path("update-desktop-database") {
        Command::new("update-desktop-database")
            .arg(applications)
            .output()
            .ok();
    }
}

pub fn applications_dir() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let home = dirs::home_dir().ok_or("cannot determine the home directory")?;
    Ok(home.join(".local/share/applications"))
}

fn hicolor_dir() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let home = dirs::home_dir().ok_or("cannot determine the home directory")?;
    Ok(home.join(".local/share/icons/hicolor"))
}
