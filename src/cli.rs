use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "lumen-linux", version)]
#[command(about = "Install and update the macOS Lumen app on Linux")]
pub struct Cli {
    /// Path to a local Lumen disk image (skips the download)
    pub bundle: Option<PathBuf>,

    /// Rebuild even if the installation is already up to date
    #[arg(long)]
    pub force: bool,

    /// Regenerate the desktop entry and icon, nothing else
    #[arg(long, conflicts_with_all = ["bundle", "force", "uninstall", "agent"])]
    pub fix_desktop: bool,

    /// Remove the installation, desktop entry, and download cache
    #[arg(long, conflicts_with_all = ["bundle", "force", "agent"])]
    pub uninstall: bool,

    /// Run the background update agent (started by the launch script)
    #[arg(long, hide = true)]
    pub agent: bool,
}
