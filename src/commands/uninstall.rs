use std::fs;
use std::io::{self, Write};

use console::style;

use crate::config;
use crate::pipeline::desktop;

pub fn execute() -> Result<(), Box<dyn std::error::Error>> {
    let config = config::load()?;
    let install_dir = config.install_dir_path();
    let cache_dir = config::cache_dir();

    if !install_dir.exists() && !cache_dir.exists() {
        println!("{}", style("Nothing to uninstall.").dim());
        return Ok(());
    }

    print!(
        "This removes the Lumen install, the download cache, and the desktop entry. Continue? [y/N] "
    );
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    if !matches!(answer.trim().to_lowercase().as_str(), "y" | "yes") {
        println!("{}", style("Aborted.").dim());
        return Ok(());
    }

    if install_dir.exists() {
        fs::remove_dir_all(&install_dir)?;
    }
    if cache_dir.exists() {
        fs::remove_dir_all(&cache_dir)?;
    }
    desktop::remove()?;

    println!("{} Lumen removed.", style("Done!").green().bold());

    Ok(())
}
