use console::style;

use crate::config;
use crate::pipeline::desktop;

pub fn execute() -> Result<(), Box<dyn std::error::Error>> {
    let config = config::load()?;
    let install_dir = config.install_dir_path();

    if !install_dir.join("lumen").is_file() {
        return Err(format!(
            "Lumen is not installed at {}; run lumen-linux first",
            install_dir.display()
        )
        .into());
    }

    desktop::install(&install_dir)?;
    println!("{} Desktop entry refreshed.", style("Done!").green().bold());

    Ok(())
}
