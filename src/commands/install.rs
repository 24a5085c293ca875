use std::path::Path;

use console::style;

use crate::config;
use crate::pipeline::{self, Outcome, desktop, doctor};

pub fn execute(bundle: Option<&Path>, force: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = config::load()?;
    let install_dir = config.install_dir_path();

    if unsafe { libc::geteuid() } == 0 {
        eprintln!(
            "{} running as root; the install will land in root's home directory",
            style("warning:").yellow().bold()
        );
    }

    doctor::check_tools()?;

    match pipeline::run(&config, bundle, force)? {
        Outcome::UpToDate => {
            println!("{}", style("Already up to date.").dim());
        }
        Outcome::Installed { build, electron } => {
            if let Err(e) = desktop::install(&install_dir) {
                eprintln!(
                    "{} desktop integration failed: {e}",
                    style("warning:").yellow().bold()
                );
            }

            println!(
                "\n{} Lumen build {build} (Electron {electron}) installed to {}",
                style("Done!").green().bold(),
                style(install_dir.display()).cyan()
            );
            println!(
                "Launch it from your app menu or run {}",
                style(install_dir.join("lumen").display()).cyan()
            );
        }
    }

    Ok(())
}
