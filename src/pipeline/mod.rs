use std::fs;
use std::path::Path;
use std::time::Duration;

use console::style;
use fs2::FileExt;
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::{self, Config};

pub mod asar;
pub mod assemble;
pub mod desktop;
pub mod doctor;
pub mod extract;
pub mod fingerprint;
pub mod inject;
pub mod rebuild;
pub mod runtime;
pub mod source;
pub mod stamp;
pub mod strip;

#[derive(Debug)]
pub enum Outcome {
    UpToDate,
    Installed {
        build: u32,
        electron: semver::Version,
    },
}

/// Run the conversion end to end. Fail-fast: the first stage error aborts the
/// run, and since the stamp is only written after everything else succeeded,
/// an aborted run is simply redone from scratch next time.
pub fn run(
    config: &Config,
    explicit: Option<&Path>,
    force: bool,
) -> Result<Outcome, Box<dyn std::error::Error>> {
    let install_dir = config.install_dir_path();
    fs::create_dir_all(&install_dir)?;
    let _lock = acquire_lock(&install_dir)?;

    let cache_dir = config::cache_dir();
    fs::create_dir_all(&cache_dir)?;

    let bundle = step("Resolving the source bundle", || {
        source::resolve(config, explicit, &config::cached_bundle_path())
    })?;

    let scratch = tempfile::tempdir_in(&cache_dir)?;

    let app_bundle = step("Extracting the disk image", || {
        extract::extract_dmg(&bundle, scratch.path())
    })?;

    let electron = runtime::detect_version(&app_bundle);
    let arch = runtime::arch_label()?;
    let fingerprint = fingerprint::compute(&bundle, &electron, arch)?;

    if !force && stamp::read(&install_dir).as_deref() == Some(fingerprint.as_str()) {
        return Ok(Outcome::UpToDate);
    }

    let worktree = scratch.path().join("app");
    step("Unpacking the application archive", || {
        asar::unpack(&app_bundle, &worktree)
    })?;

    step("Removing macOS-only components", || {
        strip::strip(&worktree).map(|_| ())
    })?;

    step("Rebuilding native modules", || {
        rebuild::rebuild_all(&worktree, &electron, arch, scratch.path())
    })?;

    step("Injecting the update bridge", || inject::inject(&worktree))?;

    let app_asar = scratch.path().join("app.asar");
    step("Repacking the application archive", || {
        asar::pack(&worktree, &app_asar)
    })?;

    let electron_dir = scratch.path().join("electron");
    step("Fetching the Electron runtime", || {
        runtime::acquire(&electron, arch, &cache_dir, &electron_dir)
    })?;

    let installer = std::env::current_exe()?;
    let build = step("Assembling the install", || {
        assemble::assemble(
            &install_dir,
            &electron_dir,
            &app_asar,
            &worktree,
            &app_bundle,
            config,
            &installer,
        )
    })?;

    stamp::write(&install_dir, &fingerprint)?;

    Ok(Outcome::Installed { build, electron })
}

/// One pipeline run at a time per install directory. A held lock means
/// another run is in flight, which is an error rather than a wait.
fn acquire_lock(install_dir: &Path) -> Result<fs::File, Box<dyn std::error::Error>> {
    let lock = fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(false)
        .open(install_dir.join(".lock"))?;

    lock.try_lock_exclusive()
        .map_err(|_| format!("another install is already running for {}", install_dir.display()))?;

    Ok(lock)
}

fn step<T>(
    label: &str,
    f: impl FnOnce() -> Result<T, Box<dyn std::error::Error>>,
) -> Result<T, Box<dyn std::error::Error>> {
    let spinner = ProgressBar::new_spinner().with_message(label.to_string());
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.enable_steady_tick(Duration::from_millis(80));

    let result = f();
    spinner.finish_and_clear();

    match &result {
        Ok(_) => println!("{} {label}", style("✓").green()),
        Err(_) => println!("{} {label}", style("✗").red()),
    }

    result
}
