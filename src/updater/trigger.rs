use std::fs;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;

use crate::updater::surface::Dialogs;

pub const RELAUNCH_DELAY: Duration = Duration::from_secs(1);

/// Fire-and-forget installation: spawn the pipeline detached with --force,
/// give it a moment to start, then relaunch the app. There is no readiness
/// handshake with the spawned pipeline; the fixed delay is a deliberate,
/// known-weak substitute.
pub struct InstallTrigger {
    installer: PathBuf,
    cached_bundle: PathBuf,
    launcher: PathBuf,
}

impl InstallTrigger {
    pub fn new(installer: PathBuf, cached_bundle: PathBuf, launcher: PathBuf) -> Self {
        Self {
            installer,
            cached_bundle,
            launcher,
        }
    }

    /// The pipeline entry point: the LUMEN_INSTALLER override from the launch
    /// environment, else this very binary (the agent and the installer are
    /// the same executable).
    pub fn resolve_installer(override_path: Option<String>) -> PathBuf {
        match override_path {
            Some(path) if !path.is_empty() => PathBuf::from(path),
            _ => std::env::current_exe().unwrap_or_else(|_| PathBuf::from("lumen-linux")),
        }
    }

    /// Spawn the pipeline subprocess. Does not wait for completion.
    pub fn launch_pipeline(&self) -> Result<(), String> {
        if !self.installer.exists() {
            return Err(format!(
                "installer not found at {}; cannot start the update",
                self.installer.display()
            ));
        }

        // force the pipeline to re-fetch the latest bundle
        let _ = fs::remove_file(&self.cached_bundle);

        Command::new(&self.installer)
            .arg("--force")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| format!("failed to start the installer: {e}"))?;

        Ok(())
    }

    /// Full trigger: pipeline, delay, relaunch, exit. Only the failure to
    /// locate or start the pipeline stops the relaunch.
    pub fn run(&self, dialogs: &dyn Dialogs) {
        if let Err(e) = self.launch_pipeline() {
            dialogs.error(&e);
            return;
        }

        thread::sleep(RELAUNCH_DELAY);
        let _ = Command::new(&self.launcher).spawn();
        std::process::exit(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::updater::surface::mock::RecordingDialogs;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    fn fake_installer(dir: &TempDir, marker: &str) -> PathBuf {
        let path = dir.path().join("installer.sh");
        fs::write(
            &path,
            format!("#!/bin/sh\necho \"$@\" > {}/{marker}\n", dir.path().display()),
        )
        .unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[test]
    fn resolve_prefers_the_override() {
        let path = InstallTrigger::resolve_installer(Some("/opt/bin/lumen-linux".to_string()));

        assert_eq!(path, PathBuf::from("/opt/bin/lumen-linux"));
    }

    #[test]
    fn resolve_ignores_empty_override() {
        let path = InstallTrigger::resolve_installer(Some(String::new()));

        assert_eq!(path, std::env::current_exe().unwrap());
    }

    #[test]
    fn resolve_falls_back_to_current_exe() {
        let path = InstallTrigger::resolve_installer(None);

        assert_eq!(path, std::env::current_exe().unwrap());
    }

    #[test]
    fn missing_installer_is_reported_with_its_path() {
        let dir = TempDir::new().unwrap();
        let trigger = InstallTrigger::new(
            dir.path().join("gone"),
            dir.path().join("Lumen.dmg"),
            dir.path().join("lumen"),
        );

        let err = trigger.launch_pipeline().unwrap_err();

        assert!(err.contains("gone"));
    }

    #[test]
    fn missing_installer_surfaces_an_error_dialog_and_nothing_else() {
        let dir = TempDir::new().unwrap();
        let dialogs = RecordingDialogs::answering(true);
        let trigger = InstallTrigger::new(
            dir.path().join("gone"),
            dir.path().join("Lumen.dmg"),
            dir.path().join("lumen"),
        );

        trigger.run(&dialogs);

        assert_eq!(dialogs.errors.lock().unwrap().len(), 1);
    }

    #[test]
    fn launch_spawns_installer_with_force() {
        let dir = TempDir::new().unwrap();
        let installer = fake_installer(&dir, "spawned");
        let trigger = InstallTrigger::new(
            installer,
            dir.path().join("Lumen.dmg"),
            dir.path().join("lumen"),
        );

        trigger.launch_pipeline().unwrap();
        thread::sleep(Duration::from_millis(200));

        let args = fs::read_to_string(dir.path().join("spawned")).unwrap();
        assert_eq!(args.trim(), "--force");
    }

    #[test]
    fn launch_deletes_the_cached_bundle() {
        let dir = TempDir::new().unwrap();
        let installer = fake_installer(&dir, "spawned");
        let cached = dir.path().join("Lumen.dmg");
        fs::write(&cached, "stale dmg").unwrap();

        let trigger = InstallTrigger::new(installer, cached.clone(), dir.path().join("lumen"));
        trigger.launch_pipeline().unwrap();

        assert!(!cached.exists());
    }

    #[test]
    fn absent_cached_bundle_is_not_an_error() {
        let dir = TempDir::new().unwrap();
        let installer = fake_installer(&dir, "spawned");
        let trigger = InstallTrigger::new(
            installer,
            dir.path().join("Lumen.dmg"),
            dir.path().join("lumen"),
        );

        assert!(trigger.launch_pipeline().is_ok());
    }
}
