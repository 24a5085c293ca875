pub mod feed;
pub mod ipc;
pub mod scheduler;
pub mod surface;
pub mod trigger;

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use serde::Deserialize;

use surface::{Dialogs, Surface};

pub struct CheckOutcome {
    pub available: bool,
}

type InstallFn = Box<dyn Fn() + Send + Sync>;

/// Update checker for a running Lumen session. The local build is resolved
/// once at construction; a reinstall replaces the whole process, so it never
/// needs to be re-read. The available flag only ever widens from false to
/// true within a session.
pub struct Updater {
    appcast_url: String,
    local_build: u32,
    available: AtomicBool,
    surfaces: Mutex<Vec<Arc<dyn Surface>>>,
    dialogs: Arc<dyn Dialogs>,
    install: InstallFn,
}

#[derive(Deserialize)]
struct BuildRecord {
    #[serde(rename = "buildNumber")]
    build_number: u32,
}

pub(crate) fn update_available(local: u32, remote: u32) -> bool {
    // a downgrade is never offered
    remote > local
}

impl Updater {
    pub fn new(
        appcast_url: String,
        local_build: u32,
        dialogs: Arc<dyn Dialogs>,
        install: InstallFn,
    ) -> Self {
        Self {
            appcast_url,
            local_build,
            available: AtomicBool::new(false),
            surfaces: Mutex::new(vec![]),
            dialogs,
            install,
        }
    }

    /// Read the installed build number from `resources/build.json`. Any
    /// failure means build 0, so a broken record offers every update instead
    /// of blocking startup.
    pub fn local_build_from(install_dir: &Path) -> u32 {
        let path = install_dir.join("resources/build.json");

        fs::read_to_string(&path)
            .ok()
            .and_then(|content| serde_json::from_str::<BuildRecord>(&content).ok())
            .map_or(0, |record| record.build_number)
    }

    pub fn local_build(&self) -> u32 {
        self.local_build
    }

    pub fn register_surface(&self, surface: Arc<dyn Surface>) {
        let mut surfaces = self.surfaces.lock().unwrap_or_else(|p| p.into_inner());

        // surfaces registered after the transition still learn about it
        if self.is_available() {
            surface.update_ready_changed(true);
        }
        surfaces.push(surface);
    }

    /// Drop a surface that will no longer receive pushes. Clients come and go
    /// with every bridge connection; holding on to a dead one would leak its
    /// stream.
    pub fn unregister_surface(&self, surface: &Arc<dyn Surface>) {
        let mut surfaces = self.surfaces.lock().unwrap_or_else(|p| p.into_inner());
        surfaces.retain(|s| !Arc::ptr_eq(s, surface));
    }

    #[cfg(test)]
    pub(crate) fn surface_count(&self) -> usize {
        self.surfaces.lock().unwrap_or_else(|p| p.into_inner()).len()
    }

    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    pub fn request_install(&self) {
        (self.install)();
    }

    /// One update check. Never panics and never lets a failure escape: every
    /// outcome resolves to a return value plus, when not silent, exactly one
    /// dialog. Prompt policy: every non-silent positive result prompts, not
    /// just the transitioning one.
    pub fn check(&self, silent: bool) -> CheckOutcome {
        let remote = match feed::fetch_remote_build(&self.appcast_url) {
            Ok(build) => build,
            Err(e) => {
                if !silent {
                    self.dialogs.error(&format!("Could not check for updates: {e}"));
                }
                return CheckOutcome { available: false };
            }
        };

        let available = update_available(self.local_build, remote);

        if available {
            let transitioned = self
                .available
                .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
                .is_ok();
            if transitioned {
                self.broadcast(true);
            }

            if !silent {
                let message = format!(
                    "Lumen build {remote} is available (installed: {}). Install and restart now?",
                    self.local_build
                );
                if self.dialogs.confirm(&message) {
                    self.request_install();
                }
            }
        } else if !silent {
            self.dialogs.info("Lumen is up to date.");
        }

        CheckOutcome { available }
    }

    fn broadcast(&self, available: bool) {
        let surfaces = self.surfaces.lock().unwrap_or_else(|p| p.into_inner());
        for surface in surfaces.iter() {
            surface.update_ready_changed(available);
        }
    }
}
