use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use crate::config;
use crate::updater::ipc::{self, Dispatcher};
use crate::updater::surface::{ToastSurface, ZenityDialogs};
use crate::updater::trigger::InstallTrigger;
use crate::updater::{Updater, scheduler};

/// Long-lived companion of a running Lumen session: serves the in-app bridge
/// over the local socket and checks the release feed in the background.
/// Spawned by the launch script; exits with the session via the install
/// trigger or when the process is killed.
pub fn execute() -> Result<(), Box<dyn std::error::Error>> {
    let config = config::load()?;
    let install_dir = config.install_dir_path();

    let dialogs = Arc::new(ZenityDialogs);
    let trigger = Arc::new(InstallTrigger::new(
        InstallTrigger::resolve_installer(std::env::var("LUMEN_INSTALLER").ok()),
        config::cached_bundle_path(),
        install_dir.join("lumen"),
    ));

    let install_dialogs = dialogs.clone();
    let install_trigger = trigger.clone();
    let updater = Arc::new(Updater::new(
        config.appcast_url.clone(),
        Updater::local_build_from(&install_dir),
        dialogs,
        Box::new(move || install_trigger.run(install_dialogs.as_ref())),
    ));
    updater.register_surface(Arc::new(ToastSurface));

    let mut dispatcher = Dispatcher::new();
    let checker = updater.clone();
    dispatcher.register(Box::new(move |kind| {
        (kind == "check-for-updates").then(|| {
            let outcome = checker.check(false);
            json!({
                "type": "check-for-updates-result",
                "isUpdateAvailable": outcome.available,
            })
        })
    }));
    let requester = updater.clone();
    dispatcher.register(Box::new(move |kind| {
        (kind == "install-app-update").then(|| {
            requester.request_install();
            json!({ "type": "install-app-update-ack" })
        })
    }));

    let server = ipc::serve_on(&ipc::socket_path(), updater.clone(), Arc::new(dispatcher))?;
    scheduler::spawn(
        updater,
        Duration::from_secs(config.startup_delay_secs),
        Duration::from_secs(config.check_interval_mins * 60),
    )?;

    server.join().map_err(|_| "the updater socket thread panicked")?;

    Ok(())
}
