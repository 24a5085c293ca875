use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::updater::Updater;

pub const STARTUP_DELAY: Duration = Duration::from_secs(30);
pub const CHECK_INTERVAL: Duration = Duration::from_secs(15 * 60);

/// Background check loop: one silent check shortly after startup, then a
/// fixed re-arm after each completed check. The re-arm (rather than a
/// free-running timer) means checks can never pile up behind a slow fetch.
/// Lives until the process exits.
pub fn spawn(
    updater: Arc<Updater>,
    startup_delay: Duration,
    interval: Duration,
) -> std::io::Result<thread::JoinHandle<()>> {
    thread::Builder::new()
        .name("update-check".to_string())
        .spawn(move || {
            thread::sleep(startup_delay);
            loop {
                updater.check(true);
                thread::sleep(interval);
            }
        })
}
