use std::process::{Command, Stdio};

use console::style;

/// A live UI surface that receives one-way update pushes. Delivery is
/// best-effort, no acknowledgment.
pub trait Surface: Send + Sync {
    fn update_ready_changed(&self, available: bool);
}

/// Synchronous user-facing dialogs. Silent checks never touch these.
pub trait Dialogs: Send + Sync {
    fn info(&self, message: &str);
    fn error(&self, message: &str);
    fn confirm(&self, message: &str) -> bool;
}

/// Desktop toast on the update-ready push, via notify-send. Failures are
/// swallowed; a missing notification daemon must not break the agent.
pub struct ToastSurface;

impl Surface for ToastSurface {
    fn update_ready_changed(&self, available: bool) {
        if !available {
            return;
        }
        let _ = Command::new("notify-send")
            .args(["--app-name=Lumen", "Lumen", "A new version of Lumen is available."])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();
    }
}

/// Dialogs through zenity. When zenity is unavailable the messages degrade to
/// styled stderr lines and confirmations answer no.
pub struct ZenityDialogs;

impl ZenityDialogs {
    fn show(&self, kind: &str, message: &str) -> bool {
        Command::new("zenity")
            .arg(kind)
            .args(["--title", "Lumen", "--text", message])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }
}

impl Dialogs for ZenityDialogs {
    fn info(&self, message: &str) {
        if !self.show("--info", message) {
            eprintln!("{} {message}", style("lumen:").cyan().bold());
        }
    }

    fn error(&self, message: &str) {
        if !self.show("--error", message) {
            eprintln!("{} {message}", style("lumen:").red().bold());
        }
    }

    fn confirm(&self, message: &str) -> bool {
        self.show("--question", message)
    }
}
