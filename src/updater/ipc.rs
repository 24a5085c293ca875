use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::thread;

use console::style;
use serde_json::json;

use crate::updater::Updater;
use crate::updater::surface::Surface;

pub const SOCKET_NAME: &str = "lumen-updater.sock";

pub type Handler = Box<dyn Fn(&str) -> Option<serde_json::Value> + Send + Sync>;

/// Inbound messages run through an explicit interceptor chain, in
/// registration order. The first handler that returns a reply consumes the
/// message; handled messages are never forwarded further down the chain.
#[derive(Default)]
pub struct Dispatcher {
    handlers: Vec<Handler>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, handler: Handler) {
        self.handlers.push(handler);
    }

    pub fn dispatch(&self, kind: &str) -> Option<serde_json::Value> {
        self.handlers.iter().find_map(|handler| handler(kind))
    }
}

/// Where the in-app bridge finds the agent.
pub fn socket_path() -> PathBuf {
    if let Ok(dir) = std::env::var("XDG_RUNTIME_DIR")
        && !dir.is_empty()
    {
        return PathBuf::from(dir).join(SOCKET_NAME);
    }

    let uid = unsafe { libc::geteuid() };
    std::env::temp_dir().join(format!("lumen-updater-{uid}.sock"))
}

pub fn parse_kind(line: &str) -> Option<String> {
    serde_json::from_str::<serde_json::Value>(line)
        .ok()?
        .get("type")?
        .as_str()
        .map(str::to_string)
}

/// A connected bridge client; receives one-way pushes. Write failures are
/// dropped, a dead client simply stops hearing about updates.
pub struct ClientSurface {
    stream: Mutex<UnixStream>,
}

impl ClientSurface {
    pub fn new(stream: UnixStream) -> Self {
        Self {
            stream: Mutex::new(stream),
        }
    }
}

impl Surface for ClientSurface {
    fn update_ready_changed(&self, available: bool) {
        let message = json!({ "type": "app-update-ready-changed", "value": available });
        if let Ok(mut stream) = self.stream.lock() {
            let _ = writeln!(stream, "{message}");
        }
    }
}

/// Accept loop for the agent socket. Each client becomes a live surface and a
/// line-delimited JSON command channel.
pub fn serve_on(
    path: &Path,
    updater: Arc<Updater>,
    dispatcher: Arc<Dispatcher>,
) -> std::io::Result<thread::JoinHandle<()>> {
    // a stale socket from a previous session would block the bind
    let _ = fs::remove_file(path);
    let listener = UnixListener::bind(path)?;

    thread::Builder::new()
        .name("updater-ipc".to_string())
        .spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { continue };
                let updater = updater.clone();
                let dispatcher = dispatcher.clone();
                let _ = thread::Builder::new()
                    .name("updater-ipc-client".to_string())
                    .spawn(move || serve_client(stream, &updater, &dispatcher));
            }
        })
}

fn serve_client(stream: UnixStream, updater: &Updater, dispatcher: &Dispatcher) {
    let Ok(push_half) = stream.try_clone() else {
        return;
    };
    let surface: Arc<dyn Surface> = Arc::new(ClientSurface::new(push_half));
    updater.register_surface(surface.clone());

    if let Ok(mut reply_half) = stream.try_clone() {
        let reader = BufReader::new(stream);

        for line in reader.lines() {
            let Ok(line) = line else { break };
            if line.trim().is_empty() {
                continue;
            }

            let Some(kind) = parse_kind(&line) else {
                eprintln!(
                    "{} unparsable updater message: {line}",
                    style("warning:").yellow().bold()
                );
                continue;
            };

            if let Some(reply) = dispatcher.dispatch(&kind) {
                let _ = writeln!(reply_half, "{reply}");
            }
        }
    }

    // the bridge opens a connection per request, so dead clients pile up fast
    updater.unregister_surface(&surface);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil;
    use crate::updater::surface::mock::RecordingDialogs;
    use tempfile::TempDir;

    fn canned(kind: &'static str, reply: serde_json::Value) -> Handler {
        Box::new(move |k| (k == kind).then(|| reply.clone()))
    }

    #[test]
    fn dispatch_runs_handlers_in_registration_order() {
        let mut dispatcher = Dispatcher::new();
        dispatcher.register(canned("ping", json!({"from": "first"})));
        dispatcher.register(canned("ping", json!({"from": "second"})));

        let reply = dispatcher.dispatch("ping").unwrap();

        assert_eq!(reply["from"], "first");
    }

    #[test]
    fn dispatch_falls_through_to_later_handlers() {
        let mut dispatcher = Dispatcher::new();
        dispatcher.register(canned("install-app-update", json!({"ack": true})));
        dispatcher.register(canned("ping", json!({"pong": true})));

        assert!(dispatcher.dispatch("ping").is_some());
    }

    #[test]
    fn unknown_message_has_no_reply() {
        let mut dispatcher = Dispatcher::new();
        dispatcher.register(canned("ping", json!({})));

        assert!(dispatcher.dispatch("nope").is_none());
    }

    #[test]
    fn parse_kind_reads_the_type_field() {
        assert_eq!(
            parse_kind(r#"{"type": "check-for-updates"}"#),
            Some("check-for-updates".to_string())
        );
    }

    #[test]
    fn parse_kind_rejects_non_json() {
        assert_eq!(parse_kind("check please"), None);
    }

    #[test]
    fn parse_kind_rejects_missing_type() {
        assert_eq!(parse_kind(r#"{"kind": "x"}"#), None);
    }

    #[test]
    fn socket_path_is_named_after_the_agent() {
        let path = socket_path();

        assert!(path.to_string_lossy().contains("lumen-updater"));
    }

    #[test]
    fn client_surface_writes_the_push_message() {
        let (a, b) = UnixStream::pair().unwrap();
        let surface = ClientSurface::new(a);

        surface.update_ready_changed(true);

        let mut line = String::new();
        BufReader::new(b).read_line(&mut line).unwrap();
        assert_eq!(parse_kind(&line), Some("app-update-ready-changed".to_string()));
        assert!(line.contains("true"));
    }

    #[test]
    fn serve_replies_to_a_connected_client() {
        let dir = TempDir::new().unwrap();
        let socket = dir.path().join("agent.sock");

        let updater = Arc::new(Updater::new(
            testutil::refused_url(),
            0,
            Arc::new(RecordingDialogs::answering(false)),
            Box::new(|| {}),
        ));
        let mut dispatcher = Dispatcher::new();
        dispatcher.register(canned(
            "check-for-updates",
            json!({"type": "check-for-updates-result", "isUpdateAvailable": false}),
        ));

        let _server = serve_on(&socket, updater, Arc::new(dispatcher)).unwrap();

        let mut client = UnixStream::connect(&socket).unwrap();
        writeln!(client, r#"{{"type": "check-for-updates"}}"#).unwrap();

        let mut line = String::new();
        BufReader::new(client.try_clone().unwrap())
            .read_line(&mut line)
            .unwrap();
        assert!(line.contains("isUpdateAvailable"));
    }

    #[test]
    fn disconnected_clients_are_dropped_from_the_surface_list() {
        use std::time::{Duration, Instant};

        let dir = TempDir::new().unwrap();
        let socket = dir.path().join("agent.sock");

        let updater = Arc::new(Updater::new(
            testutil::refused_url(),
            0,
            Arc::new(RecordingDialogs::answering(false)),
            Box::new(|| {}),
        ));

        let _server = serve_on(&socket, updater.clone(), Arc::new(Dispatcher::new())).unwrap();

        // one short-lived connection per request, like the in-app bridge
        for _ in 0..50 {
            let client = UnixStream::connect(&socket).unwrap();
            drop(client);
        }

        let deadline = Instant::now() + Duration::from_secs(5);
        while updater.surface_count() > 0 && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(20));
        }

        assert_eq!(updater.surface_count(), 0);
    }

    #[test]
    fn serve_replaces_a_stale_socket_file() {
        let dir = TempDir::new().unwrap();
        let socket = dir.path().join("agent.sock");
        fs::write(&socket, "").unwrap();

        let updater = Arc::new(Updater::new(
            testutil::refused_url(),
            0,
            Arc::new(RecordingDialogs::answering(false)),
            Box::new(|| {}),
        ));

        assert!(serve_on(&socket, updater, Arc::new(Dispatcher::new())).is_ok());
    }
}
