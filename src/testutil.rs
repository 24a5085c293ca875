use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread;

/// Loopback HTTP stub serving one canned body per request, repeating the last
/// body once the list is exhausted. Returns the base URL.
pub fn http_stub(bodies: Vec<String>) -> String {
    serve(200, bodies)
}

pub fn http_stub_with_status(status: u16, body: &str) -> String {
    serve(status, vec![body.to_string()])
}

/// A URL whose server accepts connections and then never responds, for
/// stall-timeout paths.
pub fn stalled_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    thread::spawn(move || {
        let mut held = Vec::new();
        for stream in listener.incoming() {
            let Ok(stream) = stream else { break };
            held.push(stream);
        }
    });

    format!("http://{addr}")
}

/// A URL nothing listens on, for connection-refused paths.
pub fn refused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

fn serve(status: u16, bodies: Vec<String>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    thread::spawn(move || {
        let mut served = 0usize;
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { break };

            let mut request = [0u8; 4096];
            let _ = stream.read(&mut request);

            let body = bodies
                .get(served.min(bodies.len().saturating_sub(1)))
                .cloned()
                .unwrap_or_default();
            served += 1;

            let reason = if status == 200 { "OK" } else { "Error" };
            let response = format!(
                "HTTP/1.1 {status} {reason}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = stream.write_all(response.as_bytes());
        }
    });

    format!("http://{addr}")
}
