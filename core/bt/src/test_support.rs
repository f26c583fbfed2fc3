//! In-process fake mediator for client tests.

use std::io::Read;
use std::sync::{Arc, Mutex};
use std::thread;

use tiny_http::{Response, Server, StatusCode};

/// One request as seen by the fake mediator.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub body: String,
}

/// Serves HTTP on an ephemeral port until the test process exits.
pub struct FakeMediator {
    pub port: u16,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl FakeMediator {
    /// `respond` maps a request path (with query) to `(status, body)`.
    pub fn start<F>(respond: F) -> Self
    where
        F: Fn(&str) -> (u16, String) + Send + 'static,
    {
        let server = Server::http("127.0.0.1:0").expect("Failed to bind fake mediator");
        let port = server
            .server_addr()
            .to_ip()
            .expect("Fake mediator is not on a TCP socket")
            .port();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&requests);

        thread::spawn(move || {
            for mut request in server.incoming_requests() {
                let mut body = Vec::new();
                let _ = request.as_reader().read_to_end(&mut body);
                let path = request.url().to_string();
                let (status, reply) = respond(&path);

                recorded.lock().unwrap().push(Recorded {
                    method: request.method().to_string(),
                    path,
                    body: String::from_utf8_lossy(&body).to_string(),
                });
                let _ = request.respond(Response::from_string(reply).with_status_code(StatusCode(status)));
            }
        });

        Self { port, requests }
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    pub fn paths(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.path).collect()
    }
}

/// A mediator answering the handshake and listing `tabs`.
pub fn mediator_with_tabs(tabs: &'static str) -> FakeMediator {
    FakeMediator::start(move |path| match path {
        "/get_pid" => (200, "4242".to_string()),
        "/get_browser" => (200, "firefox".to_string()),
        "/list_tabs" => (200, tabs.to_string()),
        _ => (200, "OK".to_string()),
    })
}
