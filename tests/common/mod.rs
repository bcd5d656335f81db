#![allow(dead_code)]

pub mod mock_advisor {
    use std::net::{SocketAddr, TcpListener};
    use std::sync::{Arc, Mutex};
    use std::thread::JoinHandle;
    use std::time::Duration;
    use tiny_http::{Header, Response, Server};

    /// A request as the mock advisor received it
    #[derive(Debug, Clone)]
    pub struct RecordedRequest {
        pub method: String,
        pub url: String,
        pub content_type: Option<String>,
        pub body: String,
    }

    impl RecordedRequest {
        pub fn json(&self) -> serde_json::Value {
            serde_json::from_str(&self.body).unwrap()
        }
    }

    /// Advisor endpoint that answers every request with the same status and body
    ///
    /// Runs on a background thread bound to a random port; stopped on drop.
    pub struct MockAdvisor {
        addr: SocketAddr,
        server: Arc<Server>,
        requests: Arc<Mutex<Vec<RecordedRequest>>>,
        handle: Option<JoinHandle<()>>,
    }

    impl MockAdvisor {
        pub fn start(status: u16, body: &str) -> Self {
            Self::start_delayed(status, body, Duration::ZERO)
        }

        /// Like [`MockAdvisor::start`], but holds every response for `delay`
        pub fn start_delayed(status: u16, body: &str, delay: Duration) -> Self {
            let server = Arc::new(Server::http("127.0.0.1:0").unwrap());
            let addr = server.server_addr().to_ip().unwrap();
            let requests = Arc::new(Mutex::new(Vec::new()));

            let body = body.to_string();
            let thread_server = Arc::clone(&server);
            let thread_requests = Arc::clone(&requests);
            let handle = std::thread::spawn(move || {
                while let Ok(mut request) = thread_server.recv() {
                    let mut received = String::new();
                    let _ = request.as_reader().read_to_string(&mut received);
                    let content_type = request
                        .headers()
                        .iter()
                        .find(|h| h.field.equiv("Content-Type"))
                        .map(|h| h.value.as_str().to_string());
                    thread_requests.lock().unwrap().push(RecordedRequest {
                        method: request.method().as_str().to_string(),
                        url: request.url().to_string(),
                        content_type,
                        body: received,
                    });

                    if !delay.is_zero() {
                        std::thread::sleep(delay);
                    }
                    let header =
                        Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).unwrap();
                    let response = Response::from_string(body.clone())
                        .with_status_code(status)
                        .with_header(header);
                    let _ = request.respond(response);
                }
            });

            Self {
                addr,
                server,
                requests,
                handle: Some(handle),
            }
        }

        pub fn endpoint(&self) -> String {
            format!("http://{}/api/advisor", self.addr)
        }

        pub fn requests(&self) -> Vec<RecordedRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl Drop for MockAdvisor {
        fn drop(&mut self) {
            self.server.unblock();
            if let Some(handle) = self.handle.take() {
                let _ = handle.join();
            }
        }
    }

    /// An endpoint URL on a port nothing listens on
    pub fn refused_endpoint() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{addr}/api/advisor")
    }
}

pub mod fixtures {
    use serde_json::{json, Value};

    /// The sample report: Loamy soil in the North
    pub fn wheat_report() -> Value {
        json!({
            "advisor_report": {
                "Recommended Crop": "Wheat",
                "Expected Yield": "3.2 t/ha",
                "Resource Requirements": {
                    "Crop": "Wheat",
                    "Fertilizer Used": "Urea",
                    "Yield Tons": "3.2",
                    "Water Usage": "450mm"
                }
            }
        })
    }

    pub fn report_for(crop: &str) -> Value {
        json!({
            "advisor_report": {
                "Recommended Crop": crop,
                "Expected Yield": "1.00 tons/ha",
                "Resource Requirements": {
                    "Crop": crop,
                    "Fertilizer Used": "N/A",
                    "Yield Tons": "1.00",
                    "Water Usage": "N/A"
                }
            }
        })
    }
}
