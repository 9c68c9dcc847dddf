// Canned-response transport for tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::client::{RawResponse, Transport, TransportError};

#[derive(Debug, Default)]
pub struct MockTransport {
    responses: Mutex<HashMap<String, Result<RawResponse, TransportError>>>,
    calls: Mutex<Vec<String>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, url: &str, response: RawResponse) {
        self.responses
            .lock()
            .unwrap()
            .insert(url.to_string(), Ok(response));
    }

    pub fn fail(&self, url: &str, message: &str) {
        self.responses
            .lock()
            .unwrap()
            .insert(url.to_string(), Err(TransportError(message.to_string())));
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(&self, url: &str) -> Result<RawResponse, TransportError> {
        self.calls.lock().unwrap().push(url.to_string());
        self.responses
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .unwrap_or_else(|| Err(TransportError(format!("no canned response for {}", url))))
    }
}
