use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use crate::http::{HttpClient, HttpRequest, HttpResponse};

#[derive(Debug, Clone)]
pub enum MockReply {
    Respond(u16, String),
    Fail,
    Hang,
    Delayed(Duration, u16, String),
}

/// Answers by exact URL and records every URL it was asked for.
/// Unknown URLs fail like an unreachable host.
#[derive(Debug, Default)]
pub struct MockHttpClient {
    routes: HashMap<String, MockReply>,
    requests: Mutex<Vec<String>>,
}

impl MockHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, url: &str, reply: MockReply) -> Self {
        self.routes.insert(url.to_string(), reply);
        self
    }

    pub fn ok_json(self, url: &str, body: &str) -> Self {
        self.route(url, MockReply::Respond(200, body.to_string()))
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl HttpClient for MockHttpClient {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, anyhow::Error> {
        self.requests.lock().unwrap().push(request.url.clone());

        match self.routes.get(&request.url).cloned() {
            Some(MockReply::Respond(status, body)) => Ok(HttpResponse::json(status, body)),
            Some(MockReply::Delayed(delay, status, body)) => {
                tokio::time::sleep(delay).await;
                Ok(HttpResponse::json(status, body))
            }
            Some(MockReply::Hang) => std::future::pending().await,
            Some(MockReply::Fail) | None => {
                Err(anyhow::anyhow!("connection refused: {}", request.url))
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FailingMockHttpClient;

#[async_trait::async_trait]
impl HttpClient for FailingMockHttpClient {
    async fn execute(&self, _request: HttpRequest) -> Result<HttpResponse, anyhow::Error> {
        Err(anyhow::anyhow!("Not implemented"))
    }
}
