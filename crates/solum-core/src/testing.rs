//! In-memory `HttpClient` that records requests and replays canned replies.

use crate::client::{HttpClient, Method, Request, Response};
use crate::error::Result;
use std::cell::RefCell;

#[derive(Default)]
pub struct RecordingClient {
    routes: Vec<(Method, String, Response)>,
    sent: RefCell<Vec<Request>>,
}

impl RecordingClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, method: Method, path: &str, status: u16, body: &str) -> Self {
        self.routes.push((
            method,
            path.to_string(),
            Response::new(status, body.as_bytes().to_vec()),
        ));
        self
    }

    pub fn requests(&self) -> Vec<Request> {
        self.sent.borrow().clone()
    }
}

impl HttpClient for RecordingClient {
    fn send(&self, request: Request) -> Result<Response> {
        let reply = self
            .routes
            .iter()
            .find(|(m, p, _)| *m == request.method && *p == request.path)
            .map(|(_, _, r)| r.clone())
            .unwrap_or_else(|| Response::new(404, br#"{"faultstring": "no route"}"#.to_vec()));
        self.sent.borrow_mut().push(request);
        Ok(reply)
    }
}
