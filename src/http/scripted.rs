//! In-memory transport for unit tests
//!
//! Answers requests from a queue of canned responses and records every
//! request it sees.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::common::{Error, Result};

use super::client::Transport;
use super::protocol::{ApiRequest, ApiResponse};

#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<Result<ApiResponse>>>,
    seen: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a JSON reply
    pub fn reply(self, status: u16, body: Value) -> Self {
        self.push(Ok(ApiResponse::new(status, body.to_string())))
    }

    /// Queue a raw text reply
    pub fn reply_text(self, status: u16, text: &str) -> Self {
        self.push(Ok(ApiResponse::new(status, text)))
    }

    /// Queue a connection failure
    pub fn refuse(self) -> Self {
        self.push(Err(Error::transport("scripted", "connection refused")))
    }

    fn push(self, reply: Result<ApiResponse>) -> Self {
        self.replies.lock().unwrap().push_back(reply);
        self
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.seen.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let url = request.url.clone();
        self.seen.lock().unwrap().push(request);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Error::transport(&url, "no scripted reply left")))
    }
}
