//! Recording stub for `LawApi`

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::{ApiResponse, LawApi};
use crate::error::{LawsError, Result};
use crate::tools::OutboundRequest;

/// What the mock does when called
#[derive(Debug, Clone)]
pub enum MockReply {
    Respond(ApiResponse),
    Status(u16, String),
    Delay(Duration, ApiResponse),
}

/// Replays queued replies and records every request it receives.
///
/// When the queue runs dry the fallback reply (if any) is used; otherwise the
/// call fails with a decode error.
#[derive(Debug, Default)]
pub struct MockLawApi {
    replies: Mutex<VecDeque<MockReply>>,
    fallback: Option<MockReply>,
    requests: Mutex<Vec<OutboundRequest>>,
}

impl MockLawApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every request with `response`
    pub fn always(response: ApiResponse) -> Self {
        Self {
            fallback: Some(MockReply::Respond(response)),
            ..Self::default()
        }
    }

    /// Answer every request with a non-2xx status
    pub fn failing(status: u16, message: impl Into<String>) -> Self {
        Self {
            fallback: Some(MockReply::Status(status, message.into())),
            ..Self::default()
        }
    }

    /// Queue a reply for the next call
    pub fn push(&self, reply: MockReply) {
        self.replies.lock().unwrap_or_else(|e| e.into_inner()).push_back(reply);
    }

    /// Requests seen so far, in call order
    pub fn requests(&self) -> Vec<OutboundRequest> {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    fn next_reply(&self) -> Option<MockReply> {
        let queued = self.replies.lock().unwrap_or_else(|e| e.into_inner()).pop_front();
        queued.or_else(|| self.fallback.clone())
    }
}

#[async_trait]
impl LawApi for MockLawApi {
    async fn get(&self, request: &OutboundRequest) -> Result<ApiResponse> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request.clone());

        match self.next_reply() {
            Some(MockReply::Respond(response)) => Ok(response),
            Some(MockReply::Status(status, message)) => Err(LawsError::RemoteStatus { status, message }),
            Some(MockReply::Delay(delay, response)) => {
                tokio::time::sleep(delay).await;
                Ok(response)
            }
            None => Err(LawsError::Decode("MockLawApi has no reply queued".to_string())),
        }
    }
}
