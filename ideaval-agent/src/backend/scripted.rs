//! Scripted backend for testing.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use super::traits::*;

/// Backend that replays a queue of scripted replies.
///
/// Each call to `complete` pops the next reply. Requests are recorded so
/// tests can assert on prompts, models and temperatures.
pub struct ScriptedBackend {
    model_id: String,
    replies: Mutex<VecDeque<Result<String, LlmError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
    call_count: AtomicU32,
}

impl ScriptedBackend {
    /// Create a backend with an empty script.
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            replies: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            call_count: AtomicU32::new(0),
        }
    }

    /// Queue a successful reply.
    pub fn with_reply(self, content: impl Into<String>) -> Self {
        self.push(Ok(content.into()));
        self
    }

    /// Queue a failure.
    pub fn with_error(self, error: LlmError) -> Self {
        self.push(Err(error));
        self
    }

    fn push(&self, reply: Result<String, LlmError>) {
        if let Ok(mut replies) = self.replies.lock() {
            replies.push_back(reply);
        }
    }

    /// Get the number of times complete was called.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Requests received so far, in order.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    /// Replies not yet consumed.
    pub fn remaining(&self) -> usize {
        self.replies.lock().map(|r| r.len()).unwrap_or(0)
    }
}

impl Default for ScriptedBackend {
    fn default() -> Self {
        Self::new("scripted-model")
    }
}

#[async_trait]
impl LlmBackend for ScriptedBackend {
    fn id(&self) -> &str {
        &self.model_id
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);

        let prompt_tokens = request.prompt_text().len() as u32 / 4;

        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }

        let reply = self
            .replies
            .lock()
            .map_err(|_| LlmError::Unavailable("Scripted backend poisoned".to_string()))?
            .pop_front()
            .ok_or_else(|| LlmError::Unavailable("Scripted backend exhausted".to_string()))?;

        let content = reply?;
        let completion_tokens = content.len() as u32 / 4;

        Ok(CompletionResponse {
            content,
            finish_reason: FinishReason::Stop,
            usage: Usage {
                prompt_tokens,
                completion_tokens,
            },
        })
    }
}
