//! In-memory `ChatModel` for service and router tests.
//!
//! Replies `"RAPal: <message>"`. Messages containing `[quota]`, `[safety]`,
//! or `[boom]` fail with the matching provider error.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rapal_core::types::ChatTurn;
use rapal_providers::{ChatModel, Conversation, ProviderError, ProviderErrorKind};

#[derive(Default)]
struct Recorder {
    calls: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

#[derive(Clone, Default)]
pub struct ScriptedModel {
    recorder: Arc<Recorder>,
    delay: Duration,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold every call for `delay` before replying.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Messages received by any conversation, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.recorder.calls.lock().unwrap().clone()
    }

    /// Highest number of calls that were running at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.recorder.max_in_flight.load(Ordering::SeqCst)
    }
}

impl ChatModel for ScriptedModel {
    fn start_chat(&self) -> Box<dyn Conversation> {
        Box::new(ScriptedChat {
            recorder: self.recorder.clone(),
            delay: self.delay,
            history: Vec::new(),
        })
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

struct ScriptedChat {
    recorder: Arc<Recorder>,
    delay: Duration,
    history: Vec<ChatTurn>,
}

#[async_trait]
impl Conversation for ScriptedChat {
    async fn send_message(&mut self, text: &str) -> Result<String, ProviderError> {
        self.recorder.calls.lock().unwrap().push(text.to_string());
        let now = self.recorder.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.recorder.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.recorder.in_flight.fetch_sub(1, Ordering::SeqCst);

        if text.contains("[quota]") {
            return Err(ProviderError::new(ProviderErrorKind::Quota, "Resource has been exhausted").with_status(429));
        }
        if text.contains("[safety]") {
            return Err(ProviderError::new(ProviderErrorKind::Safety, "Prompt blocked: SAFETY"));
        }
        if text.contains("[boom]") {
            return Err(ProviderError::new(ProviderErrorKind::Network, "connection reset by peer"));
        }

        let reply = format!("RAPal: {}", text);
        self.history.push(ChatTurn::user(text));
        self.history.push(ChatTurn::model(reply.clone()));
        Ok(reply)
    }

    fn history(&self) -> &[ChatTurn] {
        &self.history
    }
}
