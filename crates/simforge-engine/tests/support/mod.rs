//! Shared test backend

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use simforge_engine::{CompletionBackend, EngineError, Result};

/// Replies with canned completions in call order, cycling when exhausted
#[derive(Debug)]
pub struct StubBackend {
    replies: Vec<std::result::Result<String, String>>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<(String, String)>>,
}

impl StubBackend {
    pub fn replying(replies: &[&str]) -> Arc<Self> {
        Self::scripted(replies.iter().map(|r| Ok(r.to_string())).collect())
    }

    pub fn scripted(replies: Vec<std::result::Result<String, String>>) -> Arc<Self> {
        Arc::new(Self {
            replies,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<(String, String)> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionBackend for StubBackend {
    async fn complete(&self, system_prompt: &str, user_prompt: &str, _temperature: f64) -> Result<String> {
        let index = self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts
            .lock()
            .unwrap()
            .push((system_prompt.to_string(), user_prompt.to_string()));

        match &self.replies[index % self.replies.len()] {
            Ok(text) => Ok(text.clone()),
            Err(message) => Err(EngineError::Backend(message.clone())),
        }
    }

    fn provider(&self) -> &str {
        "stub"
    }

    fn model(&self) -> &str {
        "stub-model"
    }
}

/// One well-formed sequence whose second row carries the given confidence
pub fn sequence_reply(confidence: f64) -> String {
    format!(
        r#"{{
            "title": "Debugging a flaky test",
            "description": "Narrowing down a race",
            "rows": [
                {{"goal": "Reproduce the failure", "beliefs": [{{"content": "It only fails in CI", "confidence": 0.6}}], "operation": "Act", "output": "Ran it 50 times"}},
                {{"goal": "Find the race", "beliefs": [{{"content": "Two tasks share a file", "confidence": {confidence}}}], "operation": "Ponder", "output": "Suspect the temp dir"}}
            ]
        }}"#
    )
}

/// Holds every call at a barrier until `width` calls are in flight, then
/// answers later slots first. Slot 1 answers with text that is not JSON.
#[derive(Debug)]
pub struct StaggeredBackend {
    barrier: tokio::sync::Barrier,
    width: usize,
    calls: AtomicUsize,
}

impl StaggeredBackend {
    pub fn new(width: usize) -> Arc<Self> {
        Arc::new(Self {
            barrier: tokio::sync::Barrier::new(width),
            width,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl CompletionBackend for StaggeredBackend {
    async fn complete(&self, _system_prompt: &str, _user_prompt: &str, _temperature: f64) -> Result<String> {
        let slot = self.calls.fetch_add(1, Ordering::SeqCst);
        self.barrier.wait().await;

        let delay = (self.width - slot) as u64 * 20;
        tokio::time::sleep(std::time::Duration::from_millis(delay)).await;

        if slot == 1 {
            return Ok("still thinking...".to_string());
        }
        Ok(format!(r#"{{"title": "Trace {}", "rows": []}}"#, slot))
    }

    fn provider(&self) -> &str {
        "staggered"
    }

    fn model(&self) -> &str {
        "staggered-model"
    }
}
