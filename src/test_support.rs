//! In-memory transport that replays scripted responses.

use crate::error::TransportError;
use crate::transport::{ProgressCallback, ProgressEvent, Transport};
use crate::upload::CandidateFile;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub enum Step {
    Reply(Value),
    Fail(TransportError),
}

#[derive(Default)]
pub struct ScriptedTransport {
    uploads: Mutex<HashMap<String, VecDeque<(u64, Step)>>>,
    posts: Mutex<VecDeque<(u64, Step)>>,
    sent_bodies: Mutex<Vec<(String, Value, Duration)>>,
    calls: AtomicUsize,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues the response for the next upload of `name`, settled after
    /// `delay_ms`.
    pub fn on_upload(self, name: &str, delay_ms: u64, step: Step) -> Self {
        self.uploads
            .lock()
            .unwrap()
            .entry(name.to_string())
            .or_default()
            .push_back((delay_ms, step));
        self
    }

    pub fn on_post(self, delay_ms: u64, step: Step) -> Self {
        self.posts.lock().unwrap().push_back((delay_ms, step));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn sent_bodies(&self) -> Vec<(String, Value, Duration)> {
        self.sent_bodies.lock().unwrap().clone()
    }

    fn settle(step: Step) -> Result<Value, TransportError> {
        match step {
            Step::Reply(body) => Ok(body),
            Step::Fail(err) => Err(err),
        }
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn upload_file(
        &self,
        _path: &str,
        file: &CandidateFile,
        _timeout: Duration,
        on_progress: ProgressCallback,
    ) -> Result<Value, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self
            .uploads
            .lock()
            .unwrap()
            .get_mut(&file.name)
            .and_then(VecDeque::pop_front);
        let (delay_ms, step) =
            next.unwrap_or_else(|| panic!("no scripted upload for {}", file.name));

        let total = file.size_bytes;
        on_progress(ProgressEvent { sent: total / 2, total });
        on_progress(ProgressEvent { sent: total, total });
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        Self::settle(step)
    }

    async fn post_json(
        &self,
        path: &str,
        body: &Value,
        timeout: Duration,
    ) -> Result<Value, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.sent_bodies
            .lock()
            .unwrap()
            .push((path.to_string(), body.clone(), timeout));
        let next = self.posts.lock().unwrap().pop_front();
        let (delay_ms, step) = next.unwrap_or_else(|| panic!("no scripted post for {}", path));
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        Self::settle(step)
    }
}
