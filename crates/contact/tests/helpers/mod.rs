#![allow(dead_code)]

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use irilabs_contact::{ContactRequest, ContactService, Journal, Relay, SubmissionLog, Topics};

/// Relay that records every request and optionally fails.
#[derive(Default)]
pub struct FakeRelay {
    pub requests: Mutex<Vec<ContactRequest>>,
    pub fail: bool,
}

impl FakeRelay {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Relay for FakeRelay {
    async fn relay(&self, request: &ContactRequest) -> anyhow::Result<()> {
        self.requests.lock().unwrap().push(request.clone());

        if self.fail {
            anyhow::bail!("start-tls: 454 TLS not available");
        }

        Ok(())
    }
}

/// Journal that counts appends and always fails.
#[derive(Default)]
pub struct BrokenJournal {
    pub calls: AtomicUsize,
}

#[async_trait]
impl Journal for BrokenJournal {
    async fn append(&self, _request: &ContactRequest) -> anyhow::Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        anyhow::bail!("open log/contact: permission denied")
    }
}

pub fn service(journal: Arc<dyn Journal>, relay: Arc<dyn Relay>) -> ContactService {
    ContactService::new(journal, relay, Topics::default())
}

pub async fn read_log(log: &SubmissionLog) -> anyhow::Result<Vec<ContactRequest>> {
    let content = tokio::fs::read_to_string(log.path()).await?;

    Ok(content
        .lines()
        .map(serde_json::from_str)
        .collect::<Result<Vec<_>, _>>()?)
}
