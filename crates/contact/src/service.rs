use std::sync::Arc;

use async_trait::async_trait;

use crate::{ContactForm, ContactRequest, SubmissionLog, Topics};

/// Durable record of received contact requests.
#[async_trait]
pub trait Journal: Send + Sync {
    async fn append(&self, request: &ContactRequest) -> anyhow::Result<()>;
}

/// Delivery of a contact request to a human, usually by email.
#[async_trait]
pub trait Relay: Send + Sync {
    async fn relay(&self, request: &ContactRequest) -> anyhow::Result<()>;
}

#[async_trait]
impl Journal for SubmissionLog {
    async fn append(&self, request: &ContactRequest) -> anyhow::Result<()> {
        SubmissionLog::append(self, request).await?;

        Ok(())
    }
}

/// What reached the contact page.
#[derive(Debug, Clone)]
pub enum Inbound {
    /// A plain page view, nothing to record.
    View,
    Submission { form: ContactForm, net_addr: String },
}

/// Data for the contact view once an inbound request has been handled.
///
/// `logged` and `relayed` are for diagnostics only, the visitor always gets
/// the same confirmation.
#[derive(Debug, Clone)]
pub struct Acknowledgement {
    pub thanks: bool,
    pub topics: Topics,
    pub logged: bool,
    pub relayed: bool,
}

#[derive(Clone)]
pub struct ContactService {
    journal: Arc<dyn Journal>,
    relay: Arc<dyn Relay>,
    topics: Topics,
}

impl ContactService {
    pub fn new(journal: Arc<dyn Journal>, relay: Arc<dyn Relay>, topics: Topics) -> Self {
        Self {
            journal,
            relay,
            topics,
        }
    }

    pub fn topics(&self) -> &Topics {
        &self.topics
    }

    /// Never fails: log and relay errors are traced and swallowed.
    pub async fn handle(&self, inbound: Inbound) -> Acknowledgement {
        let Inbound::Submission { form, net_addr } = inbound else {
            return Acknowledgement {
                thanks: false,
                topics: self.topics.clone(),
                logged: false,
                relayed: false,
            };
        };

        let request = form.into_request(net_addr);
        let (logged, relayed) = self.submit(&request).await;

        Acknowledgement {
            thanks: true,
            topics: self.topics.clone(),
            logged,
            relayed,
        }
    }

    #[tracing::instrument(skip_all, fields(net_addr = %request.net_addr, subject = %request.subject))]
    async fn submit(&self, request: &ContactRequest) -> (bool, bool) {
        let logged = match self.journal.append(request).await {
            Ok(()) => true,
            Err(err) => {
                tracing::error!(err = %err, "failed to log contact request");
                false
            }
        };

        let relayed = match self.relay.relay(request).await {
            Ok(()) => true,
            Err(err) => {
                tracing::error!(err = %err, "failed to relay contact request");
                false
            }
        };

        tracing::info!(logged, relayed, "contact request received");

        (logged, relayed)
    }
}
