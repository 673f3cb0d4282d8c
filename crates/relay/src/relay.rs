use std::{fmt, sync::Arc, time::Duration};

use anyhow::Context;
use async_trait::async_trait;
use irilabs_contact::{ContactRequest, Relay};
use lettre::{Address, message::Mailbox};
use tokio_rustls::TlsConnector;

use crate::{
    Letterhead, RelayConfig, RelayError, SessionError, Step,
    session::{Session, webpki_tls_config},
};

/// Delivers each contact request over a fresh SMTP session to a fixed
/// recipient. Nothing is retried and connections are never reused.
#[derive(Clone)]
pub struct MailRelay {
    host: String,
    port: u16,
    server_name: String,
    client_id: String,
    starttls: bool,
    timeout: Duration,
    sender: Address,
    recipient: Address,
    letterhead: Letterhead,
    tls: TlsConnector,
}

impl fmt::Debug for MailRelay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailRelay")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("server_name", &self.server_name)
            .field("starttls", &self.starttls)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl MailRelay {
    pub fn new(config: &RelayConfig) -> anyhow::Result<Self> {
        let sender: Address = config
            .sender
            .parse()
            .with_context(|| format!("invalid relay sender {:?}", config.sender))?;
        let recipient: Address = config
            .recipient
            .parse()
            .with_context(|| format!("invalid relay recipient {:?}", config.recipient))?;
        let tls = webpki_tls_config().context("relay tls settings")?;

        tracing::info!(
            relay_host = %config.host,
            relay_port = config.port,
            client_id = %config.client_id,
            starttls = config.starttls,
            "mail relay configured"
        );

        Ok(Self {
            host: config.host.to_owned(),
            port: config.port,
            server_name: config.server_name().to_owned(),
            client_id: config.client_id.to_owned(),
            starttls: config.starttls,
            timeout: Duration::from_secs(config.timeout_secs),
            letterhead: Letterhead {
                from: Mailbox::new(None, sender.clone()),
                to: Mailbox::new(None, recipient.clone()),
                subject: config.subject.to_owned(),
            },
            sender,
            recipient,
            tls: TlsConnector::from(Arc::new(tls)),
        })
    }

    /// Replaces the webpki trust roots, e.g. for a relay with a private CA.
    pub fn with_tls_config(mut self, config: rustls::ClientConfig) -> Self {
        self.tls = TlsConnector::from(Arc::new(config));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Runs connect, greet, optional STARTTLS, envelope, data and quit,
    /// stopping at the first step that fails.
    #[tracing::instrument(skip_all, fields(host = %self.host, port = self.port))]
    pub async fn send(&self, request: &ContactRequest) -> Result<(), RelayError> {
        let mut session = Session::connect(&self.host, self.port, self.timeout)
            .await
            .map_err(|source| RelayError::new(Step::Connect, source))?;

        for step in Step::sequence(self.starttls) {
            tracing::debug!(%step, "relay step");

            self.run(step, &mut session, request)
                .await
                .map_err(|source| RelayError::new(step, source))?;
        }

        tracing::info!(to = %self.recipient, "contact request relayed");

        Ok(())
    }

    async fn run(
        &self,
        step: Step,
        session: &mut Session,
        request: &ContactRequest,
    ) -> Result<(), SessionError> {
        match step {
            // opened by Session::connect
            Step::Connect => Ok(()),
            Step::Greet => session.greet(&self.client_id).await,
            Step::StartTls => {
                session
                    .starttls(&self.tls, &self.server_name, &self.client_id)
                    .await
            }
            Step::MailFrom => session.mail_from(self.sender.as_ref()).await,
            Step::RcptTo => session.rcpt_to(self.recipient.as_ref()).await,
            Step::Data => session.data().await,
            Step::Write => session.write(&self.letterhead.compose(request)?).await,
            Step::CloseData => session.close_data().await,
            Step::Quit => session.quit().await,
        }
    }
}

#[async_trait]
impl Relay for MailRelay {
    async fn relay(&self, request: &ContactRequest) -> anyhow::Result<()> {
        self.send(request).await?;

        Ok(())
    }
}
