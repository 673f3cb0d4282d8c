use std::{future::Future, sync::Arc, time::Duration};

use rustls::pki_types::ServerName;
use tokio::{
    io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader},
    net::TcpStream,
};
use tokio_rustls::TlsConnector;

use crate::SessionError;

trait Io: AsyncRead + AsyncWrite + Unpin + Send {}
impl<T: AsyncRead + AsyncWrite + Unpin + Send> Io for T {}

#[derive(Debug)]
pub(crate) struct Reply {
    pub code: u16,
    pub lines: Vec<String>,
}

impl Reply {
    fn text(&self) -> String {
        self.lines.join(" ")
    }

    /// Turns a reply outside `accepted` into a rejection.
    fn accept(self, accepted: std::ops::RangeInclusive<u16>) -> Result<Reply, SessionError> {
        if accepted.contains(&self.code) {
            return Ok(self);
        }

        Err(SessionError::Rejected {
            code: self.code,
            text: self.text(),
        })
    }
}

/// One SMTP connection to the relay, plain until STARTTLS upgrades it.
pub(crate) struct Session {
    stream: Option<BufReader<Box<dyn Io>>>,
    timeout: Duration,
}

impl Session {
    /// Opens the connection and waits for the relay banner.
    pub async fn connect(host: &str, port: u16, timeout: Duration) -> Result<Self, SessionError> {
        let tcp = within(timeout, TcpStream::connect((host, port))).await?;
        tracing::debug!(host, port, "connected to relay");

        let mut session = Self {
            stream: Some(BufReader::new(Box::new(tcp))),
            timeout,
        };

        session.read_reply().await?.accept(220..=220)?;

        Ok(session)
    }

    pub async fn greet(&mut self, client_id: &str) -> Result<(), SessionError> {
        let reply = self.command(&format!("EHLO {client_id}")).await?;
        if (200..300).contains(&reply.code) {
            return Ok(());
        }

        tracing::debug!(code = reply.code, "EHLO rejected, trying HELO");
        self.command(&format!("HELO {client_id}"))
            .await?
            .accept(200..=299)?;

        Ok(())
    }

    /// Upgrades to TLS, verifying the relay as `server_name`, then greets again.
    pub async fn starttls(
        &mut self,
        connector: &TlsConnector,
        server_name: &str,
        client_id: &str,
    ) -> Result<(), SessionError> {
        self.command("STARTTLS").await?.accept(220..=220)?;

        let reader = self.stream.take().ok_or(SessionError::Closed)?;
        if !reader.buffer().is_empty() {
            return Err(SessionError::Malformed(
                "data pipelined after STARTTLS".to_owned(),
            ));
        }

        let name = ServerName::try_from(server_name.to_owned())
            .map_err(|e| SessionError::Tls(e.to_string()))?;
        let tls = within(self.timeout, connector.connect(name, reader.into_inner())).await?;

        self.stream = Some(BufReader::new(Box::new(tls)));
        tracing::debug!(server_name, "relay session encrypted");

        self.greet(client_id).await
    }

    pub async fn mail_from(&mut self, sender: &str) -> Result<(), SessionError> {
        self.command(&format!("MAIL FROM:<{sender}>"))
            .await?
            .accept(200..=299)?;

        Ok(())
    }

    pub async fn rcpt_to(&mut self, recipient: &str) -> Result<(), SessionError> {
        self.command(&format!("RCPT TO:<{recipient}>"))
            .await?
            .accept(200..=299)?;

        Ok(())
    }

    pub async fn data(&mut self) -> Result<(), SessionError> {
        self.command("DATA").await?.accept(354..=354)?;

        Ok(())
    }

    /// Streams the message, dot-stuffed, without reading a reply.
    pub async fn write(&mut self, message: &[u8]) -> Result<(), SessionError> {
        self.write_raw(&dot_stuff(message)).await
    }

    /// Terminates the data stream, which commits the message on the relay.
    pub async fn close_data(&mut self) -> Result<(), SessionError> {
        self.write_raw(b".\r\n").await?;
        self.read_reply().await?.accept(200..=299)?;

        Ok(())
    }

    pub async fn quit(&mut self) -> Result<(), SessionError> {
        self.command("QUIT").await?.accept(221..=221)?;
        self.stream = None;

        Ok(())
    }

    async fn command(&mut self, line: &str) -> Result<Reply, SessionError> {
        tracing::trace!("C: {line}");
        self.write_raw(format!("{line}\r\n").as_bytes()).await?;
        self.read_reply().await
    }

    async fn write_raw(&mut self, data: &[u8]) -> Result<(), SessionError> {
        let timeout = self.timeout;
        let stream = self.stream.as_mut().ok_or(SessionError::Closed)?.get_mut();

        within(timeout, stream.write_all(data)).await?;
        within(timeout, stream.flush()).await
    }

    /// Reads a possibly multi-line reply (`250-...` continued, `250 ...` last).
    async fn read_reply(&mut self) -> Result<Reply, SessionError> {
        let timeout = self.timeout;
        let stream = self.stream.as_mut().ok_or(SessionError::Closed)?;
        let mut lines = vec![];

        loop {
            let mut line = String::new();
            if within(timeout, stream.read_line(&mut line)).await? == 0 {
                return Err(SessionError::Closed);
            }

            let line = line.trim_end_matches(['\r', '\n']);
            tracing::trace!("S: {line}");

            let code = line
                .get(..3)
                .and_then(|code| code.parse::<u16>().ok())
                .ok_or_else(|| SessionError::Malformed(line.to_owned()))?;

            let last = match line.as_bytes().get(3) {
                None | Some(b' ') => true,
                Some(b'-') => false,
                Some(_) => return Err(SessionError::Malformed(line.to_owned())),
            };

            lines.push(line.get(4..).unwrap_or_default().to_owned());

            if last {
                return Ok(Reply { code, lines });
            }
        }
    }
}

async fn within<T, E>(
    timeout: Duration,
    fut: impl Future<Output = Result<T, E>>,
) -> Result<T, SessionError>
where
    E: Into<SessionError>,
{
    tokio::time::timeout(timeout, fut)
        .await
        .map_err(|_| SessionError::Timeout(timeout))?
        .map_err(Into::into)
}

/// Client settings trusting the webpki roots, for public relays.
pub(crate) fn webpki_tls_config() -> Result<rustls::ClientConfig, SessionError> {
    let mut roots = rustls::RootCertStore::empty();
    roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

    Ok(rustls::ClientConfig::builder_with_provider(Arc::new(
        rustls::crypto::ring::default_provider(),
    ))
    .with_safe_default_protocol_versions()
    .map_err(|e| SessionError::Tls(e.to_string()))?
    .with_root_certificates(roots)
    .with_no_client_auth())
}

/// Normalises line endings to CRLF, doubles leading dots and makes sure the
/// message ends with CRLF so the terminating `.` sits on its own line.
fn dot_stuff(message: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(message.len() + 32);
    let mut line_start = true;
    let mut prev = 0u8;

    for &b in message {
        if line_start && b == b'.' {
            out.push(b'.');
        }
        if b == b'\n' && prev != b'\r' {
            out.push(b'\r');
        }

        out.push(b);
        line_start = b == b'\n';
        prev = b;
    }

    if !out.ends_with(b"\r\n") {
        out.extend_from_slice(b"\r\n");
    }

    out
}
