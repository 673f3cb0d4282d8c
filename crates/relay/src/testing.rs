//! Scripted in-process SMTP endpoint for exercising the relay client.
//!
//! STARTTLS is refused with 454 unless the script enables TLS, in which case
//! the session is upgraded with a self-signed certificate for `localhost`.

use std::{
    collections::HashMap,
    io,
    net::SocketAddr,
    sync::{Arc, Mutex},
    time::Duration,
};

use rustls::pki_types::{CertificateDer, PrivateKeyDer, PrivatePkcs8KeyDer};
use tokio::{
    io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader},
    net::{TcpListener, TcpStream},
};
use tokio_rustls::TlsAcceptor;

use crate::RelayConfig;

/// Name the self-signed certificate is issued for.
pub const TLS_SERVER_NAME: &str = "localhost";

trait Io: AsyncRead + AsyncWrite + Unpin + Send {}
impl<T: AsyncRead + AsyncWrite + Unpin + Send> Io for T {}

#[derive(Debug, Clone, Default)]
pub struct Script {
    banner: Option<String>,
    replies: HashMap<String, String>,
    silent: bool,
    tls: bool,
}

impl Script {
    /// Accepts STARTTLS and upgrades the session.
    pub fn tls() -> Self {
        Self {
            tls: true,
            ..Default::default()
        }
    }

    /// Accepts connections but never answers.
    pub fn silent() -> Self {
        Self {
            silent: true,
            ..Default::default()
        }
    }

    pub fn banner(mut self, reply: impl Into<String>) -> Self {
        self.banner = Some(reply.into());
        self
    }

    /// Overrides the reply to `verb` (`EHLO`, `MAIL`, `RCPT`, `DATA`, `QUIT`,
    /// or `.` for the end of data).
    pub fn reply(mut self, verb: impl Into<String>, reply: impl Into<String>) -> Self {
        self.replies.insert(verb.into(), reply.into());
        self
    }

    fn reply_to(&self, verb: &str) -> String {
        if let Some(reply) = self.replies.get(verb) {
            return reply.to_owned();
        }

        match verb {
            "EHLO" => "250-relay.test\r\n250 8BITMIME",
            "HELO" => "250 relay.test",
            "STARTTLS" if self.tls => "220 2.0.0 ready to start TLS",
            "STARTTLS" => "454 4.7.0 TLS not available",
            "DATA" => "354 end data with <CR><LF>.<CR><LF>",
            "." => "250 2.0.0 queued",
            "QUIT" => "221 2.0.0 bye",
            _ => "250 2.1.0 ok",
        }
        .to_owned()
    }
}

#[derive(Debug, Default)]
struct Transcript {
    commands: Vec<String>,
    message: Vec<String>,
}

pub struct ScriptedRelay {
    addr: SocketAddr,
    transcript: Arc<Mutex<Transcript>>,
    certificate: Option<CertificateDer<'static>>,
}

impl ScriptedRelay {
    pub async fn spawn(script: Script) -> io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let transcript = Arc::new(Mutex::new(Transcript::default()));

        let (certificate, acceptor) = if script.tls {
            let (certificate, acceptor) = self_signed()?;
            (Some(certificate), Some(acceptor))
        } else {
            (None, None)
        };

        tokio::spawn(serve(listener, script, transcript.clone(), acceptor));

        Ok(Self {
            addr,
            transcript,
            certificate,
        })
    }

    /// Relay settings pointing at this endpoint, STARTTLS only when the
    /// script enables TLS.
    pub fn config(&self) -> RelayConfig {
        RelayConfig {
            host: self.addr.ip().to_string(),
            port: self.addr.port(),
            server_name: Some(TLS_SERVER_NAME.to_owned()),
            starttls: self.certificate.is_some(),
            timeout_secs: 5,
            ..Default::default()
        }
    }

    /// Client settings trusting only this endpoint's certificate.
    pub fn tls_config(&self) -> rustls::ClientConfig {
        let mut roots = rustls::RootCertStore::empty();
        if let Some(certificate) = &self.certificate {
            roots
                .add(certificate.clone())
                .expect("self-signed certificate is a valid trust anchor");
        }

        rustls::ClientConfig::builder_with_provider(Arc::new(
            rustls::crypto::ring::default_provider(),
        ))
        .with_safe_default_protocol_versions()
        .expect("ring supports the default protocol versions")
        .with_root_certificates(roots)
        .with_no_client_auth()
    }

    /// Every command line received, `.` standing for the end of data.
    pub fn commands(&self) -> Vec<String> {
        self.transcript.lock().unwrap().commands.clone()
    }

    pub fn verbs(&self) -> Vec<String> {
        self.commands().iter().map(|line| verb(line)).collect()
    }

    /// The message received after DATA, dot-unstuffed, lines joined by `\n`.
    pub fn message(&self) -> String {
        self.transcript.lock().unwrap().message.join("\n")
    }
}

fn verb(line: &str) -> String {
    line.split([' ', ':'])
        .next()
        .unwrap_or_default()
        .to_ascii_uppercase()
}

fn self_signed() -> io::Result<(CertificateDer<'static>, TlsAcceptor)> {
    let generated = rcgen::generate_simple_self_signed(vec![TLS_SERVER_NAME.to_owned()])
        .map_err(io::Error::other)?;
    let certificate = CertificateDer::from(generated.serialize_der().map_err(io::Error::other)?);
    let key = PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(
        generated.serialize_private_key_der(),
    ));

    let config = rustls::ServerConfig::builder_with_provider(Arc::new(
        rustls::crypto::ring::default_provider(),
    ))
    .with_safe_default_protocol_versions()
    .map_err(io::Error::other)?
    .with_no_client_auth()
    .with_single_cert(vec![certificate.clone()], key)
    .map_err(io::Error::other)?;

    Ok((certificate, TlsAcceptor::from(Arc::new(config))))
}

async fn serve(
    listener: TcpListener,
    script: Script,
    transcript: Arc<Mutex<Transcript>>,
    acceptor: Option<TlsAcceptor>,
) {
    while let Ok((stream, _)) = listener.accept().await {
        let script = script.clone();
        let transcript = transcript.clone();
        let acceptor = acceptor.clone();

        tokio::spawn(async move {
            if let Err(err) = session(stream, script, transcript, acceptor).await {
                tracing::debug!(err = %err, "scripted relay session ended");
            }
        });
    }
}

async fn session(
    stream: TcpStream,
    script: Script,
    transcript: Arc<Mutex<Transcript>>,
    acceptor: Option<TlsAcceptor>,
) -> io::Result<()> {
    if script.silent {
        tokio::time::sleep(Duration::from_secs(60)).await;
        return Ok(());
    }

    let mut conn: BufReader<Box<dyn Io>> = BufReader::new(Box::new(stream));
    let banner = script
        .banner
        .clone()
        .unwrap_or_else(|| "220 relay.test ESMTP".to_owned());

    conn.get_mut()
        .write_all(format!("{banner}\r\n").as_bytes())
        .await?;

    let mut in_data = false;

    loop {
        let mut line = String::new();
        if conn.read_line(&mut line).await? == 0 {
            break;
        }
        let line = line.trim_end_matches(['\r', '\n']).to_owned();

        let key = if in_data {
            if line != "." {
                let line = line.strip_prefix('.').unwrap_or(&line).to_owned();
                transcript.lock().unwrap().message.push(line);
                continue;
            }

            in_data = false;
            ".".to_owned()
        } else {
            verb(&line)
        };

        transcript.lock().unwrap().commands.push(line);

        let reply = script.reply_to(&key);
        let stream = conn.get_mut();
        stream.write_all(format!("{reply}\r\n").as_bytes()).await?;
        stream.flush().await?;

        match key.as_str() {
            "DATA" if reply.starts_with('3') => in_data = true,
            "QUIT" => break,
            "STARTTLS" if reply.starts_with("220") => {
                if let Some(acceptor) = &acceptor {
                    let tls = acceptor.accept(conn.into_inner()).await?;
                    conn = BufReader::new(Box::new(tls));
                }
            }
            _ => {}
        }
    }

    Ok(())
}
