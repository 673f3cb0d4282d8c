use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct RelayConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Name checked against the relay certificate, defaults to `host`.
    #[serde(default)]
    pub server_name: Option<String>,
    /// Name announced in EHLO/HELO instead of the local hostname.
    #[serde(default = "default_client_id")]
    pub client_id: String,
    #[serde(default = "default_sender")]
    pub sender: String,
    #[serde(default = "default_recipient")]
    pub recipient: String,
    #[serde(default = "default_subject")]
    pub subject: String,
    #[serde(default = "default_starttls")]
    pub starttls: bool,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl RelayConfig {
    pub fn server_name(&self) -> &str {
        self.server_name.as_deref().unwrap_or(&self.host)
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            server_name: None,
            client_id: default_client_id(),
            sender: default_sender(),
            recipient: default_recipient(),
            subject: default_subject(),
            starttls: default_starttls(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_host() -> String {
    "smtp-relay.gmail.com".to_string()
}

fn default_port() -> u16 {
    587
}

fn default_client_id() -> String {
    "iri-labs.com".to_string()
}

fn default_sender() -> String {
    "www@iri-labs.com".to_string()
}

fn default_recipient() -> String {
    "wsc@iri-labs.com".to_string()
}

fn default_subject() -> String {
    "[www.iri-labs.com] new contact request".to_string()
}

fn default_starttls() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    30
}
