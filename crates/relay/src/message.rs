use irilabs_contact::ContactRequest;
use lettre::{
    Message,
    message::{Mailbox, header::ContentType},
};
use serde::Serialize;

use crate::SessionError;

/// Renders the request as tab-indented JSON, keys in log order.
pub fn render_body(request: &ContactRequest) -> Result<String, serde_json::Error> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    request.serialize(&mut serializer)?;

    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Fixed header part of every relayed message.
#[derive(Debug, Clone)]
pub struct Letterhead {
    pub from: Mailbox,
    pub to: Mailbox,
    pub subject: String,
}

impl Letterhead {
    /// Full RFC 5322 message: From, To, Subject, a blank line, then the body.
    pub fn compose(&self, request: &ContactRequest) -> Result<Vec<u8>, SessionError> {
        let body = render_body(request).map_err(|e| SessionError::Message(e.to_string()))?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(self.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(body)
            .map_err(|e| SessionError::Message(e.to_string()))?;

        Ok(message.formatted())
    }
}
