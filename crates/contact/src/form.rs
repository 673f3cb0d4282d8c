use serde::{Deserialize, Serialize};

/// One contact form submission, as logged and as relayed.
///
/// Field names and order are part of the on-disk log format.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContactRequest {
    pub net_addr: String,
    pub name: String,
    pub institute: String,
    pub phone: String,
    pub country: String,
    pub subject: String,
    pub body: String,
}

/// The six fields read from an inbound form. Missing fields are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ContactForm {
    pub name: String,
    pub institute: String,
    pub phone: String,
    pub country: String,
    pub subject: String,
    pub body: String,
}

impl ContactForm {
    /// Builds a form from raw `(key, value)` pairs. The first value of a key
    /// wins and keys outside the six recognised ones are ignored.
    pub fn from_fields<K, V>(fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut form = ContactForm::default();
        let mut seen = [false; 6];

        for (key, value) in fields {
            let (idx, slot) = match key.as_ref() {
                "name" => (0, &mut form.name),
                "institute" => (1, &mut form.institute),
                "phone" => (2, &mut form.phone),
                "country" => (3, &mut form.country),
                "subject" => (4, &mut form.subject),
                "body" => (5, &mut form.body),
                _ => continue,
            };

            if !seen[idx] {
                seen[idx] = true;
                *slot = value.into();
            }
        }

        form
    }

    pub fn into_request(self, net_addr: impl Into<String>) -> ContactRequest {
        ContactRequest {
            net_addr: net_addr.into(),
            name: self.name,
            institute: self.institute,
            phone: self.phone,
            country: self.country,
            subject: self.subject,
            body: self.body,
        }
    }
}
