use std::sync::Arc;

use serde::Deserialize;

/// A subject a visitor can pick on the contact form.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Topic {
    pub key: String,
    pub label: String,
}

impl Topic {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
        }
    }
}

/// Read-only registry of topics, cheap to clone and share between requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topics(Arc<[Topic]>);

impl Topics {
    pub fn new(topics: impl IntoIterator<Item = Topic>) -> Self {
        Self(topics.into_iter().collect())
    }

    pub fn label(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|topic| topic.key == key)
            .map(|topic| topic.label.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Topic> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for Topics {
    fn default() -> Self {
        Self::new(default_topics())
    }
}

impl<'a> IntoIterator for &'a Topics {
    type Item = &'a Topic;
    type IntoIter = std::slice::Iter<'a, Topic>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub fn default_topics() -> Vec<Topic> {
    vec![
        Topic::new("jobs", "Jobs"),
        Topic::new("info", "General Info"),
        Topic::new("available", "Request availability"),
        Topic::new("triage", "Request triage"),
        Topic::new("join", "Join our network"),
    ]
}
