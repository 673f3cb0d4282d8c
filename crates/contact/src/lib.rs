//! Contact form core: the submitted record, the topic registry, the
//! append-only submission log and the pipeline tying them to a mail relay.

mod error;
mod form;
mod log;
mod service;
mod topic;

pub use error::*;
pub use form::*;
pub use log::*;
pub use service::*;
pub use topic::*;
