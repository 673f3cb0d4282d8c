//! Step-by-step SMTP relay client used to deliver contact requests.
//!
//! Generic "send mail" helpers cannot set the greeting name nor insist on
//! STARTTLS against a managed relay, so the session is driven one command at
//! a time and every failure names the step that raised it.

mod config;
mod error;
mod message;
mod relay;
mod session;
mod step;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use config::*;
pub use error::*;
pub use message::*;
pub use relay::*;
pub use step::*;
