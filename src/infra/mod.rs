//! Infrastructure adapters and runtime bootstrap.

pub mod content;
pub mod error;
pub mod http;
pub mod mailer;
pub mod submissions;
pub mod telemetry;
pub mod webhook;
