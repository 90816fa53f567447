//! Domain layer types and invariants.

pub mod chat;
pub mod contact;
pub mod error;
pub mod posts;
