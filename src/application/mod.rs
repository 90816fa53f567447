//! Application services layer.

pub mod blog;
pub mod chat;
pub mod contact;
pub mod error;
