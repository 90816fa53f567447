//! Rendered artefacts produced by the backend itself.

pub mod email;
