//! Core data models for the chunked media relay.
//!
//! These entities describe the binary input, the chunks cut from it, the
//! remote container the chunks land in, and the reference string that ties
//! them back together. Persisted notes map to SQLite via `sqlx::FromRow`;
//! everything serializes as JSON via `serde`.

pub mod container;
pub mod media;
pub mod note;
pub mod reference;
