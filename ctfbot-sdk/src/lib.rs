//! Shared types and the upstream HTTP client for ctfbot.
//!
//! The `objects` module holds the normalized event records, vote records and
//! the reaction payload exchanged with the chat collaborator. The `client`
//! module (behind the `client` feature) talks to CTFtime.

#[cfg(feature = "client")]
pub mod client;
pub mod objects;
