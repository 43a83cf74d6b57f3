#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![forbid(unsafe_code)]

pub mod events;
pub mod fetch;
pub mod parsers;
pub mod poll;
pub mod votes;
