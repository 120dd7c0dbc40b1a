//! Authentication primitives.
//!
//! - [`jwt`] -- verification of organizer access tokens issued by the
//!   external auth provider.

pub mod jwt;
