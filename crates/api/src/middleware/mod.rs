//! Request extractors.
//!
//! - [`auth::Organizer`] -- the authenticated organizer behind a Bearer token.

pub mod auth;
