//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods
//! that accept `&PgPool` as the first argument.

pub mod attendee_profile_repo;
pub mod event_repo;

pub use attendee_profile_repo::AttendeeProfileRepo;
pub use event_repo::EventRepo;
