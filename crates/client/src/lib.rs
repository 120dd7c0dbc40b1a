//! Client side of EventConnect registration.
//!
//! - [`api`] -- typed HTTP client for the EventConnect API.
//! - [`workflow`] -- drives a [`RegistrationSession`] through photo upload,
//!   headshot generation, polling, review and persistence.
//!
//! [`RegistrationSession`]: eventconnect_core::registration::RegistrationSession

pub mod api;
pub mod workflow;

pub use api::{ApiClient, AttendeeSink, ClientError, StoredAttendee};
pub use workflow::{AbandonHandle, GenerationError, RegistrationWorkflow, WorkflowError};
