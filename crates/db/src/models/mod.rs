//! Domain model structs and DTOs.
//!
//! Each submodule contains a `FromRow` + `Serialize` entity struct matching
//! the database row and a create DTO for inserts. Neither entity has an
//! update DTO: events and attendee profiles are write-once.

pub mod attendee;
pub mod event;
