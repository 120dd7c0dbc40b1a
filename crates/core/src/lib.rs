//! Domain logic shared by the EventConnect server and client.
//!
//! Everything here is free of I/O: error types, validation rules, the
//! headshot task poll state machine, the registration wizard session,
//! upload image preparation and printable collateral rendering.

pub mod collateral;
pub mod error;
pub mod headshot;
pub mod image_prep;
pub mod registration;
pub mod types;
pub mod validation;
