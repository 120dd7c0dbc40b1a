pub mod attendee;
pub mod collateral;
pub mod event;
pub mod headshot;
