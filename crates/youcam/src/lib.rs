//! YouCam headshot API client library.
//!
//! Provides the REST wrapper for the YouCam headshot endpoints, the
//! [`HeadshotProvider`](provider::HeadshotProvider) seam with live and
//! placeholder strategies, and the task status poller used by the
//! registration workflow.

pub mod api;
pub mod poller;
pub mod provider;

pub use provider::{HeadshotProvider, PlaceholderProvider, ProviderError, ProviderMode, YouCamProvider};
