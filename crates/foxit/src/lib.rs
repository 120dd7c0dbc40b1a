//! Foxit PDF Services client library.
//!
//! Converts rendered collateral HTML into PDF documents. The
//! [`PdfRenderer`](renderer::PdfRenderer) seam has a live strategy backed by
//! the Foxit HTML-to-PDF endpoint and a placeholder strategy used when no
//! client credentials are configured.

pub mod api;
pub mod renderer;

pub use renderer::{FoxitRenderer, PdfRenderer, PlaceholderRenderer, RenderError, RendererMode};
