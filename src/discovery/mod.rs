//! Discovery module: finding candidate videos
//!
//! This module contains:
//! - Page renderers (Browserless headless Chrome, plain HTTP)
//! - Watch-link extraction from rendered markup
//! - The `DiscoverySource` seam the crawl loop calls once per iteration

mod parser;
mod renderer;
mod source;

pub use parser::{parse_landing_page, ParsedLanding};
pub use renderer::{build_renderer, BrowserlessRenderer, HttpRenderer, PageRenderer, RenderError};
pub use source::{DiscoveryResult, DiscoverySource, EmptyReason, LandingPageSource};
