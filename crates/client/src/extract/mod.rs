//! Link extraction from cached search responses.

pub mod links;

pub use links::{RESOURCE_SUFFIX, extract_links};
