//! Search provider adapters.

pub mod duckduckgo;
pub mod serpapi;

pub use duckduckgo::DuckDuckGoProvider;
pub use serpapi::SerpApiProvider;
