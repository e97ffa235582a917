//! Dork-search subsystem.
//!
//! Fans a single query out across several public web search engines, parses
//! each engine's result markup with engine-specific rules, and merges the
//! harvested candidate URLs.

pub mod engines;
pub mod multi;

pub use engines::{default_engines, list_engines, HtmlSerpEngine, SearchEngine};
pub use multi::MultiEngineSearcher;
