//! Screendex - movie/TV metadata search aggregator
//!
//! Answers one query -- "find movies or series matching title/actor/type/genre
//! filters" -- by fanning out to two external metadata providers, merging
//! their fields into a canonical record, and caching intermediate results.
//!
//! This library crate exposes the core functionality for integration testing.

pub mod cache;
pub mod config;
pub mod metadata;
pub mod search;
pub mod server;
