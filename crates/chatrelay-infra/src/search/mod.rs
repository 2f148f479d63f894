//! Web search backends.

pub mod serpapi;
