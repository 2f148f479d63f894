//! Web search port.

pub mod provider;
