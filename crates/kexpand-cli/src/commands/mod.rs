//! CLI command implementations.

pub mod expand;
