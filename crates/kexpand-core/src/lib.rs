//! Template expansion for kexpand.
//!
//! This crate handles:
//! - Resolving substitution values from YAML files and `key=value` pairs
//! - Reading the template from a file or stdin
//! - Expanding `$(key)`, `$((key))` and `{{key}}` tokens

pub mod error;
pub mod expand;
pub mod source;
pub mod values;

pub use error::{Error, Result};
pub use expand::{Expansion, Syntax, expand, expand_pass};
pub use source::read_template;
pub use values::{Value, ValueSources, ValueTable, render};
