//! # Configuration Resolution
//!
//! Read-only access to the host-supplied configuration tree plus the typed
//! parsing layer the assembly pipeline is built on.
//!
//! The host owns the configuration tree and hands the core a [`ConfigSource`];
//! the core narrows it with [`ConfigSection`] views and converts raw string
//! values through the parsers in [`values`]. Every failure carries the
//! offending key path, the raw value, and the expected type.

pub mod error;
pub mod section;
pub mod values;

pub use error::{ConfigResult, ConfigurationError};
pub use section::{ConfigSection, ConfigSource, MemorySource, PATH_SEPARATOR};
