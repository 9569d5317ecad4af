//! Hierarchical Configuration Access
//!
//! The host application supplies the configuration tree; the core only
//! requires two capabilities from it: look up a raw string value by path,
//! and narrow the view to a sub-section. [`ConfigSource`] is that contract,
//! and [`ConfigSection`] is a borrowed prefix view over a source.
//!
//! Paths are colon-separated (`Messaging:Endpoint:Auditing:AuditQueue`).
//! The tree is read-only; the core never mutates it.
//!
//! Two source implementations ship with the crate:
//! - [`MemorySource`], an in-memory key/value map used by tests and simple
//!   hosts
//! - an adapter for [`config::Config`], so layered file/env configuration
//!   built with the `config` crate can be fed in directly

use std::collections::BTreeMap;

/// Separator between path segments
pub const PATH_SEPARATOR: char = ':';

/// Read-only hierarchical configuration supplied by the host application
pub trait ConfigSource: Send + Sync {
    /// Look up the raw string value stored at a colon-separated path.
    ///
    /// Returns `None` when no value exists at that path. Type conversion
    /// is the caller's responsibility.
    fn get(&self, path: &str) -> Option<String>;
}

/// Borrowed view over one sub-tree of a [`ConfigSource`]
#[derive(Clone)]
pub struct ConfigSection<'a> {
    source: &'a dyn ConfigSource,
    path: String,
}

impl<'a> ConfigSection<'a> {
    /// View over the root of a source
    pub fn root(source: &'a dyn ConfigSource) -> Self {
        ConfigSection {
            source,
            path: String::new(),
        }
    }

    /// View over the sub-tree at `path`
    pub fn named(source: &'a dyn ConfigSource, path: impl Into<String>) -> Self {
        ConfigSection {
            source,
            path: path.into(),
        }
    }

    /// Narrow the view to a nested section
    pub fn section(&self, name: &str) -> ConfigSection<'a> {
        ConfigSection {
            source: self.source,
            path: self.join(name),
        }
    }

    /// Raw value stored under `key`, relative to this section
    pub fn value(&self, key: &str) -> Option<String> {
        self.source.get(&self.join(key))
    }

    /// Value under `key` with blank and whitespace-only values treated as
    /// absent. Used for keys where an empty override is meaningless.
    pub fn non_blank(&self, key: &str) -> Option<String> {
        self.value(key).filter(|v| !v.trim().is_empty())
    }

    /// Absolute path of this section within the source
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Absolute path of `key` within the source, for error reporting
    pub fn key_path(&self, key: &str) -> String {
        self.join(key)
    }

    fn join(&self, key: &str) -> String {
        if self.path.is_empty() {
            key.to_string()
        } else {
            format!("{}{}{}", self.path, PATH_SEPARATOR, key)
        }
    }
}

impl std::fmt::Debug for ConfigSection<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigSection")
            .field("path", &self.path)
            .finish()
    }
}

/// In-memory configuration source backed by a flat key/value map
///
/// The keys are full colon-separated paths. Primarily used by tests and by
/// hosts that assemble configuration programmatically.
#[derive(Debug, Default, Clone)]
pub struct MemorySource {
    values: BTreeMap<String, String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value, consuming and returning the source for chaining
    pub fn set(mut self, path: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(path.into(), value.into());
        self
    }

    /// Add a value in place
    pub fn insert(&mut self, path: impl Into<String>, value: impl Into<String>) {
        self.values.insert(path.into(), value.into());
    }
}

impl ConfigSource for MemorySource {
    fn get(&self, path: &str) -> Option<String> {
        self.values.get(path).cloned()
    }
}

/// Adapter for configuration trees built with the `config` crate.
///
/// The `config` crate separates path segments with dots; colon paths are
/// translated on lookup. Lookups that fail for any reason (missing key,
/// non-string-convertible value) read as absent.
impl ConfigSource for config::Config {
    fn get(&self, path: &str) -> Option<String> {
        let key = path.replace(PATH_SEPARATOR, ".");
        self.get_string(&key).ok()
    }
}
