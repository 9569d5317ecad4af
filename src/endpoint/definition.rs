//! Endpoint Definition
//!
//! The sealed artifact produced by finalization: one immutable value holding
//! everything the messaging runtime needs to start the endpoint. Fields are
//! public so the registered preview callback can apply last-look mutations;
//! once finalization wraps the definition in an `Arc`, it is effectively
//! immutable.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::json;

use super::recoverability::RecoverabilityPolicy;
use super::transport::{TransportDefinition, TransportSpec};

/// Default queue processed messages are audited to
pub const DEFAULT_AUDIT_QUEUE: &str = "audit";

/// Name of the default wire serializer
pub const DEFAULT_SERIALIZER: &str = "system-json";

/// Copy of every successfully processed message goes to this queue.
/// Absence of the policy on the definition means auditing is disabled and
/// no audit sink exists at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditingPolicy {
    pub audit_queue: String,
}

impl Default for AuditingPolicy {
    fn default() -> Self {
        AuditingPolicy {
            audit_queue: DEFAULT_AUDIT_QUEUE.to_string(),
        }
    }
}

/// Function the runtime calls with each startup-diagnostics entry
pub type DiagnosticsWriter = fn(&str);

/// Process-wide no-op writer swapped in when diagnostics are disabled
pub fn noop_diagnostics_writer(_entry: &str) {}

fn default_diagnostics_writer(entry: &str) {
    tracing::debug!(target: "endpoint_core::diagnostics", entry, "startup diagnostics");
}

/// Startup diagnostics emission: on/off plus an optional custom root path.
/// The path override is applied independently of the on/off switch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticsPolicy {
    pub enabled: bool,
    pub custom_path: Option<PathBuf>,
}

impl Default for DiagnosticsPolicy {
    fn default() -> Self {
        DiagnosticsPolicy {
            enabled: true,
            custom_path: None,
        }
    }
}

impl DiagnosticsPolicy {
    /// The writer the runtime should hand diagnostics entries to
    pub fn writer(&self) -> DiagnosticsWriter {
        if self.enabled {
            default_diagnostics_writer
        } else {
            noop_diagnostics_writer
        }
    }
}

/// Optional overrides for how the endpoint is addressed. Blank configuration
/// values read as "not set"; only non-blank values land here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressingOverrides {
    pub local_address: Option<String>,
    pub public_return_address: Option<String>,
    pub instance_discriminator: Option<String>,
}

/// Wire serializer selection: a name the runtime resolves plus free-form
/// options for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializerSettings {
    pub name: String,
    pub options: BTreeMap<String, String>,
}

impl Default for SerializerSettings {
    fn default() -> Self {
        SerializerSettings {
            name: DEFAULT_SERIALIZER.to_string(),
            options: BTreeMap::new(),
        }
    }
}

impl SerializerSettings {
    pub fn named(name: impl Into<String>) -> Self {
        SerializerSettings {
            name: name.into(),
            options: BTreeMap::new(),
        }
    }

    /// Add an option, consuming and returning the settings for chaining
    pub fn option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }
}

/// Whether the endpoint uses the default serializer (optionally customized)
/// or a programmatically supplied replacement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SerializerSelection {
    Default(SerializerSettings),
    Replacement(SerializerSettings),
}

impl SerializerSelection {
    pub fn settings(&self) -> &SerializerSettings {
        match self {
            Self::Default(settings) | Self::Replacement(settings) => settings,
        }
    }

    pub fn is_replacement(&self) -> bool {
        matches!(self, Self::Replacement(_))
    }
}

/// Persistence engine selection. The engine itself is external; the
/// definition only records which one the runtime should wire up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistenceSettings {
    pub name: String,
    pub options: BTreeMap<String, String>,
}

impl PersistenceSettings {
    pub fn named(name: impl Into<String>) -> Self {
        PersistenceSettings {
            name: name.into(),
            options: BTreeMap::new(),
        }
    }

    pub fn option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }
}

/// Fully assembled endpoint configuration, handed to the messaging runtime's
/// start routine once sealed
#[derive(Debug)]
pub struct EndpointDefinition<T> {
    pub name: String,
    pub transport: TransportSpec<T>,
    pub auditing: Option<AuditingPolicy>,
    pub recoverability: RecoverabilityPolicy,
    pub send_only: bool,
    pub installers_enabled: bool,
    pub serializer: SerializerSelection,
    pub persistence: Option<PersistenceSettings>,
    pub diagnostics: DiagnosticsPolicy,
    pub addressing: AddressingOverrides,
}

impl<T: TransportDefinition> EndpointDefinition<T> {
    /// Render the definition into the startup-diagnostics payload governed
    /// by the diagnostics policy
    pub fn startup_diagnostics(&self) -> serde_json::Value {
        json!({
            "endpoint": self.name,
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "sendOnly": self.send_only,
            "installersEnabled": self.installers_enabled,
            "transport": {
                "definition": format!("{:?}", self.transport.transport),
                "purgeOnStartup": self.transport.purge_on_startup,
                "messageProcessingConcurrency": self.transport.message_processing_concurrency,
            },
            "auditing": self.auditing,
            "recoverability": {
                "errorQueue": self.recoverability.error_queue,
                "immediateRetries": self.recoverability.immediate_retries,
                "delayedRetries": self.recoverability.delayed_retries,
                "delayedTimeIncreaseSeconds": self
                    .recoverability
                    .delayed_time_increase
                    .map(|d| d.as_secs_f64()),
                "rateLimiting": self.recoverability.rate_limit.as_ref().map(|limit| json!({
                    "consecutiveFailures": limit.consecutive_failures,
                    "cooldownSeconds": limit.cooldown.as_secs_f64(),
                })),
            },
            "serializer": self.serializer.settings(),
            "persistence": self.persistence,
            "diagnostics": self.diagnostics,
            "addressing": self.addressing,
        })
    }

    /// Emit the startup diagnostics through the policy's writer
    pub fn write_startup_diagnostics(&self) {
        let writer = self.diagnostics.writer();
        writer(&self.startup_diagnostics().to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::transport::LocalTransport;

    fn definition() -> EndpointDefinition<LocalTransport> {
        EndpointDefinition {
            name: "my-endpoint".to_string(),
            transport: TransportSpec {
                transport: LocalTransport::default(),
                purge_on_startup: false,
                message_processing_concurrency: None,
            },
            auditing: Some(AuditingPolicy::default()),
            recoverability: RecoverabilityPolicy::default(),
            send_only: false,
            installers_enabled: false,
            serializer: SerializerSelection::Default(SerializerSettings::default()),
            persistence: None,
            diagnostics: DiagnosticsPolicy::default(),
            addressing: AddressingOverrides::default(),
        }
    }

    #[test]
    fn disabled_diagnostics_swap_in_the_noop_writer() {
        let policy = DiagnosticsPolicy {
            enabled: false,
            custom_path: None,
        };
        assert_eq!(policy.writer(), noop_diagnostics_writer as DiagnosticsWriter);

        let enabled = DiagnosticsPolicy::default();
        assert_ne!(enabled.writer(), noop_diagnostics_writer as DiagnosticsWriter);
    }

    #[test]
    fn startup_diagnostics_reflect_the_definition() {
        let mut definition = definition();
        definition.recoverability.immediate_retries = Some(3);

        let payload = definition.startup_diagnostics();

        assert_eq!(payload["endpoint"], "my-endpoint");
        assert_eq!(payload["auditing"]["audit_queue"], "audit");
        assert_eq!(payload["recoverability"]["errorQueue"], "error");
        assert_eq!(payload["recoverability"]["immediateRetries"], 3);
        assert_eq!(payload["serializer"]["name"], DEFAULT_SERIALIZER);
        assert!(payload["recoverability"]["rateLimiting"].is_null());
    }

    #[test]
    fn serializer_selection_exposes_inner_settings() {
        let replacement =
            SerializerSelection::Replacement(SerializerSettings::named("message-pack"));
        assert!(replacement.is_replacement());
        assert_eq!(replacement.settings().name, "message-pack");

        let default = SerializerSelection::Default(SerializerSettings::default());
        assert!(!default.is_replacement());
        assert_eq!(default.settings().name, DEFAULT_SERIALIZER);
    }
}
