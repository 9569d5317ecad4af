//! # Endpoint Core
//!
//! Configuration-driven endpoint assembly for messaging runtimes.
//!
//! ## Overview
//!
//! The crate builds a deployable messaging-endpoint definition from a
//! hierarchical, externally supplied configuration tree: transport
//! selection, auditing, failure and recoverability policy, concurrency
//! limits, diagnostics, addressing, and serialization. The messaging
//! runtime itself — delivery, persistence engines, wire codecs — stays
//! outside; the crate only parameterizes it and hands over one sealed
//! configuration object.
//!
//! The heart of the crate is the layered configuration-resolution and
//! endpoint-assembly pipeline: ordered configuration steps that read nested
//! sections, apply typed defaults, validate raw string values against their
//! declared types, compose programmatic customization callbacks with
//! configuration-driven settings, and produce one immutable endpoint
//! definition exactly once. Malformed configuration fails fast during
//! finalization; nothing is retried or partially applied.
//!
//! ## Module Organization
//!
//! - [`config`] - configuration access contracts and typed value parsing
//! - [`endpoint`] - the builder, the assembly pipeline, and the policies it
//!   resolves
//! - [`runtime`] - async contracts for the external messaging runtime
//! - [`logging`] - console logging initialization for binaries and tests
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use endpoint_core::config::MemorySource;
//! use endpoint_core::endpoint::LocalEndpoint;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let source = Arc::new(
//!     MemorySource::new()
//!         .set("Messaging:Endpoint:EndpointName", "orders")
//!         .set("Messaging:Endpoint:Recoverability:Immediate:NumberOfRetries", "3"),
//! );
//!
//! let mut endpoint = LocalEndpoint::from_config(source)?;
//! endpoint.customize_transport(|transport| {
//!     transport.restrict_payload_size = false;
//! })?;
//!
//! let definition = endpoint.finalize()?;
//! assert_eq!(definition.name, "orders");
//! assert_eq!(definition.recoverability.immediate_retries, Some(3));
//! # Ok(())
//! # }
//! ```
//!
//! Configuration mutates the descriptor up until it is sealed; sealing
//! happens at most once, and repeated finalization returns the same sealed
//! definition without re-running any side-effecting step.

pub mod config;
pub mod endpoint;
pub mod logging;
pub mod runtime;

pub use config::{ConfigResult, ConfigSection, ConfigSource, ConfigurationError, MemorySource};
pub use endpoint::{
    AddressingOverrides, AuditingPolicy, DiagnosticsPolicy, EndpointBuilder, EndpointDefinition,
    LocalEndpoint, LocalTransport, LocalTransportFactory, PersistenceSettings,
    RecoverabilityAction, RecoverabilityPolicy, SerializerSelection, SerializerSettings,
    TransactionMode, TransportDefinition, TransportFactory, TransportSpec, ENDPOINT_SECTION,
};
pub use runtime::{EndpointInstance, MessagingRuntime};
