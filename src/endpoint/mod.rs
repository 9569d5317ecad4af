//! # Endpoint Assembly
//!
//! The configurable endpoint descriptor and the pipeline that turns it,
//! together with the host's configuration tree, into one sealed
//! [`EndpointDefinition`].
//!
//! Typical flow: construct an [`EndpointBuilder`] (or the built-in
//! [`LocalEndpoint`]), register any programmatic customizations, then either
//! [`finalize`](EndpointBuilder::finalize) to obtain the sealed definition or
//! [`start`](EndpointBuilder::start) to hand it straight to a messaging
//! runtime. Sealing happens exactly once per descriptor.

pub mod assembler;
pub mod builder;
pub mod customizations;
pub mod definition;
pub mod recoverability;
pub mod transport;

pub use assembler::ENDPOINT_SECTION;
pub use builder::{EndpointBuilder, LocalEndpoint};
pub use customizations::CustomizationRegistry;
pub use definition::{
    noop_diagnostics_writer, AddressingOverrides, AuditingPolicy, DiagnosticsPolicy,
    DiagnosticsWriter, EndpointDefinition, PersistenceSettings, SerializerSelection,
    SerializerSettings, DEFAULT_AUDIT_QUEUE, DEFAULT_SERIALIZER,
};
pub use recoverability::{
    FailedMessageHook, FailureContext, RateLimitCallback, RateLimitPolicy, RecoverabilityAction,
    RecoverabilityDecider, RecoverabilityPolicy, DEFAULT_ERROR_QUEUE,
};
pub use transport::{
    apply_common_transport_settings, LocalTransport, LocalTransportFactory, TransactionMode,
    TransportDefinition, TransportFactory, TransportSpec, UnknownTransactionMode,
};
