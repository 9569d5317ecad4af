//! # Messaging Runtime Contract
//!
//! The boundary between endpoint assembly and the external messaging
//! runtime. The core produces one sealed [`EndpointDefinition`] and calls a
//! single asynchronous start entry point; it never inspects the runtime
//! beyond the returned instance handle. Stopping, cancellation, and the
//! message-processing state machine are entirely the runtime's business.

use std::sync::Arc;

use async_trait::async_trait;

use crate::endpoint::{EndpointDefinition, TransportDefinition};

/// External messaging runtime capable of starting endpoints over transport
/// `T`.
///
/// Configuration resolution completes synchronously before this handoff;
/// only the runtime start itself is asynchronous.
#[async_trait]
pub trait MessagingRuntime<T: TransportDefinition>: Send + Sync {
    /// Handle to the running endpoint
    type Instance: Send;

    /// Start an endpoint from its sealed definition
    async fn start(&self, definition: Arc<EndpointDefinition<T>>) -> anyhow::Result<Self::Instance>;
}

/// Minimal contract for a running endpoint handle
#[async_trait]
pub trait EndpointInstance: Send {
    /// Stop the endpoint, completing in-flight work per the runtime's rules
    async fn stop(self) -> anyhow::Result<()>;
}
