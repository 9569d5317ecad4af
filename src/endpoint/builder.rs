//! Endpoint Builder
//!
//! The mutable descriptor callers configure before finalization. Two states:
//! building and sealed, with sealing terminal. Every `configure_*` /
//! `customize_*` / `override_*` / `preview_*` call is legal only while
//! building; afterwards they fail with
//! [`ConfigurationError::AlreadySealed`].
//!
//! Finalization is idempotent: the assembly pipeline runs exactly once, the
//! sealed definition is cached, and every subsequent `finalize` call returns
//! the same `Arc`. `start` finalizes if needed and hands the sealed
//! definition to the messaging runtime.
//!
//! The builder takes `&mut self` for every mutation, so concurrent mutation
//! of one descriptor is ruled out at compile time; build on one owning
//! thread during startup, exactly as intended.

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use tracing::info;

use super::assembler::{self, ENDPOINT_SECTION};
use super::customizations::CustomizationRegistry;
use super::definition::{EndpointDefinition, PersistenceSettings, SerializerSettings};
use super::recoverability::{FailureContext, RecoverabilityAction};
use super::transport::{LocalTransportFactory, TransportFactory};
use crate::config::{ConfigResult, ConfigSection, ConfigSource, ConfigurationError};
use crate::runtime::MessagingRuntime;

/// Configurable endpoint descriptor, generic over the transport factory the
/// concrete endpoint supplies
pub struct EndpointBuilder<F: TransportFactory> {
    name: String,
    source: Option<Arc<dyn ConfigSource>>,
    factory: F,
    customizations: CustomizationRegistry<F::Transport>,
    sealed: Option<Arc<EndpointDefinition<F::Transport>>>,
}

impl<F: TransportFactory> EndpointBuilder<F> {
    /// Create a descriptor with an explicit, non-blank endpoint name and no
    /// configuration tree
    pub fn with_factory(factory: F, name: impl Into<String>) -> ConfigResult<Self> {
        Self::build(factory, name.into(), None)
    }

    /// Create a descriptor with an explicit name plus a configuration tree
    pub fn with_factory_and_config(
        factory: F,
        name: impl Into<String>,
        source: Arc<dyn ConfigSource>,
    ) -> ConfigResult<Self> {
        Self::build(factory, name.into(), Some(source))
    }

    /// Create a descriptor entirely from configuration; the tree must supply
    /// the endpoint name
    pub fn from_config_with_factory(
        factory: F,
        source: Arc<dyn ConfigSource>,
    ) -> ConfigResult<Self> {
        let name = ConfigSection::named(source.as_ref(), ENDPOINT_SECTION)
            .non_blank("EndpointName")
            .ok_or_else(|| {
                ConfigurationError::missing_required_value(
                    format!("{ENDPOINT_SECTION}:EndpointName"),
                    "set the endpoint name in configuration or construct with an explicit name",
                )
            })?;
        Self::build(factory, name, Some(source))
    }

    fn build(
        factory: F,
        name: String,
        source: Option<Arc<dyn ConfigSource>>,
    ) -> ConfigResult<Self> {
        if name.trim().is_empty() {
            return Err(ConfigurationError::missing_required_value(
                "EndpointName",
                "explicit endpoint name must not be blank",
            ));
        }

        Ok(EndpointBuilder {
            name,
            source,
            factory,
            customizations: CustomizationRegistry::default(),
            sealed: None,
        })
    }

    /// Endpoint name this descriptor was created with
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether finalization has already happened
    pub fn is_sealed(&self) -> bool {
        self.sealed.is_some()
    }

    fn ensure_building(&self, operation: &str) -> ConfigResult<()> {
        if self.sealed.is_some() {
            return Err(ConfigurationError::already_sealed(&self.name, operation));
        }
        Ok(())
    }

    /// Register a callback applied to the transport after construction,
    /// whichever construction strategy produced it
    pub fn customize_transport(
        &mut self,
        customization: impl FnOnce(&mut F::Transport) + Send + 'static,
    ) -> ConfigResult<()> {
        self.ensure_building("customize_transport")?;
        self.customizations.transport_customization = Some(Box::new(customization));
        Ok(())
    }

    /// Replace default transport construction with a factory of the caller's
    /// own; it receives the raw configuration handle
    pub fn override_transport(
        &mut self,
        factory: impl FnOnce(Option<&dyn ConfigSource>) -> ConfigResult<F::Transport> + Send + 'static,
    ) -> ConfigResult<()> {
        self.ensure_building("override_transport")?;
        self.customizations.transport_factory_override = Some(Box::new(factory));
        Ok(())
    }

    /// Customize the default serializer. Ignored if the default serializer
    /// is later replaced.
    pub fn customize_default_serializer(
        &mut self,
        customization: impl FnOnce(&mut SerializerSettings) + Send + 'static,
    ) -> ConfigResult<()> {
        self.ensure_building("customize_default_serializer")?;
        self.customizations.serializer_customization = Some(Box::new(customization));
        Ok(())
    }

    /// Replace the default serializer outright
    pub fn replace_default_serializer(
        &mut self,
        serializer: SerializerSettings,
    ) -> ConfigResult<()> {
        self.ensure_building("replace_default_serializer")?;
        self.customizations.replacement_serializer = Some(serializer);
        Ok(())
    }

    /// Record the persistence engine the runtime should wire up
    pub fn use_persistence(&mut self, persistence: PersistenceSettings) -> ConfigResult<()> {
        self.ensure_building("use_persistence")?;
        self.customizations.persistence = Some(persistence);
        Ok(())
    }

    /// Register a last-look callback invoked with the fully assembled
    /// definition right before it is sealed
    pub fn preview_configuration(
        &mut self,
        preview: impl FnOnce(&mut EndpointDefinition<F::Transport>) + Send + 'static,
    ) -> ConfigResult<()> {
        self.ensure_building("preview_configuration")?;
        self.customizations.preview = Some(Box::new(preview));
        Ok(())
    }

    /// Async notification for when automatic rate limiting kicks in
    pub fn on_rate_limit_started<Fut>(
        &mut self,
        callback: impl Fn() -> Fut + Send + Sync + 'static,
    ) -> ConfigResult<()>
    where
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.ensure_building("on_rate_limit_started")?;
        self.customizations.on_rate_limit_started = Some(Arc::new(move || callback().boxed()));
        Ok(())
    }

    /// Async notification for when automatic rate limiting ends
    pub fn on_rate_limit_ended<Fut>(
        &mut self,
        callback: impl Fn() -> Fut + Send + Sync + 'static,
    ) -> ConfigResult<()>
    where
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.ensure_building("on_rate_limit_ended")?;
        self.customizations.on_rate_limit_ended = Some(Arc::new(move || callback().boxed()));
        Ok(())
    }

    /// Header customization applied to failed messages before they are
    /// routed to the error queue
    pub fn on_failed_message(
        &mut self,
        callback: impl Fn(&mut BTreeMap<String, String>) + Send + Sync + 'static,
    ) -> ConfigResult<()> {
        self.ensure_building("on_failed_message")?;
        self.customizations.on_failed_message = Some(Arc::new(callback));
        Ok(())
    }

    /// Replace the runtime's default recoverability decision with a custom
    /// policy
    pub fn use_custom_recoverability_policy(
        &mut self,
        policy: impl Fn(&FailureContext) -> RecoverabilityAction + Send + Sync + 'static,
    ) -> ConfigResult<()> {
        self.ensure_building("use_custom_recoverability_policy")?;
        self.customizations.custom_recoverability_policy = Some(Arc::new(policy));
        Ok(())
    }

    /// Run the assembly pipeline and seal the definition.
    ///
    /// Idempotent: the pipeline runs exactly once and every subsequent call
    /// returns the same sealed `Arc`. On failure the descriptor is left
    /// unsealed and must be discarded, not reused.
    pub fn finalize(&mut self) -> ConfigResult<Arc<EndpointDefinition<F::Transport>>> {
        if let Some(sealed) = &self.sealed {
            return Ok(Arc::clone(sealed));
        }

        let definition = assembler::assemble(
            &self.name,
            self.source.as_deref(),
            &self.factory,
            &mut self.customizations,
        )?;

        let sealed = Arc::new(definition);
        self.sealed = Some(Arc::clone(&sealed));
        info!(endpoint = %self.name, "endpoint definition sealed");
        Ok(sealed)
    }

    /// Finalize if needed, then hand the sealed definition to the messaging
    /// runtime and return the running instance handle
    pub async fn start<R>(&mut self, runtime: &R) -> anyhow::Result<R::Instance>
    where
        R: MessagingRuntime<F::Transport>,
    {
        let definition = self.finalize()?;
        definition.write_startup_diagnostics();
        runtime.start(definition).await
    }
}

impl<F: TransportFactory> fmt::Debug for EndpointBuilder<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointBuilder")
            .field("name", &self.name)
            .field("configured", &self.source.is_some())
            .field("sealed", &self.sealed.is_some())
            .field("customizations", &self.customizations)
            .finish()
    }
}

/// Endpoint over the built-in local development transport
pub type LocalEndpoint = EndpointBuilder<LocalTransportFactory>;

impl EndpointBuilder<LocalTransportFactory> {
    /// Local endpoint with an explicit name and no configuration tree
    pub fn new(name: impl Into<String>) -> ConfigResult<Self> {
        Self::with_factory(LocalTransportFactory, name)
    }

    /// Local endpoint with an explicit name plus configuration
    pub fn with_config(name: impl Into<String>, source: Arc<dyn ConfigSource>) -> ConfigResult<Self> {
        Self::with_factory_and_config(LocalTransportFactory, name, source)
    }

    /// Local endpoint named through configuration
    pub fn from_config(source: Arc<dyn ConfigSource>) -> ConfigResult<Self> {
        Self::from_config_with_factory(LocalTransportFactory, source)
    }
}
