//! Customization Registry
//!
//! Programmatic customizations registered on the builder before
//! finalization. One slot per customization; re-registering a slot silently
//! overwrites the previous value (last write wins). The builder rejects
//! registration after sealing, so the registry itself never has to.
//!
//! The one-shot callbacks are `FnOnce` and are consumed by the assembler
//! during the single finalization run. The recoverability callbacks are
//! shared `Fn`s because the runtime may invoke them repeatedly after start.

use std::fmt;

use super::definition::{EndpointDefinition, PersistenceSettings, SerializerSettings};
use super::recoverability::{
    FailedMessageHook, RateLimitCallback, RecoverabilityCallbacks, RecoverabilityDecider,
};
use crate::config::{ConfigResult, ConfigSource};

pub(crate) type TransportCustomization<T> = Box<dyn FnOnce(&mut T) + Send>;
pub(crate) type TransportFactoryOverride<T> =
    Box<dyn FnOnce(Option<&dyn ConfigSource>) -> ConfigResult<T> + Send>;
pub(crate) type SerializerCustomization = Box<dyn FnOnce(&mut SerializerSettings) + Send>;
pub(crate) type PreviewCallback<T> = Box<dyn FnOnce(&mut EndpointDefinition<T>) + Send>;

/// Per-endpoint registry of user-supplied callbacks, invoked by the
/// assembler at fixed pipeline points
pub struct CustomizationRegistry<T> {
    pub(crate) transport_customization: Option<TransportCustomization<T>>,
    pub(crate) transport_factory_override: Option<TransportFactoryOverride<T>>,
    pub(crate) serializer_customization: Option<SerializerCustomization>,
    pub(crate) replacement_serializer: Option<SerializerSettings>,
    pub(crate) persistence: Option<PersistenceSettings>,
    pub(crate) preview: Option<PreviewCallback<T>>,
    pub(crate) on_rate_limit_started: Option<RateLimitCallback>,
    pub(crate) on_rate_limit_ended: Option<RateLimitCallback>,
    pub(crate) on_failed_message: Option<FailedMessageHook>,
    pub(crate) custom_recoverability_policy: Option<RecoverabilityDecider>,
}

impl<T> Default for CustomizationRegistry<T> {
    fn default() -> Self {
        CustomizationRegistry {
            transport_customization: None,
            transport_factory_override: None,
            serializer_customization: None,
            replacement_serializer: None,
            persistence: None,
            preview: None,
            on_rate_limit_started: None,
            on_rate_limit_ended: None,
            on_failed_message: None,
            custom_recoverability_policy: None,
        }
    }
}

impl<T> CustomizationRegistry<T> {
    /// Move the recoverability hooks out for policy resolution
    pub(crate) fn take_recoverability_callbacks(&mut self) -> RecoverabilityCallbacks {
        RecoverabilityCallbacks {
            on_rate_limit_started: self.on_rate_limit_started.take(),
            on_rate_limit_ended: self.on_rate_limit_ended.take(),
            on_failed_message: self.on_failed_message.take(),
            custom_policy: self.custom_recoverability_policy.take(),
        }
    }
}

impl<T> fmt::Debug for CustomizationRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomizationRegistry")
            .field("transport_customization", &self.transport_customization.is_some())
            .field(
                "transport_factory_override",
                &self.transport_factory_override.is_some(),
            )
            .field(
                "serializer_customization",
                &self.serializer_customization.is_some(),
            )
            .field("replacement_serializer", &self.replacement_serializer)
            .field("persistence", &self.persistence)
            .field("preview", &self.preview.is_some())
            .field("on_rate_limit_started", &self.on_rate_limit_started.is_some())
            .field("on_rate_limit_ended", &self.on_rate_limit_ended.is_some())
            .field("on_failed_message", &self.on_failed_message.is_some())
            .field(
                "custom_recoverability_policy",
                &self.custom_recoverability_policy.is_some(),
            )
            .finish()
    }
}
