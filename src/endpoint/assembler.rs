//! Endpoint Assembly Pipeline
//!
//! The ordered application of every configuration step onto a single
//! definition. Runs exactly once per endpoint, triggered by the builder's
//! first finalization. Step order is fixed and part of the contract:
//!
//! 1. transport resolution (override factory wins over default construction,
//!    then post-construction customization)
//! 2. purge-on-startup
//! 3. message-processing concurrency limit
//! 4. auditing
//! 5. recoverability
//! 6. send-only mode
//! 7. installers enablement
//! 8. serializer selection
//! 9. diagnostics
//! 10. addressing overrides
//! 11. preview callback (last-look mutation of the assembled definition)
//!
//! Any failing step aborts the whole run; nothing is partially sealed.

use tracing::{debug, info};

use super::customizations::CustomizationRegistry;
use super::definition::{
    AddressingOverrides, AuditingPolicy, DiagnosticsPolicy, EndpointDefinition,
    SerializerSelection, SerializerSettings, DEFAULT_AUDIT_QUEUE,
};
use super::recoverability;
use super::transport::{TransportFactory, TransportSpec};
use crate::config::{values, ConfigResult, ConfigSection, ConfigSource};

/// Root configuration section every endpoint key lives under
pub const ENDPOINT_SECTION: &str = "Messaging:Endpoint";

/// Run the full assembly pipeline and produce the not-yet-sealed definition.
/// The builder wraps the result in an `Arc`, which is the seal.
pub(crate) fn assemble<F: TransportFactory>(
    name: &str,
    source: Option<&dyn ConfigSource>,
    factory: &F,
    customizations: &mut CustomizationRegistry<F::Transport>,
) -> ConfigResult<EndpointDefinition<F::Transport>> {
    let root = source.map(|source| ConfigSection::named(source, ENDPOINT_SECTION));

    let transport = resolve_transport(source, root.as_ref(), factory, customizations)?;

    let auditing = configure_auditing(root.as_ref())?;
    let recoverability = recoverability::resolve(
        root.as_ref().map(|r| r.section("Recoverability")).as_ref(),
        customizations.take_recoverability_callbacks(),
    )?;
    let send_only = read_bool(root.as_ref(), "SendOnly", false)?;
    let installers_enabled = match root.as_ref() {
        Some(root) => {
            let installers = root.section("Installers");
            match installers.value("Enable") {
                Some(raw) => values::parse_bool(&raw, &installers.key_path("Enable"))?,
                None => false,
            }
        }
        None => false,
    };
    let serializer = select_serializer(customizations);
    let diagnostics = configure_diagnostics(root.as_ref())?;
    let addressing = configure_addressing(root.as_ref());

    let mut definition = EndpointDefinition {
        name: name.to_string(),
        transport,
        auditing,
        recoverability,
        send_only,
        installers_enabled,
        serializer,
        persistence: customizations.persistence.take(),
        diagnostics,
        addressing,
    };

    if let Some(preview) = customizations.preview.take() {
        debug!(endpoint = %name, "invoking configuration preview callback");
        preview(&mut definition);
    }

    info!(
        endpoint = %name,
        send_only = definition.send_only,
        audited = definition.auditing.is_some(),
        serializer = %definition.serializer.settings().name,
        "endpoint configuration assembled"
    );

    Ok(definition)
}

fn resolve_transport<F: TransportFactory>(
    source: Option<&dyn ConfigSource>,
    root: Option<&ConfigSection<'_>>,
    factory: &F,
    customizations: &mut CustomizationRegistry<F::Transport>,
) -> ConfigResult<TransportSpec<F::Transport>> {
    let transport_section = root.map(|r| r.section("Transport"));

    // An override factory receives the raw configuration handle and strictly
    // takes precedence; the default factory is not invoked at all.
    let mut transport = match customizations.transport_factory_override.take() {
        Some(override_factory) => {
            debug!("constructing transport through registered override factory");
            override_factory(source)?
        }
        None => factory.create(transport_section.as_ref())?,
    };

    if let Some(customize) = customizations.transport_customization.take() {
        debug!("applying transport customization callback");
        customize(&mut transport);
    }

    let (purge_on_startup, message_processing_concurrency) = match transport_section.as_ref() {
        Some(section) => {
            let purge = match section.value("PurgeOnStartup") {
                Some(raw) => values::parse_bool(&raw, &section.key_path("PurgeOnStartup"))?,
                None => false,
            };
            let concurrency = match section.value("MessageProcessingConcurrency") {
                Some(raw) => Some(values::parse_u32(
                    &raw,
                    &section.key_path("MessageProcessingConcurrency"),
                )?),
                None => None,
            };
            (purge, concurrency)
        }
        None => (false, None),
    };

    Ok(TransportSpec {
        transport,
        purge_on_startup,
        message_processing_concurrency,
    })
}

fn configure_auditing(root: Option<&ConfigSection<'_>>) -> ConfigResult<Option<AuditingPolicy>> {
    let Some(root) = root else {
        return Ok(Some(AuditingPolicy::default()));
    };

    let auditing = root.section("Auditing");
    let enabled = match auditing.value("Enabled") {
        Some(raw) => values::parse_bool(&raw, &auditing.key_path("Enabled"))?,
        None => true,
    };
    if !enabled {
        debug!("auditing disabled; no audit sink will be configured");
        return Ok(None);
    }

    let audit_queue = auditing
        .non_blank("AuditQueue")
        .unwrap_or_else(|| DEFAULT_AUDIT_QUEUE.to_string());
    Ok(Some(AuditingPolicy { audit_queue }))
}

fn select_serializer<T>(customizations: &mut CustomizationRegistry<T>) -> SerializerSelection {
    if let Some(replacement) = customizations.replacement_serializer.take() {
        // A replaced serializer ignores any default-serializer customization.
        return SerializerSelection::Replacement(replacement);
    }

    let mut settings = SerializerSettings::default();
    if let Some(customize) = customizations.serializer_customization.take() {
        customize(&mut settings);
    }
    SerializerSelection::Default(settings)
}

fn configure_diagnostics(root: Option<&ConfigSection<'_>>) -> ConfigResult<DiagnosticsPolicy> {
    let Some(root) = root else {
        return Ok(DiagnosticsPolicy::default());
    };

    let diagnostics = root.section("Diagnostics");
    let enabled = match diagnostics.value("Enable") {
        Some(raw) => values::parse_bool(&raw, &diagnostics.key_path("Enable"))?,
        None => true,
    };
    let custom_path = diagnostics.non_blank("Path").map(Into::into);

    Ok(DiagnosticsPolicy {
        enabled,
        custom_path,
    })
}

fn configure_addressing(root: Option<&ConfigSection<'_>>) -> AddressingOverrides {
    let Some(root) = root else {
        return AddressingOverrides::default();
    };

    AddressingOverrides {
        local_address: root.non_blank("LocalAddressOverride"),
        public_return_address: root.non_blank("PublicReturnAddressOverride"),
        instance_discriminator: root.non_blank("EndpointInstanceDiscriminator"),
    }
}

fn read_bool(
    root: Option<&ConfigSection<'_>>,
    key: &str,
    default: bool,
) -> ConfigResult<bool> {
    let Some(root) = root else {
        return Ok(default);
    };
    match root.value(key) {
        Some(raw) => values::parse_bool(&raw, &root.key_path(key)),
        None => Ok(default),
    }
}
