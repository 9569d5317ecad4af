//! Transport Resolution
//!
//! The transport is the pluggable capability that physically moves messages.
//! The core never implements delivery; it only decides which transport
//! instance an endpoint uses and applies the configuration-driven settings
//! shared by all transports.
//!
//! Resolution strategies, exactly one of which is used per endpoint:
//! - default construction through the endpoint's [`TransportFactory`],
//!   reading transport-specific keys from the `Transport` section
//! - a programmatically registered override factory, which receives the raw
//!   configuration handle and strictly takes precedence
//!
//! After construction, a registered post-construction customization callback
//! runs on the transport before it is attached to the endpoint definition,
//! so callers can override configuration-driven values unconditionally.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::{values, ConfigResult, ConfigSection};

/// Transaction guarantees requested from the transport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionMode {
    /// No transaction; messages may be lost on failure
    None,
    /// The receive operation itself is transactional
    ReceiveOnly,
    /// Outgoing sends are atomic with the receive
    SendsAtomicWithReceive,
    /// Receive and sends share an ambient distributed transaction
    TransactionScope,
}

impl TransactionMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::ReceiveOnly => "ReceiveOnly",
            Self::SendsAtomicWithReceive => "SendsAtomicWithReceive",
            Self::TransactionScope => "TransactionScope",
        }
    }
}

/// Error for transaction mode values that match no variant
#[derive(Debug, Clone)]
pub struct UnknownTransactionMode(pub String);

impl fmt::Display for UnknownTransactionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown transport transaction mode '{}'", self.0)
    }
}

impl std::error::Error for UnknownTransactionMode {}

impl FromStr for TransactionMode {
    type Err = UnknownTransactionMode;

    /// Case-sensitive exact match. `receiveonly` is rejected; only the
    /// canonical variant spellings parse.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "None" => Ok(Self::None),
            "ReceiveOnly" => Ok(Self::ReceiveOnly),
            "SendsAtomicWithReceive" => Ok(Self::SendsAtomicWithReceive),
            "TransactionScope" => Ok(Self::TransactionScope),
            _ => Err(UnknownTransactionMode(s.to_string())),
        }
    }
}

impl fmt::Display for TransactionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Opaque transport capability the endpoint definition carries.
///
/// Concrete transports are defined by the messaging runtime integration;
/// the core only needs to apply the shared configuration-driven settings.
pub trait TransportDefinition: fmt::Debug + Send + Sync + 'static {
    fn set_transaction_mode(&mut self, mode: TransactionMode);
}

/// Default transport construction capability, supplied by the concrete
/// endpoint implementation. Absence is impossible by construction: the
/// builder is generic over its factory.
pub trait TransportFactory: Send {
    type Transport: TransportDefinition;

    /// Construct the transport from the endpoint's `Transport` configuration
    /// section, when one exists.
    fn create(&self, section: Option<&ConfigSection<'_>>) -> ConfigResult<Self::Transport>;
}

/// Apply the configuration-driven settings shared by every transport.
///
/// Concrete factories call this before reading their transport-specific keys.
pub fn apply_common_transport_settings<T: TransportDefinition>(
    section: Option<&ConfigSection<'_>>,
    transport: &mut T,
) -> ConfigResult<()> {
    if let Some(section) = section {
        if let Some(raw) = section.value("TransportTransactionMode") {
            let mode = values::parse_enum::<TransactionMode>(
                &raw,
                &section.key_path("TransportTransactionMode"),
            )?;
            transport.set_transaction_mode(mode);
        }
    }
    Ok(())
}

/// The resolved transport plus the endpoint-level settings that travel with it
#[derive(Debug)]
pub struct TransportSpec<T> {
    pub transport: T,
    pub purge_on_startup: bool,
    pub message_processing_concurrency: Option<u32>,
}

/// Development transport that moves messages through a directory on the
/// local filesystem. Useful for tests and local runs; not for production.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalTransport {
    pub storage_directory: Option<PathBuf>,
    pub restrict_payload_size: bool,
    pub transaction_mode: Option<TransactionMode>,
}

impl Default for LocalTransport {
    fn default() -> Self {
        LocalTransport {
            storage_directory: None,
            restrict_payload_size: true,
            transaction_mode: None,
        }
    }
}

impl TransportDefinition for LocalTransport {
    fn set_transaction_mode(&mut self, mode: TransactionMode) {
        self.transaction_mode = Some(mode);
    }
}

/// Factory for [`LocalTransport`], reading `StorageDirectory` and
/// `RestrictPayloadSize` in addition to the common transport settings.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalTransportFactory;

impl TransportFactory for LocalTransportFactory {
    type Transport = LocalTransport;

    fn create(&self, section: Option<&ConfigSection<'_>>) -> ConfigResult<LocalTransport> {
        let mut transport = LocalTransport::default();

        apply_common_transport_settings(section, &mut transport)?;

        if let Some(section) = section {
            if let Some(directory) = section.non_blank("StorageDirectory") {
                transport.storage_directory = Some(PathBuf::from(directory));
            }

            if let Some(raw) = section.value("RestrictPayloadSize") {
                transport.restrict_payload_size =
                    values::parse_bool(&raw, &section.key_path("RestrictPayloadSize"))?;
            }
        }

        Ok(transport)
    }
}
