//! Shared helpers for integration tests
#![allow(dead_code)] // not every test binary exercises every helper

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use endpoint_core::config::{ConfigResult, ConfigSection, MemorySource};
use endpoint_core::endpoint::{LocalTransport, LocalTransportFactory, ENDPOINT_SECTION};
use endpoint_core::runtime::{EndpointInstance, MessagingRuntime};
use endpoint_core::{EndpointDefinition, TransportFactory};

/// Build a configuration source from keys relative to the endpoint root
/// section
pub fn endpoint_config(pairs: &[(&str, &str)]) -> Arc<MemorySource> {
    let mut source = MemorySource::new();
    for (key, value) in pairs {
        source.insert(format!("{ENDPOINT_SECTION}:{key}"), *value);
    }
    Arc::new(source)
}

/// Local transport factory that counts how many times it constructs a
/// transport
#[derive(Clone, Default)]
pub struct CountingFactory {
    pub constructions: Arc<AtomicUsize>,
}

impl CountingFactory {
    pub fn count(&self) -> usize {
        self.constructions.load(Ordering::SeqCst)
    }
}

impl TransportFactory for CountingFactory {
    type Transport = LocalTransport;

    fn create(&self, section: Option<&ConfigSection<'_>>) -> ConfigResult<LocalTransport> {
        self.constructions.fetch_add(1, Ordering::SeqCst);
        LocalTransportFactory.create(section)
    }
}

/// Messaging runtime double that records starts and hands back a stoppable
/// instance
#[derive(Default)]
pub struct MockRuntime {
    pub starts: AtomicUsize,
}

pub struct MockInstance {
    pub endpoint_name: String,
}

#[async_trait]
impl MessagingRuntime<LocalTransport> for MockRuntime {
    type Instance = MockInstance;

    async fn start(
        &self,
        definition: Arc<EndpointDefinition<LocalTransport>>,
    ) -> anyhow::Result<Self::Instance> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        Ok(MockInstance {
            endpoint_name: definition.name.clone(),
        })
    }
}

#[async_trait]
impl EndpointInstance for MockInstance {
    async fn stop(self) -> anyhow::Result<()> {
        Ok(())
    }
}
