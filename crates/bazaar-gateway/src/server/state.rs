//! Gateway state
//!
//! Application state for the gateway server.

use crate::broadcast::EventDispatcher;
use crate::connection::SessionRegistry;
use bazaar_common::AppConfig;
use bazaar_service::ServiceContext;
use std::sync::Arc;

/// Gateway application state
///
/// Holds all shared dependencies for the gateway server.
#[derive(Clone)]
pub struct GatewayState {
    /// Service context, used for token checks and room read gates
    service_context: Arc<ServiceContext>,
    /// Live sessions and room watchers
    registry: Arc<SessionRegistry>,
    /// Redis Pub/Sub fanout
    event_dispatcher: Arc<EventDispatcher>,
    config: Arc<AppConfig>,
}

impl GatewayState {
    pub fn new(
        service_context: ServiceContext,
        registry: Arc<SessionRegistry>,
        event_dispatcher: Arc<EventDispatcher>,
        config: AppConfig,
    ) -> Self {
        Self {
            service_context: Arc::new(service_context),
            registry,
            event_dispatcher,
            config: Arc::new(config),
        }
    }

    pub fn service_context(&self) -> &ServiceContext {
        &self.service_context
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    pub fn event_dispatcher(&self) -> &EventDispatcher {
        &self.event_dispatcher
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

impl std::fmt::Debug for GatewayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayState")
            .field("registry", &self.registry)
            .field("dispatcher_running", &self.event_dispatcher.is_running())
            .finish()
    }
}
