use std::sync::Arc;

use assetreg_events::EventBus;

use crate::config::ServerConfig;
use crate::reference::ReferenceData;
use crate::store::AssetRepository;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (every field is behind an `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration (token settings are read by the auth extractor).
    pub config: Arc<ServerConfig>,
    /// Asset storage.
    pub repo: Arc<dyn AssetRepository>,
    /// Depreciation groups and role definitions, fixed for the process lifetime.
    pub reference: Arc<ReferenceData>,
    /// Centralized event bus for publishing register events.
    pub event_bus: Arc<EventBus>,
}
