use std::sync::Arc;

use axum::extract::FromRef;

use crate::backend::JobBackend;
use crate::config::Config;
use crate::pages::Pages;
use crate::session::TabRegistry;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone, FromRef)]
pub struct AppState {
    /// Job-matching backend. `HttpBackend` in production, a fake in tests.
    pub backend: Arc<dyn JobBackend>,
    pub tabs: Arc<TabRegistry>,
    pub pages: Arc<Pages>,
    pub config: Config,
}
