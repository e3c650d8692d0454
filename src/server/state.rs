use std::sync::Arc;

use crate::config::Settings;
use crate::template::TemplateRegistry;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    /// Immutable registry snapshot; built once before the server starts
    pub registry: Arc<TemplateRegistry>,
}

impl AppState {
    pub fn new(settings: Settings, registry: TemplateRegistry) -> Self {
        Self {
            settings: Arc::new(settings),
            registry: Arc::new(registry),
        }
    }
}
