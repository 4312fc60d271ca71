use std::sync::Arc;

use brevity_core::Workbench;
use brevity_llm::LLMClient;
use tokio::sync::Mutex;

use crate::config::EngineConfig;

#[derive(Clone)]
pub struct AppService {
    pub workbench: Arc<Mutex<Workbench>>,
}

impl AppService {
    pub fn new(client: Arc<LLMClient>, config: &EngineConfig) -> Self {
        let workbench = Workbench::new(client, config.policy.clone(), config.refinement.clone());

        Self {
            workbench: Arc::new(Mutex::new(workbench)),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub service: AppService,
}

impl AppState {
    pub fn new(client: Arc<LLMClient>, config: &EngineConfig) -> Self {
        Self {
            service: AppService::new(client, config),
        }
    }
}
