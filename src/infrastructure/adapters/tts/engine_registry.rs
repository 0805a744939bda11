//! Engine Registry - 按音色引擎类型路由到具体 TTS 引擎

use std::collections::HashMap;
use std::sync::Arc;

use crate::application::ports::{EngineRegistryPort, TtsEnginePort};
use crate::domain::voice::VoiceEngine;

#[derive(Default)]
pub struct EngineRegistry {
    engines: HashMap<VoiceEngine, Arc<dyn TtsEnginePort>>,
}

impl EngineRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_engine(mut self, kind: VoiceEngine, engine: Arc<dyn TtsEnginePort>) -> Self {
        self.engines.insert(kind, engine);
        self
    }
}

impl EngineRegistryPort for EngineRegistry {
    fn engine(&self, kind: VoiceEngine) -> Option<Arc<dyn TtsEnginePort>> {
        self.engines.get(&kind).cloned()
    }

    fn engines(&self) -> Vec<(VoiceEngine, Arc<dyn TtsEnginePort>)> {
        let mut all: Vec<_> = self.engines.iter().map(|(k, v)| (*k, v.clone())).collect();
        all.sort_by_key(|(k, _)| k.as_str());
        all
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::adapters::tts::ToneTtsClient;

    #[test]
    fn test_registry_lookup() {
        let registry = EngineRegistry::new().with_engine(VoiceEngine::Parametric, Arc::new(ToneTtsClient::new()));
        assert!(registry.engine(VoiceEngine::Parametric).is_some());
        assert!(registry.engine(VoiceEngine::Neural).is_none());
        assert_eq!(registry.engines().len(), 1);
    }
}
