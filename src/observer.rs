use crate::models::PipelineState;
use serde_json::Value;

/// Hooks fired at the request/response/error boundaries of each stage and
/// on pipeline state transitions. Injected into the client at construction;
/// orchestration never depends on what an observer does.
pub trait RequestObserver: Send + Sync {
    fn on_state(&self, _state: PipelineState) {}
    fn on_request(&self, _label: &str, _url: &str, _body: &Value) {}
    fn on_response(&self, _label: &str, _status: u16, _body: &Value) {}
    fn on_error(&self, _label: &str, _message: &str) {}
}

pub struct NoopObserver;

impl RequestObserver for NoopObserver {}

/// Log-backed observer. Silent unless constructed enabled, so callers can
/// wire it straight to a debug toggle.
pub struct DebugObserver {
    enabled: bool,
}

impl DebugObserver {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

impl RequestObserver for DebugObserver {
    fn on_state(&self, state: PipelineState) {
        if self.enabled {
            log::info!("🔄 Pipeline state: {}", state);
        }
    }

    fn on_request(&self, label: &str, url: &str, body: &Value) {
        if self.enabled {
            log::info!("📤 {} request: url={} body={}", label, url, body);
        }
    }

    fn on_response(&self, label: &str, status: u16, body: &Value) {
        if self.enabled {
            log::info!("📥 {} response: status={} body={}", label, status, body);
        }
    }

    fn on_error(&self, label: &str, message: &str) {
        if self.enabled {
            log::error!("❌ {} error: {}", label, message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_observer_accepts_all_events() {
        let observer = NoopObserver;
        observer.on_state(PipelineState::GeneratingPrompt);
        observer.on_request("LLM API", "https://api.example.com", &serde_json::json!({}));
        observer.on_response("LLM API", 200, &serde_json::json!({}));
        observer.on_error("LLM API", "boom");
    }

    #[test]
    fn test_disabled_debug_observer_is_silent() {
        let observer = DebugObserver::new(false);
        observer.on_error("Image API", "boom");
    }
}
