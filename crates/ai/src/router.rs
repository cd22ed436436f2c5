use std::{
    collections::HashMap,
    sync::Mutex,
    time::Instant,
};

use serde::Serialize;

use crate::{AiError, ChatMessage, Result};

/// What the completion is for; selects the backend priority list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    VoiceExtraction,
    TaskGeneration,
    PlanGeneration,
    JsonRepair,
    Dictation,
    Chat,
    Insights,
}

/// One configured completion backend with its token ceiling.
#[derive(Debug, Clone)]
pub struct ModelBackend {
    pub id: String,
    pub max_tokens: u32,
}

impl ModelBackend {
    fn new(id: &str, max_tokens: u32) -> Self {
        Self {
            id: id.to_string(),
            max_tokens,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CompletionOptions {
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
    /// Urgent requests get a tighter token cap so they come back fast.
    pub urgent: bool,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            temperature: 0.4,
            max_tokens: 2048,
            top_p: 0.9,
            urgent: false,
        }
    }
}

/// The winning backend's reply plus how we got there.
#[derive(Debug, Clone, Serialize)]
pub struct Completion {
    pub content: String,
    pub model_used: String,
    pub attempts: u32,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ModelStats {
    pub successes: u64,
    pub failures: u64,
    pub avg_latency_ms: f64,
}

/// Rolling per-backend counters. Observability only; selection order never
/// consults these. Concurrent updates may race, which is acceptable for
/// telemetry.
#[derive(Debug, Default)]
pub struct RouterStats {
    inner: Mutex<HashMap<String, ModelStats>>,
}

impl RouterStats {
    pub fn record_success(&self, model: &str, latency_ms: f64) {
        let mut map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let entry = map.entry(model.to_string()).or_default();
        entry.successes += 1;
        entry.avg_latency_ms = if entry.avg_latency_ms == 0.0 {
            latency_ms
        } else {
            entry.avg_latency_ms * 0.8 + latency_ms * 0.2
        };
    }

    pub fn record_failure(&self, model: &str) {
        let mut map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        map.entry(model.to_string()).or_default().failures += 1;
    }

    pub fn snapshot(&self) -> HashMap<String, ModelStats> {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

/// Walks a per-task-type priority list of backends, first success wins.
///
/// Backends are tried strictly one at a time: parallel fan-out would duplicate
/// cost and break first-success semantics.
pub struct ModelRouter {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    priorities: HashMap<TaskKind, Vec<ModelBackend>>,
    stats: RouterStats,
}

impl ModelRouter {
    pub fn new() -> Self {
        let endpoint = std::env::var("AI_COMPLETIONS_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1/chat/completions".to_string());
        let api_key = std::env::var("AI_API_KEY").ok();
        if api_key.is_none() {
            tracing::warn!("AI_API_KEY not set - AI completions will fail against hosted backends");
        }
        Self::with_endpoint(endpoint, api_key, default_priorities())
    }

    pub fn with_endpoint(
        endpoint: String,
        api_key: Option<String>,
        priorities: HashMap<TaskKind, Vec<ModelBackend>>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
            api_key,
            priorities,
            stats: RouterStats::default(),
        }
    }

    pub fn stats(&self) -> &RouterStats {
        &self.stats
    }

    /// Try each backend configured for `kind` in order; return the first
    /// successful completion. Fails only when the whole list is exhausted.
    pub async fn complete(
        &self,
        messages: &[ChatMessage],
        kind: TaskKind,
        options: &CompletionOptions,
    ) -> Result<Completion> {
        let backends = self
            .priorities
            .get(&kind)
            .ok_or_else(|| AiError::Upstream(format!("no backends configured for {kind:?}")))?;

        let requested_tokens = if options.urgent {
            options.max_tokens.min(512)
        } else {
            options.max_tokens
        };

        let mut last_error = String::from("no backends attempted");

        for (attempt, backend) in backends.iter().enumerate() {
            let max_tokens = requested_tokens.min(backend.max_tokens);
            let payload = serde_json::json!({
                "model": backend.id,
                "temperature": options.temperature,
                "top_p": options.top_p,
                "max_tokens": max_tokens,
                "messages": messages,
            });

            tracing::debug!(
                "AI attempt {}/{} for {:?} via {}",
                attempt + 1,
                backends.len(),
                kind,
                backend.id
            );

            let started = Instant::now();
            let request = self.client.post(&self.endpoint).json(&payload);
            let request = match &self.api_key {
                Some(key) => request.header("Authorization", format!("Bearer {key}")),
                None => request,
            };

            let response = match request.send().await {
                Ok(r) => r,
                Err(e) => {
                    tracing::warn!("backend {} unreachable: {}", backend.id, e);
                    self.stats.record_failure(&backend.id);
                    last_error = format!("{}: {e}", backend.id);
                    continue;
                }
            };

            let status = response.status();
            if status.as_u16() == 429 || status.as_u16() == 502 || status.as_u16() == 503 {
                tracing::warn!(
                    "backend {} transient failure ({}), trying next",
                    backend.id,
                    status
                );
                self.stats.record_failure(&backend.id);
                last_error = format!("{}: HTTP {status}", backend.id);
                continue;
            }
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                tracing::error!(
                    "backend {} error ({}): {}",
                    backend.id,
                    status,
                    &body[..body.len().min(200)]
                );
                self.stats.record_failure(&backend.id);
                last_error = format!("{}: HTTP {status}: {body}", backend.id);
                continue;
            }

            let json: serde_json::Value = match response.json().await {
                Ok(j) => j,
                Err(e) => {
                    tracing::warn!("backend {} returned unparseable body: {}", backend.id, e);
                    self.stats.record_failure(&backend.id);
                    last_error = format!("{}: {e}", backend.id);
                    continue;
                }
            };

            let content = json["choices"][0]["message"]["content"]
                .as_str()
                .unwrap_or("")
                .trim()
                .to_string();
            if content.is_empty() {
                tracing::warn!("backend {} returned empty content", backend.id);
                self.stats.record_failure(&backend.id);
                last_error = format!("{}: empty completion", backend.id);
                continue;
            }

            let latency_ms = started.elapsed().as_secs_f64() * 1000.0;
            self.stats.record_success(&backend.id, latency_ms);
            tracing::debug!(
                "backend {} succeeded in {:.0}ms ({} chars)",
                backend.id,
                latency_ms,
                content.len()
            );

            return Ok(Completion {
                content,
                model_used: backend.id.clone(),
                attempts: (attempt + 1) as u32,
            });
        }

        Err(AiError::Upstream(format!(
            "exhausted {} backend(s) for {kind:?}, last error: {last_error}",
            backends.len()
        )))
    }
}

impl Default for ModelRouter {
    fn default() -> Self {
        Self::new()
    }
}

/// Static priority lists, most- to least-capable per task type. Reasoning
/// models lead voice extraction; code-tuned models lead JSON repair.
pub fn default_priorities() -> HashMap<TaskKind, Vec<ModelBackend>> {
    let mut map = HashMap::new();
    map.insert(
        TaskKind::VoiceExtraction,
        vec![
            ModelBackend::new("deepseek-r1-distill-llama-70b", 4096),
            ModelBackend::new("llama-3.3-70b-versatile", 4096),
            ModelBackend::new("gpt-4o-mini", 2048),
        ],
    );
    map.insert(
        TaskKind::TaskGeneration,
        vec![
            ModelBackend::new("llama-3.3-70b-versatile", 4096),
            ModelBackend::new("gpt-4o-mini", 2048),
            ModelBackend::new("llama-3.1-8b-instant", 1024),
        ],
    );
    map.insert(
        TaskKind::PlanGeneration,
        vec![
            ModelBackend::new("gpt-4o", 4096),
            ModelBackend::new("llama-3.3-70b-versatile", 4096),
            ModelBackend::new("gpt-4o-mini", 2048),
        ],
    );
    map.insert(
        TaskKind::JsonRepair,
        vec![
            ModelBackend::new("qwen-2.5-coder-32b", 2048),
            ModelBackend::new("gpt-4o-mini", 2048),
            ModelBackend::new("llama-3.1-8b-instant", 1024),
        ],
    );
    map.insert(
        TaskKind::Dictation,
        vec![
            ModelBackend::new("gpt-4o-mini", 1024),
            ModelBackend::new("llama-3.1-8b-instant", 1024),
        ],
    );
    map.insert(
        TaskKind::Chat,
        vec![
            ModelBackend::new("gpt-4o-mini", 2048),
            ModelBackend::new("llama-3.3-70b-versatile", 2048),
        ],
    );
    map.insert(
        TaskKind::Insights,
        vec![
            ModelBackend::new("llama-3.3-70b-versatile", 2048),
            ModelBackend::new("gpt-4o-mini", 1024),
        ],
    );
    map
}
