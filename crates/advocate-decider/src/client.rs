// SPDX-License-Identifier: Apache-2.0

use advocate_types::{AgentDecision, CaseContext, WidgetSnapshot};
use async_trait::async_trait;
use serde_json::{json, Value};

use crate::error::DeciderError;
use crate::parse::{parse_tool_call, RawToolCall};
use crate::prompt::{build_system_prompt, build_user_message};
use crate::tool_schema::tool_definitions;

/// Contract every concrete backend (and the mock used in tests) implements.
/// `decide` never returns an error for malformed *model* output — that
/// degrades to a `Wait` action inside the `Ok` variant. Errors here mean the
/// call to the backend itself failed.
#[async_trait]
pub trait LlmDecider: Send + Sync {
    async fn decide(
        &self,
        filtered_snapshot: &WidgetSnapshot,
        context: &CaseContext,
    ) -> Result<AgentDecision, DeciderError>;
}

/// Azure-OpenAI-style chat completions client. Also the shape most
/// OpenAI-compatible deployments speak when fronted by an API gateway that
/// pins a specific `deployment` and `api_version`.
pub struct AzureOpenAiDecider {
    endpoint: String,
    api_key: String,
    deployment: String,
    api_version: String,
    client: reqwest::Client,
}

impl AzureOpenAiDecider {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        deployment: impl Into<String>,
        api_version: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            deployment: deployment.into(),
            api_version: api_version.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Build a client from the loaded `[llm]` config section, if it has
    /// enough fields populated to talk to a backend. Returns `None` when the
    /// deployment has not configured an LLM (e.g. local dev with only the
    /// scripted decider wired up).
    pub fn from_config(cfg: &advocate_config::LlmConfig) -> Option<Self> {
        Some(Self::new(
            cfg.endpoint.clone()?,
            cfg.api_key.clone()?,
            cfg.deployment.clone()?,
            cfg.api_version.clone().unwrap_or_else(|| "2024-06-01".to_string()),
        ))
    }

    fn chat_url(&self) -> String {
        let base = self.endpoint.trim_end_matches('/');
        format!(
            "{base}/openai/deployments/{}/chat/completions?api-version={}",
            self.deployment, self.api_version
        )
    }
}

#[async_trait]
impl LlmDecider for AzureOpenAiDecider {
    async fn decide(
        &self,
        filtered_snapshot: &WidgetSnapshot,
        context: &CaseContext,
    ) -> Result<AgentDecision, DeciderError> {
        let system_prompt = build_system_prompt(context);
        let user_message = build_user_message(filtered_snapshot, context);

        let body = json!({
            "messages": [
                { "role": "system", "content": system_prompt },
                { "role": "user", "content": user_message },
            ],
            "functions": tool_definitions(),
            "function_call": "auto",
        });

        let response = self
            .client
            .post(self.chat_url())
            .header("api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| DeciderError::Transient(format!("request to decider backend failed: {e}")))?;

        let status = response.status();
        if status.is_server_error() || status.as_u16() == 429 {
            return Err(DeciderError::Transient(format!(
                "decider backend returned {status}"
            )));
        }
        if !status.is_success() {
            return Err(DeciderError::PermanentInvalid(format!(
                "decider backend returned {status}"
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| DeciderError::Transient(format!("invalid response body: {e}")))?;

        let reasoning = body
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let raw_call = body
            .pointer("/choices/0/message/function_call")
            .and_then(|fc| {
                let name = fc.get("name")?.as_str()?.to_string();
                let arguments: Value = fc
                    .get("arguments")
                    .and_then(Value::as_str)
                    .and_then(|s| serde_json::from_str(s).ok())
                    .unwrap_or(json!({}));
                Some(RawToolCall { name, arguments })
            });

        let action = parse_tool_call(raw_call, &reasoning);
        Ok(AgentDecision { action, reasoning })
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_url_embeds_deployment_and_api_version() {
        let decider = AzureOpenAiDecider::new(
            "https://my-resource.openai.azure.com",
            "key",
            "gpt-support",
            "2024-06-01",
        );
        let url = decider.chat_url();
        assert!(url.contains("/openai/deployments/gpt-support/chat/completions"));
        assert!(url.contains("api-version=2024-06-01"));
    }

    #[test]
    fn chat_url_trims_trailing_slash_on_endpoint() {
        let decider = AzureOpenAiDecider::new(
            "https://my-resource.openai.azure.com/",
            "key",
            "gpt-support",
            "2024-06-01",
        );
        assert!(!decider.chat_url().contains("azure.com//openai"));
    }

    #[test]
    fn from_config_is_none_when_fields_are_missing() {
        let cfg = advocate_config::LlmConfig::default();
        assert!(AzureOpenAiDecider::from_config(&cfg).is_none());
    }

    #[test]
    fn from_config_builds_client_when_fully_populated() {
        let cfg = advocate_config::LlmConfig {
            endpoint: Some("https://my-resource.openai.azure.com".into()),
            api_key: Some("key".into()),
            deployment: Some("gpt-support".into()),
            api_version: None,
        };
        let decider = AzureOpenAiDecider::from_config(&cfg).unwrap();
        assert!(decider.chat_url().contains("api-version=2024-06-01"));
    }
}
