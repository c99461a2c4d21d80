use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, info};
use uuid::Uuid;

use crate::ai::types::{AiContext, AiError, AiResponse, GeneratedStrategy};
use crate::config::AiConfig;

const SYSTEM_PROMPT: &str = "You are a PineScript trading strategy generator. Given a user description, produce a PineScript v5 strategy with summary and list of parameters.";

/// Markdown code fence separating the model's summary from its script
const CODE_FENCE: &str = "```";

/// Chat-completion client used when an API key is configured
pub struct AIClient {
    client: Client,
    api_key: String,
    endpoint: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl AIClient {
    pub fn new(api_key: String, config: &AiConfig) -> Result<Self, AiError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            api_key,
            endpoint: format!("{}/chat/completions", config.openai_api_url.trim_end_matches('/')),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }

    /// Ask the model for a strategy and shape its reply like a template response
    pub async fn generate_strategy(
        &self,
        prompt: &str,
        context: Option<&AiContext>,
    ) -> Result<AiResponse, AiError> {
        let user_prompt = format!(
            "Description: {}\nContext: {}",
            prompt,
            serde_json::to_string(&context).unwrap_or_else(|_| "null".to_string())
        );

        let raw = self.call_openai_api(SYSTEM_PROMPT, &user_prompt).await?;
        info!("Chat completion returned {} characters", raw.len());

        Ok(shape_reply(&raw))
    }

    /// Call the OpenAI API
    async fn call_openai_api(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, AiError> {
        let payload = json!({
            "model": self.model,
            "messages": [
                {
                    "role": "system",
                    "content": system_prompt
                },
                {
                    "role": "user",
                    "content": user_prompt
                }
            ],
            "max_tokens": self.max_tokens,
            "temperature": self.temperature
        });

        debug!("POST {} model={}", self.endpoint, self.model);
        let response = self.client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(AiError::Api { status, body });
        }

        let json: Value = response.json().await?;
        if json.get("choices").is_none() {
            return Err(AiError::Payload("missing choices".to_string()));
        }

        // An empty completion is passed through as an empty summary and script
        Ok(json["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or_default()
            .to_string())
    }
}

/// Turn a raw completion into a generation response
pub fn shape_reply(raw: &str) -> AiResponse {
    let (summary, pine_script) = split_reply(raw);
    let strategy_id = Uuid::new_v4().simple().to_string();

    AiResponse {
        strategy: GeneratedStrategy {
            name: format!("AI Strategy {}", &strategy_id[..5]),
            description: summary.clone(),
            pine_script,
            parameters: Vec::new(),
            explanation: summary,
        },
        confidence: 85,
        suggestions: vec![
            "Review parameters".to_string(),
            "Backtest before trading live".to_string(),
        ],
    }
}

/// Split a model reply on the first code fence.
///
/// Everything before the fence is the summary. Everything after it is kept
/// verbatim as the script, later fences included.
pub fn split_reply(raw: &str) -> (String, String) {
    match raw.split_once(CODE_FENCE) {
        Some((summary, rest)) => (summary.trim().to_string(), rest.to_string()),
        None => (raw.trim().to_string(), String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_reply_without_fence() {
        let (summary, script) = split_reply("  Just a summary.  ");
        assert_eq!(summary, "Just a summary.");
        assert!(script.is_empty());
    }

    #[test]
    fn test_split_reply_keeps_everything_after_first_fence() {
        let raw = "Trend strategy.\n```pinescript\n//@version=5\nstrategy(\"x\")\n```\nNotes";
        let (summary, script) = split_reply(raw);

        assert_eq!(summary, "Trend strategy.");
        assert_eq!(script, "pinescript\n//@version=5\nstrategy(\"x\")\n```\nNotes");
    }

    #[test]
    fn test_shape_reply() {
        let response = shape_reply("Suit la tendance.\n```\n//@version=5\nstrategy(\"x\")\n```");

        let suffix = response.strategy.name.strip_prefix("AI Strategy ").unwrap();
        assert_eq!(suffix.len(), 5);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(response.strategy.description, "Suit la tendance.");
        assert_eq!(response.strategy.explanation, "Suit la tendance.");
        assert!(response.strategy.pine_script.contains("//@version=5"));
        assert!(response.strategy.parameters.is_empty());
        assert_eq!(response.confidence, 85);
        assert_eq!(
            response.suggestions,
            vec!["Review parameters", "Backtest before trading live"]
        );
    }

    #[tokio::test]
    async fn test_completion_from_local_server() {
        use axum::{routing::post, Json, Router};

        let app = Router::new().route(
            "/v1/chat/completions",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["model"], "gpt-4o-mini");
                assert_eq!(body["messages"][0]["role"], "system");
                Json(json!({
                    "choices": [{ "message": { "content": "Croisement EMA.\n```\n//@version=5\n```" } }]
                }))
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let mut config = crate::config::Config::for_tests().ai;
        config.openai_api_url = format!("http://{}/v1", addr);
        let client = AIClient::new("sk-test".to_string(), &config).unwrap();

        let response = client.generate_strategy("ema", None).await.unwrap();
        assert_eq!(response.strategy.description, "Croisement EMA.");
        assert!(response.strategy.name.starts_with("AI Strategy "));
        assert_eq!(response.confidence, 85);
        assert_eq!(response.suggestions.len(), 2);
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_http_error() {
        let mut config = crate::config::Config::for_tests().ai;
        config.openai_api_url = "http://127.0.0.1:9/v1/".to_string();
        let client = AIClient::new("sk-test".to_string(), &config).unwrap();

        assert_eq!(client.endpoint, "http://127.0.0.1:9/v1/chat/completions");
        let result = client.generate_strategy("rsi", None).await;
        assert!(matches!(result, Err(AiError::Http(_))));
    }
}
