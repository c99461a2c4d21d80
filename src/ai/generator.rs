use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::ai::client::AIClient;
use crate::ai::selector::templated_response;
use crate::ai::templates::improved_template;
use crate::ai::types::{AiContext, AiError, AiResponse, GeneratedStrategy};
use crate::config::AiConfig;

#[async_trait]
pub trait StrategyGenerator: Send + Sync {
    /// Turn a natural-language description into a strategy draft
    async fn generate(
        &self,
        prompt: &str,
        context: Option<&AiContext>,
    ) -> Result<AiResponse, AiError>;

    /// Revise an existing strategy from user feedback
    async fn improve(&self, strategy_id: &str, feedback: &str) -> Result<AiResponse, AiError>;

    /// Short label for logs
    fn name(&self) -> &'static str;
}

/// Offline generator backed by the keyword selector and canned scripts
pub struct TemplateGenerator {
    delay: Duration,
}

impl TemplateGenerator {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    async fn simulate_processing(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

#[async_trait]
impl StrategyGenerator for TemplateGenerator {
    async fn generate(
        &self,
        prompt: &str,
        context: Option<&AiContext>,
    ) -> Result<AiResponse, AiError> {
        self.simulate_processing().await;
        Ok(templated_response(prompt, context))
    }

    async fn improve(&self, strategy_id: &str, feedback: &str) -> Result<AiResponse, AiError> {
        self.simulate_processing().await;
        info!("Improving strategy {} ({} chars of feedback)", strategy_id, feedback.len());

        let template = improved_template();
        Ok(AiResponse {
            strategy: GeneratedStrategy {
                name: template.name.to_string(),
                description: template.description.to_string(),
                pine_script: template.pine_script.to_string(),
                parameters: template.parameters,
                explanation: "Cette version améliorée intègre vos suggestions pour une meilleure performance.".to_string(),
            },
            confidence: 87,
            suggestions: vec![
                "Testez avec différentes périodes".to_string(),
                "Ajoutez un stop loss".to_string(),
                "Considérez les conditions de marché".to_string(),
            ],
        })
    }

    fn name(&self) -> &'static str {
        "templates"
    }
}

/// Generator that calls the chat-completion API. Improvement stays on the canned revision.
pub struct OpenAIGenerator {
    client: AIClient,
    fallback: TemplateGenerator,
}

#[async_trait]
impl StrategyGenerator for OpenAIGenerator {
    async fn generate(
        &self,
        prompt: &str,
        context: Option<&AiContext>,
    ) -> Result<AiResponse, AiError> {
        self.client.generate_strategy(prompt, context).await
    }

    async fn improve(&self, strategy_id: &str, feedback: &str) -> Result<AiResponse, AiError> {
        self.fallback.improve(strategy_id, feedback).await
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

/// Build the generator the configuration asks for
pub fn from_config(config: &AiConfig) -> Result<Arc<dyn StrategyGenerator>, AiError> {
    let fallback = TemplateGenerator::new(Duration::from_millis(config.mock_delay_ms));

    match &config.openai_api_key {
        Some(api_key) => {
            let client = AIClient::new(api_key.clone(), config)?;
            info!("Strategy generation backed by {} ({})", config.model, config.openai_api_url);
            Ok(Arc::new(OpenAIGenerator { client, fallback }))
        }
        None => {
            warn!("OPENAI_API_KEY not set, strategy generation uses built-in templates");
            Ok(Arc::new(fallback))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[tokio::test]
    async fn test_without_key_uses_templates() {
        let generator = from_config(&Config::for_tests().ai).unwrap();
        assert_eq!(generator.name(), "templates");

        let response = generator.generate("macd", None).await.unwrap();
        assert_eq!(response.confidence, 80);
    }

    #[tokio::test]
    async fn test_with_key_uses_openai() {
        let mut config = Config::for_tests().ai;
        config.openai_api_key = Some("sk-test".to_string());

        let generator = from_config(&config).unwrap();
        assert_eq!(generator.name(), "openai");

        let improved = generator.improve("abc", "plus de filtres").await.unwrap();
        assert_eq!(improved.confidence, 87);
        assert_eq!(improved.strategy.name, "Stratégie Améliorée");
    }
}
