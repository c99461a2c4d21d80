use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::database::models::StrategyParameter;

/// Any JSON value; `None` when it does not fit `T`
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Optional hints sent along with a generation prompt.
///
/// Hints are best effort: a field of the wrong shape is dropped rather than
/// failing the request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiContext {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub market: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub timeframe: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub indicators: Option<Vec<String>>,
    /// `low`, `medium` or `high`; anything else is ignored
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<String>,
}

impl AiContext {
    pub fn is_low_risk(&self) -> bool {
        self.risk_level
            .as_deref()
            .is_some_and(|level| level == "low")
    }

    pub fn indicator_count(&self) -> usize {
        self.indicators.as_ref().map_or(0, Vec::len)
    }
}

/// Body of `POST /api/ai/generate-strategy`
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GenerateStrategyRequest {
    pub prompt: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub context: Option<AiContext>,
}

/// Body of `POST /api/ai/improve-strategy`
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ImproveStrategyRequest {
    pub strategy_id: Option<String>,
    pub feedback: Option<String>,
}

/// Strategy draft produced by a generator, not yet saved to the library
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedStrategy {
    pub name: String,
    pub description: String,
    pub pine_script: String,
    pub parameters: Vec<StrategyParameter>,
    pub explanation: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AiResponse {
    pub strategy: GeneratedStrategy,
    pub confidence: u32,
    pub suggestions: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum AiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Chat completion API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Unexpected chat completion payload: {0}")]
    Payload(String),
}
