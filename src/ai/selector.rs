//! Keyword-driven template selection for the offline generation path.

use crate::ai::templates::{template, TemplateKind};
use crate::ai::types::{AiContext, AiResponse, GeneratedStrategy};

pub const BASE_CONFIDENCE: u32 = 75;
pub const MAX_CONFIDENCE: u32 = 95;

/// Outcome of matching a prompt against the keyword table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub kind: TemplateKind,
    pub indicators: Vec<&'static str>,
    pub confidence: u32,
}

/// Pick a template and score it.
///
/// Later rules win: a prompt mentioning both Bollinger and scalping gets the
/// scalping template but keeps the Bollinger score.
pub fn select_template(prompt: &str, context: Option<&AiContext>) -> Selection {
    let prompt = prompt.to_lowercase();

    let mut kind = TemplateKind::TrendFollowing;
    let mut indicators = vec!["SMA"];
    let mut confidence = BASE_CONFIDENCE;

    if prompt.contains("rsi") {
        indicators.push("RSI");
        confidence += 5;
    }
    if prompt.contains("macd") {
        indicators.push("MACD");
        confidence += 5;
    }
    if prompt.contains("bollinger") {
        indicators.push("Bollinger Bands");
        kind = TemplateKind::MeanReversion;
        confidence += 10;
    }
    if prompt.contains("scalping") || prompt.contains("court terme") {
        kind = TemplateKind::Scalping;
        confidence += 5;
    }

    if let Some(context) = context {
        if context.is_low_risk() {
            confidence += 5;
        }
        let bonus = u32::try_from(context.indicator_count()).unwrap_or(u32::MAX);
        confidence = confidence.saturating_add(bonus.saturating_mul(2));
    }

    Selection {
        kind,
        indicators,
        confidence: confidence.min(MAX_CONFIDENCE),
    }
}

/// Full response for the offline path: selected template, explanation and advice
pub fn templated_response(prompt: &str, context: Option<&AiContext>) -> AiResponse {
    let selection = select_template(prompt, context);
    let template = template(selection.kind);

    let explanation = format!(
        "Cette stratégie a été générée en analysant votre demande: \"{}\". Elle utilise {} pour {}.",
        prompt,
        selection.indicators.join(", "),
        selection.kind.purpose()
    );

    AiResponse {
        strategy: GeneratedStrategy {
            name: template.name.to_string(),
            description: template.description.to_string(),
            pine_script: template.pine_script.to_string(),
            parameters: template.parameters,
            explanation,
        },
        confidence: selection.confidence,
        suggestions: vec![
            "Testez la stratégie sur différentes périodes".to_string(),
            "Ajustez les paramètres selon votre tolérance au risque".to_string(),
            "Considérez l'ajout d'un stop loss".to_string(),
            "Backtestez sur des données historiques avant utilisation".to_string(),
        ],
    }
}
