// Domain Models
//
// Serde models for every entity the API exposes. Field names go over the
// wire in camelCase to match the web client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use uuid::Uuid;

// ============================================================================
// USER & AUTH MODELS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    Free,
    Premium,
}

/// User account information
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub plan: Plan,
    pub strategies_used: u32,
    pub max_strategies: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// New account on the free plan
    pub fn new(email: String, name: String, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email,
            name,
            password_hash,
            plan: Plan::Free,
            strategies_used: 0,
            max_strategies: 3,
            created_at: now,
            updated_at: now,
        }
    }
}

// ============================================================================
// STRATEGY MODELS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterType {
    Number,
    Boolean,
    String,
    Select,
}

/// Tunable input exposed by a PineScript strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyParameter {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ParameterType,
    pub default_value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
    #[serde(default)]
    pub description: String,
}

impl StrategyParameter {
    pub fn number(name: &str, default_value: Value, min: f64, max: f64, description: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: ParameterType::Number,
            default_value,
            options: None,
            min: Some(min),
            max: Some(max),
            step: None,
            description: description.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub id: String,
    pub name: String,
}

impl Author {
    /// Attribution used when a strategy is created without a signed-in user
    pub fn demo() -> Self {
        Self {
            id: "demo-user".to_string(),
            name: "Utilisateur Demo".to_string(),
        }
    }
}

/// A stored PineScript strategy and its library metadata
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Strategy {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub pine_script: String,
    pub parameters: Vec<StrategyParameter>,
    pub author: Author,
    pub is_public: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    pub downloads: u32,
    pub rating: f64,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Strategy {
    /// Copy with a fresh id and timestamps; popularity counters start over.
    pub fn duplicate(&self) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: format!("{} (Copie)", self.name),
            downloads: 0,
            rating: 0.0,
            created_at: now,
            updated_at: now,
            ..self.clone()
        }
    }

    pub fn matches_search(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.name.to_lowercase().contains(&needle)
            || self.description.to_lowercase().contains(&needle)
    }
}

// ============================================================================
// BACKTEST MODELS
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BacktestConfig {
    pub strategy_id: Uuid,
    pub symbol: String,
    pub timeframe: String,
    pub start_date: String,
    pub end_date: String,
    pub initial_capital: f64,
    pub commission: f64,
    pub slippage: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<HashMap<String, Value>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BacktestPerformance {
    pub total_return: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown: f64,
    pub win_rate: f64,
    pub profit_factor: f64,
    pub total_trades: u32,
    pub winning_trades: u32,
    pub losing_trades: u32,
    pub avg_winning_trade: f64,
    pub avg_losing_trade: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct EquityPoint {
    pub date: String,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeSide {
    Long,
    Short,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub id: Uuid,
    pub entry_date: String,
    pub exit_date: String,
    pub entry_price: f64,
    pub exit_price: f64,
    pub quantity: f64,
    pub side: TradeSide,
    pub pnl: f64,
    pub pnl_percent: f64,
    pub commission: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BacktestResult {
    pub id: Uuid,
    pub strategy_id: Uuid,
    pub config: BacktestConfig,
    pub performance: BacktestPerformance,
    pub equity: Vec<EquityPoint>,
    pub trades: Vec<Trade>,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// MARKETPLACE MODELS
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct Seller {
    pub id: String,
    pub name: String,
    pub rating: f64,
    pub sales: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: Uuid,
    pub user_id: String,
    pub user_name: String,
    pub rating: f64,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

/// A strategy listed for sale. `strategy` is a snapshot taken at publish time.
#[derive(Debug, Clone, Serialize)]
pub struct MarketplaceItem {
    pub id: Uuid,
    pub strategy: Strategy,
    pub seller: Seller,
    pub price: f64,
    pub sales: u32,
    pub reviews: Vec<Review>,
    pub featured: bool,
}

// ============================================================================
// MARKET DATA MODELS
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct Ohlc {
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MarketData {
    pub symbol: String,
    pub timeframe: String,
    pub data: Vec<Ohlc>,
}

// ============================================================================
// PAGINATION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: usize,
    pub page_size: usize,
    pub total: usize,
    pub total_pages: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub pagination: Pagination,
}

impl<T> Paginated<T> {
    /// Slice `items` to the requested 1-based page. `page` and `page_size` are clamped to at least 1.
    pub fn from_items(items: Vec<T>, page: usize, page_size: usize) -> Self {
        let page = page.max(1);
        let page_size = page_size.max(1);
        let total = items.len();
        let total_pages = total.div_ceil(page_size);

        let data = items
            .into_iter()
            .skip((page - 1).saturating_mul(page_size))
            .take(page_size)
            .collect();

        Self {
            data,
            pagination: Pagination {
                page,
                page_size,
                total,
                total_pages,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_strategy() -> Strategy {
        let now = Utc::now();
        Strategy {
            id: Uuid::new_v4(),
            name: "RSI Divergence Strategy".to_string(),
            description: "Divergences RSI".to_string(),
            pine_script: "//@version=5".to_string(),
            parameters: vec![],
            author: Author::demo(),
            is_public: true,
            price: None,
            downloads: 156,
            rating: 4.2,
            tags: vec!["RSI".to_string()],
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_duplicate_resets_counters() {
        let original = sample_strategy();
        let copy = original.duplicate();

        assert_ne!(copy.id, original.id);
        assert_eq!(copy.name, "RSI Divergence Strategy (Copie)");
        assert_eq!(copy.downloads, 0);
        assert_eq!(copy.rating, 0.0);
        assert_eq!(copy.pine_script, original.pine_script);
        assert_eq!(copy.author, original.author);
    }

    #[test]
    fn test_user_serialization_omits_password_hash() {
        let user = User::new("a@b.c".to_string(), "A".to_string(), "secret-hash".to_string());
        let json = serde_json::to_value(&user).unwrap();

        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["plan"], "free");
        assert_eq!(json["maxStrategies"], 3);
        assert_eq!(json["strategiesUsed"], 0);
    }

    #[test]
    fn test_parameter_type_field_name() {
        let param = StrategyParameter::number("length", serde_json::json!(14), 5.0, 50.0, "Période");
        let json = serde_json::to_value(&param).unwrap();

        assert_eq!(json["type"], "number");
        assert_eq!(json["defaultValue"], 14);
        assert!(json.get("options").is_none());
    }

    #[test]
    fn test_pagination_slices_pages() {
        let page = Paginated::from_items((1..=25).collect::<Vec<_>>(), 3, 10);
        assert_eq!(page.data, vec![21, 22, 23, 24, 25]);
        assert_eq!(page.pagination.total, 25);
        assert_eq!(page.pagination.total_pages, 3);

        let beyond = Paginated::from_items(vec![1, 2, 3], 5, 10);
        assert!(beyond.data.is_empty());
        assert_eq!(beyond.pagination.total_pages, 1);
    }

    #[test]
    fn test_pagination_clamps_zero_values() {
        let page = Paginated::from_items(vec!["a", "b"], 0, 0);
        assert_eq!(page.pagination.page, 1);
        assert_eq!(page.pagination.page_size, 1);
        assert_eq!(page.data, vec!["a"]);
    }

    #[test]
    fn test_pagination_far_past_the_end_is_empty() {
        let page = Paginated::from_items(vec!["a", "b"], usize::MAX, 10);
        assert!(page.data.is_empty());
        assert_eq!(page.pagination.page, usize::MAX);
        assert_eq!(page.pagination.total, 2);
        assert_eq!(page.pagination.total_pages, 1);
    }
}
