// Demo Data
//
// Records loaded into a fresh store at startup so the client has something
// to show: one demo account, one library strategy and a few marketplace
// listings.

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use serde_json::json;
use uuid::Uuid;

use crate::auth::password::hash_password;
use crate::database::models::{
    Author, MarketplaceItem, Review, Seller, Strategy, StrategyParameter, User,
};
use crate::database::store::Store;

pub const DEMO_EMAIL: &str = "demo@tradequantic.ai";
pub const DEMO_PASSWORD: &str = "demo123";

const RSI_DIVERGENCE_SCRIPT: &str = r#"// RSI Divergence Strategy
//@version=5
strategy("RSI Divergence", overlay=true)

// Parameters
rsi_length = input(14, "RSI Length")
rsi_overbought = input(70, "RSI Overbought")
rsi_oversold = input(30, "RSI Oversold")

// Calculate RSI
rsi = ta.rsi(close, rsi_length)

// Entry conditions
long_condition = rsi < rsi_oversold and ta.crossover(rsi, rsi_oversold)
short_condition = rsi > rsi_overbought and ta.crossunder(rsi, rsi_overbought)

// Execute trades
if long_condition
    strategy.entry("Long", strategy.long)
if short_condition
    strategy.entry("Short", strategy.short)"#;

pub fn seed_demo_data(store: &Store) -> Result<()> {
    let password_hash = hash_password(DEMO_PASSWORD).context("Failed to hash demo password")?;
    let mut demo = User::new(
        DEMO_EMAIL.to_string(),
        "Utilisateur Demo".to_string(),
        password_hash,
    );
    demo.strategies_used = 1;
    store.insert_user(demo);

    let now = Utc::now();
    store.insert_strategy(Strategy {
        id: Uuid::new_v4(),
        name: "RSI Divergence Strategy".to_string(),
        description: "Stratégie basée sur les divergences RSI pour identifier les retournements de tendance".to_string(),
        pine_script: RSI_DIVERGENCE_SCRIPT.to_string(),
        parameters: vec![
            StrategyParameter::number("rsi_length", json!(14), 5.0, 50.0, "Période du RSI"),
            StrategyParameter::number("rsi_overbought", json!(70), 60.0, 90.0, "Niveau de surachat RSI"),
        ],
        author: Author::demo(),
        is_public: true,
        price: None,
        downloads: 156,
        rating: 4.2,
        tags: vec!["RSI".to_string(), "Divergence".to_string(), "Reversal".to_string()],
        created_at: now - Duration::days(7),
        updated_at: now,
    });

    for (offset, listing) in LISTINGS.iter().enumerate() {
        store.insert_listing(listing.to_item(now - Duration::days(30 - offset as i64)));
    }

    tracing::info!(
        "Seeded demo data: 1 user, {} strategy, {} marketplace listings",
        store.list_strategies().len(),
        store.list_listings().len()
    );
    Ok(())
}

struct SeedListing {
    name: &'static str,
    description: &'static str,
    tags: &'static [&'static str],
    price: f64,
    rating: f64,
    sales: u32,
    review: &'static str,
}

const LISTINGS: &[SeedListing] = &[
    SeedListing {
        name: "Advanced RSI Divergence",
        description: "Identifies potential trend reversals using RSI divergence with multiple timeframe confirmation.",
        tags: &["RSI", "Divergence", "Multi-Timeframe"],
        price: 49.0,
        rating: 4.8,
        sales: 234,
        review: "Signaux fiables sur le 4H, très bonne confirmation multi-timeframe.",
    },
    SeedListing {
        name: "Volume Profile Strategy",
        description: "Uses volume profile analysis to identify key support and resistance levels for trade entries.",
        tags: &["Volume", "Support", "Resistance"],
        price: 79.0,
        rating: 4.9,
        sales: 156,
        review: "Les niveaux de volume sont très pertinents.",
    },
    SeedListing {
        name: "Multi-Timeframe Momentum",
        description: "Combines momentum indicators across multiple timeframes for high-probability trade setups.",
        tags: &["Momentum", "Multi-Timeframe"],
        price: 39.0,
        rating: 4.6,
        sales: 312,
        review: "Bonne base, à combiner avec un stop loss.",
    },
];

impl SeedListing {
    fn to_item(&self, created_at: chrono::DateTime<Utc>) -> MarketplaceItem {
        let seller = Seller {
            id: "tradequantic-labs".to_string(),
            name: "TradeQuantic Labs".to_string(),
            rating: 4.7,
            sales: self.sales,
        };

        MarketplaceItem {
            id: Uuid::new_v4(),
            strategy: Strategy {
                id: Uuid::new_v4(),
                name: self.name.to_string(),
                description: self.description.to_string(),
                pine_script: format!(
                    "// {}\n//@version=5\nstrategy(\"{}\", overlay=true)",
                    self.name, self.name
                ),
                parameters: Vec::new(),
                author: Author {
                    id: seller.id.clone(),
                    name: seller.name.clone(),
                },
                is_public: true,
                price: Some(self.price),
                downloads: self.sales,
                rating: self.rating,
                tags: self.tags.iter().map(|t| t.to_string()).collect(),
                created_at,
                updated_at: created_at,
            },
            seller,
            price: self.price,
            sales: self.sales,
            reviews: vec![Review {
                id: Uuid::new_v4(),
                user_id: "demo-user".to_string(),
                user_name: "Utilisateur Demo".to_string(),
                rating: self.rating.round(),
                comment: self.review.to_string(),
                created_at,
            }],
            featured: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::verify_password;

    #[test]
    fn test_seed_demo_data() {
        let store = Store::new();
        seed_demo_data(&store).unwrap();

        let demo = store.get_user_by_email(DEMO_EMAIL).unwrap();
        assert!(verify_password(DEMO_PASSWORD, &demo.password_hash).unwrap());
        assert_eq!(demo.strategies_used, 1);

        let strategies = store.list_strategies();
        assert_eq!(strategies.len(), 1);
        assert_eq!(strategies[0].downloads, 156);
        assert_eq!(strategies[0].author.id, "demo-user");

        assert_eq!(store.list_listings().len(), 3);
    }
}
