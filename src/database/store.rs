// In-memory Store
//
// Process-local maps standing in for a database. Each map is a DashMap so
// handlers can read and write concurrently without holding a lock across an
// await point. Nothing survives a restart.

use dashmap::DashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::database::models::{BacktestResult, MarketplaceItem, Strategy, User};

#[derive(Clone, Default)]
pub struct Store {
    /// Accounts keyed by normalized email
    users: Arc<DashMap<String, User>>,
    strategies: Arc<DashMap<Uuid, Strategy>>,
    backtests: Arc<DashMap<Uuid, BacktestResult>>,
    /// Listings keyed by the listed strategy's id
    marketplace: Arc<DashMap<Uuid, MarketplaceItem>>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------

    /// Insert a new account. Returns `false` when the email is already taken.
    pub fn insert_user(&self, user: User) -> bool {
        match self.users.entry(user.email.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => false,
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(user);
                true
            }
        }
    }

    pub fn get_user_by_email(&self, email: &str) -> Option<User> {
        self.users.get(email).map(|user| user.clone())
    }

    pub fn get_user_by_id(&self, id: Uuid) -> Option<User> {
        self.users
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| entry.value().clone())
    }

    /// Bump the strategy counter of an account, returning the updated user
    pub fn increment_strategies_used(&self, id: Uuid) -> Option<User> {
        let mut entry = self.users.iter_mut().find(|entry| entry.id == id)?;
        entry.strategies_used += 1;
        entry.updated_at = chrono::Utc::now();
        Some(entry.value().clone())
    }

    // ------------------------------------------------------------------
    // Strategies
    // ------------------------------------------------------------------

    /// All strategies, oldest first
    pub fn list_strategies(&self) -> Vec<Strategy> {
        let mut strategies: Vec<Strategy> = self
            .strategies
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        strategies.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        strategies
    }

    pub fn get_strategy(&self, id: Uuid) -> Option<Strategy> {
        self.strategies.get(&id).map(|strategy| strategy.clone())
    }

    pub fn insert_strategy(&self, strategy: Strategy) {
        self.strategies.insert(strategy.id, strategy);
    }

    /// Apply `update` in place and return the new value, or `None` if the id is unknown
    pub fn update_strategy<F>(&self, id: Uuid, update: F) -> Option<Strategy>
    where
        F: FnOnce(&mut Strategy),
    {
        let mut entry = self.strategies.get_mut(&id)?;
        update(entry.value_mut());
        Some(entry.value().clone())
    }

    pub fn remove_strategy(&self, id: Uuid) -> Option<Strategy> {
        self.strategies.remove(&id).map(|(_, strategy)| strategy)
    }

    // ------------------------------------------------------------------
    // Backtests
    // ------------------------------------------------------------------

    pub fn insert_backtest(&self, result: BacktestResult) {
        self.backtests.insert(result.id, result);
    }

    pub fn get_backtest(&self, id: Uuid) -> Option<BacktestResult> {
        self.backtests.get(&id).map(|result| result.clone())
    }

    /// Stored results, newest first, optionally restricted to one strategy
    pub fn list_backtests(&self, strategy_id: Option<Uuid>) -> Vec<BacktestResult> {
        let mut results: Vec<BacktestResult> = self
            .backtests
            .iter()
            .filter(|entry| strategy_id.is_none_or(|id| entry.strategy_id == id))
            .map(|entry| entry.value().clone())
            .collect();
        results.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        results
    }

    // ------------------------------------------------------------------
    // Marketplace
    // ------------------------------------------------------------------

    /// Add a listing. Returns `false` when the strategy is already listed.
    pub fn insert_listing(&self, item: MarketplaceItem) -> bool {
        match self.marketplace.entry(item.strategy.id) {
            dashmap::mapref::entry::Entry::Occupied(_) => false,
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(item);
                true
            }
        }
    }

    pub fn list_listings(&self) -> Vec<MarketplaceItem> {
        self.marketplace
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    pub fn find_listing_by_strategy(&self, strategy_id: Uuid) -> Option<MarketplaceItem> {
        self.marketplace.get(&strategy_id).map(|item| item.clone())
    }

    /// Record one sale on the listing for `strategy_id`
    pub fn record_sale(&self, strategy_id: Uuid) -> Option<MarketplaceItem> {
        let mut entry = self.marketplace.get_mut(&strategy_id)?;
        entry.sales += 1;
        entry.seller.sales += 1;
        entry.strategy.downloads += 1;
        Some(entry.value().clone())
    }
}
