//! # Database Module
//!
//! In-memory persistence: domain models, the concurrent map store and the
//! demo records loaded at startup.

pub mod models;
pub mod seed;
pub mod store;

pub use store::Store;
