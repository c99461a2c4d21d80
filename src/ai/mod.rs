//! # AI Strategy Generation
//!
//! Turns natural-language descriptions into PineScript drafts, either through
//! a chat-completion API or, without an API key, through a keyword matcher
//! over three canned templates.

pub mod client;
pub mod generator;
pub mod selector;
pub mod templates;
pub mod types;

pub use generator::StrategyGenerator;
pub use types::*;
