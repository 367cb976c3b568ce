//! Core domain types and configuration for brandlens.
//!
//! Holds the immutable [`BrandQuery`] input, the per-source collection
//! results that make up an [`AggregateRecord`], the weighted trust-score
//! model, and the application configuration loaded once at startup and
//! passed by reference into collectors and scorers.

pub mod accounts;
pub mod app_config;
pub mod config;
pub mod error;
pub mod score;
pub mod types;

pub use accounts::{AccountPool, MicroblogAccount};
pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};
pub use error::ConfigError;
pub use score::{Component, ComponentScore, ScoreBand, TrustScore, MIDPOINT_SCORE};
pub use types::{
    AggregateRecord, BrandQuery, Finding, SignalSet, SourceId, SourceResult, SourceStatus,
};
