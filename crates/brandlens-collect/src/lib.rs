//! Source collectors for brandlens.
//!
//! Four collectors gather public signals about a brand (product ratings,
//! forum discussions, microblog mentions, website trust indicators) and
//! normalize them into `SourceResult`s. The orchestrator fans them out
//! concurrently with per-collector timeouts and assembles the
//! `AggregateRecord` consumed by the scorer.

pub mod collector;
pub mod discussions;
pub mod error;
pub mod microblog;
pub mod orchestrator;
pub mod ratings;
pub mod website;

mod retry;

pub use collector::SourceCollector;
pub use discussions::DiscussionsCollector;
pub use error::CollectError;
pub use microblog::MicroblogCollector;
pub use orchestrator::collect_all;
pub use ratings::RatingsCollector;
pub use website::WebsiteTrustCollector;
