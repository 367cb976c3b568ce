//! The common collector capability.

use brandlens_core::{BrandQuery, SourceId, SourceResult};
use futures::future::BoxFuture;

/// One registered signal source.
///
/// A collector owns its network client, reads only the query fields relevant
/// to it, and always resolves to a `SourceResult` — remote failures are
/// captured in the result's status and error message, never raised. New
/// sources are added by registering another implementation with the
/// orchestrator.
pub trait SourceCollector: Send + Sync {
    /// Stable identifier of the source this collector feeds.
    fn source(&self) -> SourceId;

    /// Run the collection for `query`.
    fn collect<'a>(&'a self, query: &'a BrandQuery) -> BoxFuture<'a, SourceResult>;
}
