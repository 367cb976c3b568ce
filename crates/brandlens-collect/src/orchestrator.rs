//! Collection orchestrator: concurrent fan-out over the registered
//! collectors, fan-in into one `AggregateRecord`.

use std::time::Duration;

use brandlens_core::{AggregateRecord, BrandQuery, SourceId, SourceResult};
use futures::stream::{self, StreamExt};

use crate::collector::SourceCollector;

/// Run every registered collector concurrently and assemble the aggregate
/// record.
///
/// Each collector gets its own timeout: a hung collector is abandoned and
/// recorded as `failed` without cancelling its siblings. Collectors share no
/// mutable state; each produces only its own `SourceResult`. The returned
/// record always holds one entry per known source — sources with no
/// registered collector come back `failed`.
pub async fn collect_all(
    collectors: &[Box<dyn SourceCollector>],
    query: &BrandQuery,
    per_collector_timeout: Duration,
) -> AggregateRecord {
    let concurrency = collectors.len().max(1);
    let results: Vec<SourceResult> = stream::iter(collectors)
        .map(|collector| async move {
            let source = collector.source();
            match tokio::time::timeout(per_collector_timeout, collector.collect(query)).await {
                Ok(result) => result,
                Err(_) => {
                    tracing::warn!(
                        source = %source,
                        timeout_secs = per_collector_timeout.as_secs(),
                        "collector timed out"
                    );
                    SourceResult::failed(
                        source,
                        format!("timed out after {}s", per_collector_timeout.as_secs()),
                    )
                }
            }
        })
        .buffer_unordered(concurrency)
        .collect()
        .await;

    let record = AggregateRecord::new(results);
    for source in SourceId::ALL {
        let result = record.get(source);
        tracing::info!(
            source = %source,
            status = %result.status,
            findings = result.findings.len(),
            "source collection finished"
        );
    }
    record
}
