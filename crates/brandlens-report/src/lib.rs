//! Report assembly and persistence for brandlens.
//!
//! The report is the terminal artifact of a run: the brand query, the full
//! per-source collection record, the weighted trust score, and the warning
//! log that lets readers tell partial results apart from full ones. Key
//! names are fixed via serde so downstream tooling can rely on them.

use std::path::{Path, PathBuf};

use brandlens_core::{AggregateRecord, BrandQuery, SourceStatus, TrustScore};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Component scores at or above this mark are listed as strengths.
const STRENGTH_THRESHOLD: f64 = 7.5;
/// Component scores below this mark are listed as concerns.
const CONCERN_THRESHOLD: f64 = 5.5;

/// Errors raised while persisting a report. Unlike collector and scorer
/// failures these are fatal: a run that cannot write its artifact has
/// nothing to show.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write report to {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// The persisted analysis report. Write-once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub run_id: Uuid,
    pub brand_query: BrandQuery,
    pub generated_at: DateTime<Utc>,
    pub collection: AggregateRecord,
    pub trust_score: TrustScore,
    pub key_strengths: Vec<String>,
    pub areas_of_concern: Vec<String>,
    pub warnings: Vec<String>,
}

/// Assemble the report from the run's artifacts.
///
/// The warning log enumerates every source that did not fully succeed plus
/// the scoring degradations, so a reader can tell partial results from full
/// ones. Strengths and concerns summarize the component breakdown.
#[must_use]
pub fn build_report(
    brand_query: BrandQuery,
    collection: AggregateRecord,
    trust_score: TrustScore,
    scoring_warnings: Vec<String>,
) -> Report {
    let mut warnings = Vec::new();
    for result in collection.results.values() {
        if result.status != SourceStatus::Ok {
            let detail = result.error.as_deref().unwrap_or("no detail");
            warnings.push(format!(
                "source {} {}: {detail}",
                result.source, result.status
            ));
        }
    }
    warnings.extend(scoring_warnings);

    let mut key_strengths = Vec::new();
    let mut areas_of_concern = Vec::new();
    for component in &trust_score.components {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let weight_pct = (component.weight * 100.0).round() as u32;
        let line = format!(
            "{}: {:.1}/10 ({weight_pct}%)",
            component.component.display_name(),
            component.score
        );
        if component.score >= STRENGTH_THRESHOLD {
            key_strengths.push(line);
        } else if component.score < CONCERN_THRESHOLD {
            areas_of_concern.push(line);
        }
    }

    Report {
        run_id: Uuid::new_v4(),
        brand_query,
        generated_at: Utc::now(),
        collection,
        trust_score,
        key_strengths,
        areas_of_concern,
        warnings,
    }
}

/// Report filename derived deterministically from the brand name:
/// lowercased, whitespace collapsed to underscores, everything else
/// non-alphanumeric dropped.
#[must_use]
pub fn report_filename(brand_name: &str) -> String {
    let slug: String = brand_name
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else if c.is_whitespace() {
                '_'
            } else {
                '\0'
            }
        })
        .filter(|&c| c != '\0')
        .collect::<String>()
        .split('_')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("_");

    let slug = if slug.is_empty() { "brand".to_string() } else { slug };
    format!("{slug}_analysis.json")
}

/// Serialize the report and write it under `out_dir`, returning the final
/// path.
///
/// # Errors
///
/// Returns [`ReportError`] if serialization fails or the file cannot be
/// written. Write failures are fatal to the run and surfaced to the caller.
pub async fn write_report(out_dir: &Path, report: &Report) -> Result<PathBuf, ReportError> {
    let path = out_dir.join(report_filename(&report.brand_query.brand_name));
    let json = serde_json::to_string_pretty(report)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| ReportError::Io {
                    path: parent.display().to_string(),
                    source,
                })?;
        }
    }

    tokio::fs::write(&path, json)
        .await
        .map_err(|source| ReportError::Io {
            path: path.display().to_string(),
            source,
        })?;

    tracing::info!(path = %path.display(), "report written");
    Ok(path)
}
