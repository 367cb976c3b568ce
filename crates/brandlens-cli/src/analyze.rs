//! The `analyze` command: configuration, collector registry, the
//! collect → score → report pipeline, and the terminal summary.

use std::io::Write;
use std::time::Duration;

use anyhow::Context;
use brandlens_collect::{
    collect_all, DiscussionsCollector, MicroblogCollector, RatingsCollector, SourceCollector,
    WebsiteTrustCollector,
};
use brandlens_core::{accounts, AccountPool, AppConfig, BrandQuery, SourceId};
use brandlens_report::{build_report, write_report};
use brandlens_score::{GeminiJudge, TrustScorer};

use crate::AnalyzeArgs;

pub(crate) async fn run(args: AnalyzeArgs) -> anyhow::Result<()> {
    let config = brandlens_core::load_app_config().context("loading configuration")?;
    let query = resolve_query(&args)?;

    tracing::info!(
        brand = %query.brand_name,
        handle = query.social_handle.as_deref().unwrap_or("-"),
        website = query.website.as_deref().unwrap_or("-"),
        "starting brand analysis"
    );
    println!("Analyzing brand: {}", query.brand_name);

    let collectors = build_collectors(&config).context("building source collectors")?;
    let record = collect_all(
        &collectors,
        &query,
        Duration::from_secs(config.collector_timeout_secs),
    )
    .await;

    let judge = GeminiJudge::new(&config).context("building language-model judge")?;
    let scorer = TrustScorer::new(Box::new(judge));
    let outcome = scorer.score(&record).await;

    let report = build_report(query, record, outcome.trust, outcome.warnings);
    let out_dir = args.out_dir.unwrap_or_else(|| config.out_dir.clone());
    let path = write_report(&out_dir, &report)
        .await
        .context("writing report")?;

    print_summary(&report, &path.display().to_string());
    Ok(())
}

/// Resolve the brand query from flags, prompting interactively for anything
/// the flags did not provide. The brand name is required either way.
fn resolve_query(args: &AnalyzeArgs) -> anyhow::Result<BrandQuery> {
    let interactive = args.brand.is_none();

    let brand = match &args.brand {
        Some(brand) => brand.clone(),
        None => prompt("Enter brand name: ")?.unwrap_or_default(),
    };
    if brand.trim().is_empty() {
        anyhow::bail!("brand name is required");
    }

    let handle = match &args.handle {
        Some(handle) => Some(handle.clone()),
        None if interactive => prompt("Enter microblog handle (optional, press Enter to skip): ")?,
        None => None,
    };
    let website = match &args.website {
        Some(website) => Some(website.clone()),
        None if interactive => prompt("Enter website URL (optional, press Enter to skip): ")?,
        None => None,
    };

    Ok(BrandQuery::new(brand, handle, website)?)
}

/// Read one trimmed line from stdin; empty input becomes `None`.
fn prompt(label: &str) -> anyhow::Result<Option<String>> {
    print!("{label}");
    std::io::stdout().flush().context("flushing stdout")?;
    let mut line = String::new();
    std::io::stdin()
        .read_line(&mut line)
        .context("reading stdin")?;
    let trimmed = line.trim();
    Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
}

/// Register one collector per known source. Optional sources are still
/// registered when their credentials are absent; they report `skipped`
/// themselves so the record stays complete.
fn build_collectors(config: &AppConfig) -> anyhow::Result<Vec<Box<dyn SourceCollector>>> {
    let microblog_client = match &config.microblog_accounts_path {
        Some(path) => {
            let account_list = accounts::load_accounts(path)
                .with_context(|| format!("loading microblog accounts from {}", path.display()))?;
            let pool = AccountPool::new(account_list)?;
            Some(brandlens_collect::microblog::MicroblogClient::new(config, pool)?)
        }
        None => None,
    };

    Ok(vec![
        Box::new(RatingsCollector::new(config)?),
        Box::new(DiscussionsCollector::new(config)?),
        Box::new(MicroblogCollector::new(microblog_client)),
        Box::new(WebsiteTrustCollector::new(config)?),
    ])
}

fn print_summary(report: &brandlens_report::Report, path: &str) {
    println!();
    println!("Brand Trust Analysis");
    println!("====================");
    println!("Brand: {}", report.brand_query.brand_name);
    println!("Overall score: {}/10", report.trust_score.final_score);
    println!("Recommendation: {}", report.trust_score.interpretation);

    println!();
    println!("Component scores:");
    for component in &report.trust_score.components {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let weight_pct = (component.weight * 100.0).round() as u32;
        println!(
            "  - {}: {:.1}/10 ({weight_pct}%)",
            component.component.display_name(),
            component.score
        );
    }

    println!();
    println!("Source status:");
    for source in SourceId::ALL {
        let result = report.collection.get(source);
        println!("  - {source}: {}", result.status);
    }

    if !report.warnings.is_empty() {
        println!();
        println!("Warnings:");
        for warning in &report.warnings {
            println!("  - {warning}");
        }
    }

    println!();
    println!("Report written to: {path}");
}
