//! Probe that runs one uncached fetch pass over the configured sources and
//! prints what each contributed.

use hub_news::ingest::config::NewsConfig;
use hub_news::NewsService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_target(false).init();

    let hint = std::env::args().nth(1);
    let cfg = NewsConfig::load_default()?;
    let service = NewsService::from_config(&cfg)?;

    let report = service.fetch_report(hint.as_deref()).await;

    println!(
        "sources={} ok={} failed={} items={} dedup={}",
        service.source_ids().len(),
        report.succeeded,
        report.failures.len(),
        report.items.len(),
        report.dedup
    );
    for f in &report.failures {
        println!("  ! {f}");
    }
    for it in report.items.iter().take(10) {
        println!(
            "  [{}] {} ({}, {})",
            it.category_id.as_deref().unwrap_or("-"),
            it.title,
            it.author,
            it.time
        );
    }
    Ok(())
}
