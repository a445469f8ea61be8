use chrono::Utc;
use trendcaster::config::Config;
use trendcaster::filter::TrendFilter;
use trendcaster::guarantor::DomainTagGuarantor;
use trendcaster::trends::TrendAggregator;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => Config::load_from_file(&path)?,
        None => Config::default(),
    };
    config.validate()?;

    println!("🧪 Fetching live trends");
    let aggregator = TrendAggregator::from_config(&config.sources, false);
    println!("   Sources: {}", aggregator.fetcher_names().join(", "));

    let candidates = aggregator
        .fetch_candidates(None, config.sources.max_candidates)
        .await;
    println!("✅ {} candidates", candidates.len());
    for candidate in &candidates {
        println!(
            "   {:<32} {:?} {}",
            candidate.text,
            candidate.source,
            candidate
                .raw_score
                .map(|s| format!("{s:.2}"))
                .unwrap_or_default()
        );
    }

    let filter = TrendFilter::from_config(&config)?;
    let ranked = filter.filter_and_score(&candidates, Utc::now());
    println!();
    println!("📊 {} survived filtering", ranked.len());
    for tag in &ranked {
        println!(
            "   {} {:<32} {:.2} {}",
            if tag.accepted { "✅" } else { "  " },
            tag.text,
            tag.relevance,
            tag.category
        );
    }

    let tags = DomainTagGuarantor::from_config(&config).guarantee(&ranked, None);
    let rendered: Vec<String> = tags
        .iter()
        .map(|t| {
            if t.synthesized {
                format!("#{} (synthesized)", t.text)
            } else {
                format!("#{}", t.text)
            }
        })
        .collect();
    println!();
    println!("🏷️  Final tags: {}", rendered.join(" "));

    Ok(())
}
