use clap::{Arg, ArgAction, Command};
use log::LevelFilter;
use std::path::Path;
use std::process;
use std::str::FromStr;
use std::time::Duration;
use trendcaster::composer::DraftPost;
use trendcaster::history::{InMemoryHistory, DUPLICATE_WINDOW_DAYS};
use trendcaster::pipeline::{offer_for_cycle, AccountPipeline};
use trendcaster::validator::PostValidator;
use trendcaster::Config;

#[tokio::main]
async fn main() {
    let matches = Command::new("trendcaster")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Trend-aware post composer for GPU cloud promotion")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path (TOML, or YAML by extension)")
                .default_value(Config::default_path()),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Log per-tag filtering and scoring decisions")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("generate-config")
                .long("generate-config")
                .value_name("FILE")
                .help("Write the default configuration to FILE")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("test-config")
                .long("test-config")
                .help("Validate the configuration and exit")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("compose")
                .long("compose")
                .value_name("ACCOUNT")
                .help("Compose one post for ACCOUNT and print it with its validation")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("validate-file")
                .long("validate-file")
                .value_name("FILE")
                .help("Validate a post body read from FILE")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("run")
                .long("run")
                .help("Dry-run loop: compose for every account on the configured cadence")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("offline")
                .long("offline")
                .help("Use only the local temporal and generated trend sources")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Print composed drafts as JSON")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    if let Some(generate_path) = matches.get_one::<String>("generate-config") {
        generate_default_config(generate_path);
        return;
    }

    let config_path = matches
        .get_one::<String>("config")
        .map(String::as_str)
        .unwrap_or(Config::default_path());
    let config_exists = Path::new(config_path).exists();

    let config = match load_config(config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {e:#}");
            process::exit(1);
        }
    };

    let log_level = if matches.get_flag("verbose") {
        LevelFilter::Debug
    } else {
        config
            .logging
            .as_ref()
            .and_then(|l| LevelFilter::from_str(&l.level).ok())
            .unwrap_or(LevelFilter::Info)
    };
    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    if !config_exists {
        log::warn!("Configuration file '{config_path}' not found, using default configuration");
    }

    if let Err(e) = config.validate() {
        eprintln!("❌ Configuration validation failed: {e}");
        process::exit(1);
    }

    if matches.get_flag("test-config") {
        test_config(&config, matches.get_flag("offline"));
        return;
    }

    if let Some(body_file) = matches.get_one::<String>("validate-file") {
        validate_file(&config, body_file);
        return;
    }

    let offline = matches.get_flag("offline");
    let json = matches.get_flag("json");

    if let Some(account) = matches.get_one::<String>("compose") {
        compose_once(&config, account, offline, json).await;
        return;
    }

    if matches.get_flag("run") {
        if let Err(e) = run_loop(&config, offline, json).await {
            log::error!("Dry run failed: {e:#}");
            process::exit(1);
        }
        return;
    }

    eprintln!("Nothing to do: pass --compose ACCOUNT, --run, --validate-file or --test-config");
    process::exit(2);
}

fn load_config(path: &str) -> anyhow::Result<Config> {
    if Path::new(path).exists() {
        Config::load_from_file(path)
    } else {
        Ok(Config::default())
    }
}

fn generate_default_config(path: &str) {
    let config = Config::default();
    match config.to_file(path) {
        Ok(()) => {
            println!("Default configuration written to: {path}");
            println!("Please edit the configuration file to suit your needs.");
        }
        Err(e) => {
            eprintln!("Error writing configuration file: {e:#}");
            process::exit(1);
        }
    }
}

fn test_config(config: &Config, offline: bool) {
    println!("🔍 Testing configuration...");
    println!();
    println!("Accounts: {}", config.accounts.len());
    for account in &config.accounts {
        println!("  • {}", account.id);
    }
    println!("Offers: {}", config.offers.len());
    for offer in &config.offers {
        let region = offer.region.as_deref().unwrap_or("any region");
        println!("  • {} at {} ({})", offer.gpu_model, offer.price_label(), region);
    }

    match AccountPipeline::from_config(config, &config.accounts[0].id, offline) {
        Ok(pipeline) => {
            println!("Trend sources: {}", pipeline.aggregator().fetcher_names().join(", "));
            println!("Blacklist patterns: {}", config.blacklist.patterns.len());
            println!("✅ Configuration is valid");
        }
        Err(e) => {
            println!("❌ Configuration validation failed: {e:#}");
            process::exit(1);
        }
    }
}

fn validate_file(config: &Config, body_file: &str) {
    let body = match std::fs::read_to_string(body_file) {
        Ok(body) => body,
        Err(e) => {
            eprintln!("❌ Error reading {body_file}: {e}");
            process::exit(1);
        }
    };

    let validator = PostValidator::from_config(config);
    let result = validator.validate_body(body.trim());
    println!("🧪 {body_file}: {result}");
    if !result.passed() {
        process::exit(1);
    }
}

fn print_draft(account: &str, draft: &DraftPost, json: bool) {
    if json {
        match serde_json::to_string_pretty(draft) {
            Ok(text) => println!("{text}"),
            Err(e) => log::error!("Failed to serialize draft: {e}"),
        }
        return;
    }

    println!("📝 {account} [{} / {}]{}", draft.angle, draft.category, if draft.fallback { " (fallback)" } else { "" });
    println!("{}", draft.body);
    println!();
}

async fn compose_once(config: &Config, account: &str, offline: bool, json: bool) {
    let mut pipeline = match AccountPipeline::from_config(config, account, offline) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            eprintln!("❌ {e:#}");
            process::exit(1);
        }
    };

    let Some(offer) = offer_for_cycle(&config.offers, 0) else {
        eprintln!("❌ No offers configured");
        process::exit(1);
    };

    match pipeline.compose_next_post(offer).await {
        Some(draft) => {
            print_draft(account, &draft, json);
            let result = pipeline.validator().validate(&draft);
            println!("Validation: {result}");
        }
        None => {
            eprintln!("No post this cycle");
            process::exit(1);
        }
    }
}

/// Compose for every account on the configured cadence and print the
/// accepted drafts. Nothing is posted.
async fn run_loop(config: &Config, offline: bool, json: bool) -> anyhow::Result<()> {
    let (shutdown_tx, mut shutdown_rx) = tokio::sync::watch::channel(false);
    ctrlc::set_handler(move || {
        log::info!("Received shutdown signal, stopping after the current cycle...");
        let _ = shutdown_tx.send(true);
    })?;

    let mut pipelines = config
        .accounts
        .iter()
        .map(|a| AccountPipeline::from_config(config, &a.id, offline))
        .collect::<anyhow::Result<Vec<_>>>()?;
    let history = InMemoryHistory::new();

    let interval = Duration::from_secs(config.compose.interval_minutes * 60);
    let gap = Duration::from_secs(config.compose.account_gap_minutes * 60);
    log::info!(
        "Dry run for {} accounts every {:?}, {:?} apart",
        pipelines.len(),
        interval,
        gap
    );

    let mut cycle = 0usize;
    loop {
        let started = tokio::time::Instant::now();

        for (i, pipeline) in pipelines.iter_mut().enumerate() {
            if i > 0 && wait_or_shutdown(gap, &mut shutdown_rx).await {
                return Ok(());
            }

            let Some(offer) = offer_for_cycle(&config.offers, cycle + i) else {
                continue;
            };
            let Some(draft) = pipeline
                .compose_unique_post(offer, &history, DUPLICATE_WINDOW_DAYS)
                .await
            else {
                log::info!("{}: no post this cycle", pipeline.account());
                continue;
            };
            print_draft(pipeline.account(), &draft, json);
        }

        cycle += 1;
        let remaining = interval.saturating_sub(started.elapsed());
        if wait_or_shutdown(remaining, &mut shutdown_rx).await {
            return Ok(());
        }
    }
}

/// Sleeps for `duration`; true when shutdown was requested meanwhile.
async fn wait_or_shutdown(duration: Duration, shutdown: &mut tokio::sync::watch::Receiver<bool>) -> bool {
    if *shutdown.borrow() {
        return true;
    }
    tokio::select! {
        _ = tokio::time::sleep(duration) => false,
        changed = shutdown.changed() => changed.is_ok(),
    }
}
