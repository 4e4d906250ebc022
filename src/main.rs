//! Application entry point — mandi price search and negotiation helper.
//!
//! # Subcommands
//!
//! * `search <query> [market]` — run one AI-grounded commodity price query
//!   and print the parsed result cards, derived 7-day series, and sources.
//! * `fav [list|toggle <name> <market>|find <needle>]` — manage the pinned
//!   watchlist stored next to the settings file.
//! * `negotiate` — run a negotiation session in the terminal: each stdin
//!   line is one utterance, mediator replies are printed.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (returns default on first run).
//! 3. Build the Gemini client from config.
//! 4. Dispatch the subcommand.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use tokio::sync::mpsc;

use mandi_bridge::ai::{GeminiClient, TextGenerator};
use mandi_bridge::config::AppConfig;
use mandi_bridge::market::{FavoriteList, MarketSearcher};
use mandi_bridge::negotiation::{NegotiationEngine, SessionEvent, Speaker};
use mandi_bridge::speech::{ConsoleSynthesizer, LineRecognizer};

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // 2. Configuration
    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });

    let mut args = std::env::args().skip(1);
    let Some(command) = args.next() else {
        print_usage();
        return Ok(());
    };

    match command.as_str() {
        "search" => {
            let query = args
                .next()
                .context("usage: mandi-bridge search <query> [market]")?;
            let market = args.next();
            run_search(&config, &query, market.as_deref()).await
        }
        "fav" => run_favorites(&args.collect::<Vec<_>>()),
        "negotiate" => run_negotiation(&config).await,
        other => {
            print_usage();
            bail!("unknown command: {other}")
        }
    }
}

fn print_usage() {
    eprintln!("mandi-bridge — mandi price search and negotiation helper");
    eprintln!();
    eprintln!("usage:");
    eprintln!("  mandi-bridge search <query> [market]");
    eprintln!("  mandi-bridge fav [list | toggle <name> <market> | find <needle>]");
    eprintln!("  mandi-bridge negotiate");
}

// ---------------------------------------------------------------------------
// search
// ---------------------------------------------------------------------------

async fn run_search(config: &AppConfig, query: &str, market: Option<&str>) -> Result<()> {
    let generator: Arc<dyn TextGenerator> = Arc::new(GeminiClient::from_config(&config.ai));
    let searcher = MarketSearcher::new(generator, config.ai.market_model.clone());

    let outcome = searcher.search(query, market).await?;

    if outcome.results.is_empty() {
        println!("No structured results found.");
        return Ok(());
    }

    let favorites = FavoriteList::load();
    for result in &outcome.results {
        let key = FavoriteList::key(&result.name, &result.market);
        let star = if favorites.contains(&key) { "*" } else { " " };
        println!("{star} {} — {}  [{}]", result.name, result.market, result.price_label);
        println!("    {}", result.summary);
        if !result.details.is_empty() {
            println!("    {}", result.details);
        }
        if let Some(series) = outcome.charts.get(&result.id) {
            let trend: Vec<String> = series
                .iter()
                .map(|point| format!("{} {}", point.label, point.price))
                .collect();
            println!("    trend: {}", trend.join(" | "));
        }
    }

    if !outcome.sources.is_empty() {
        println!("sources:");
        for source in &outcome.sources {
            println!("  {} — {}", source.title, source.uri);
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// fav
// ---------------------------------------------------------------------------

fn run_favorites(args: &[String]) -> Result<()> {
    let mut favorites = FavoriteList::load();

    match args.first().map(String::as_str) {
        None | Some("list") => {
            for item in favorites.items() {
                println!("{item}");
            }
            Ok(())
        }
        Some("toggle") => {
            let name = args
                .get(1)
                .context("usage: mandi-bridge fav toggle <name> <market>")?;
            let market = args
                .get(2)
                .context("usage: mandi-bridge fav toggle <name> <market>")?;
            let key = FavoriteList::key(name, market);
            let pinned = favorites.toggle(&key);
            println!("{} {key}", if pinned { "pinned" } else { "unpinned" });
            Ok(())
        }
        Some("find") => {
            let needle = args
                .get(1)
                .context("usage: mandi-bridge fav find <needle>")?;
            for item in favorites.filter(needle) {
                println!("{item}");
            }
            Ok(())
        }
        Some(other) => bail!("unknown fav action: {other}"),
    }
}

// ---------------------------------------------------------------------------
// negotiate
// ---------------------------------------------------------------------------

async fn run_negotiation(config: &AppConfig) -> Result<()> {
    let generator: Arc<dyn TextGenerator> = Arc::new(GeminiClient::from_config(&config.ai));
    let recognizer = Arc::new(LineRecognizer::new());
    let synthesizer = Arc::new(ConsoleSynthesizer::new(&config.speech.synthesis_voice));

    println!(
        "Negotiation session ({}). Type your counterpart's offer, one line at a time; Ctrl-D ends.",
        config.speech.recognition_language
    );

    let (events_tx, events_rx) = mpsc::channel(64);
    let engine = NegotiationEngine::new(
        generator,
        recognizer,
        synthesizer,
        config.ai.negotiation_model.clone(),
        Duration::from_millis(config.session.stop_guard_ms),
        events_tx.clone(),
    );

    if events_tx.send(SessionEvent::Start).await.is_err() {
        bail!("session channel closed before start");
    }
    let session = engine.run(events_rx).await;

    if let Some(error) = session.last_error() {
        eprintln!("session ended with error: {error}");
    }

    if !session.transcript().is_empty() {
        println!("--- transcript ---");
        for item in session.transcript().items() {
            let who = match item.speaker {
                Speaker::User => "you",
                Speaker::Model => "mediator",
            };
            println!("[{who}] {}", item.text);
        }
    }

    Ok(())
}
