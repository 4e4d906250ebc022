//! Market searcher — drives the full query → AI → parse → derive pipeline.
//!
//! One search is one AI call: the searcher builds the market prompt, invokes
//! the generator with grounding enabled, parses the answer into result
//! cards, derives a 7-point series per card, and dedups grounding sources by
//! uri.  There is no queuing: a new search simply replaces whatever the
//! previous one would have produced (state is cleared at search start by the
//! caller, so last-writer-wins is safe).

use std::collections::HashMap;
use std::sync::Arc;

use crate::ai::{market_prompt, AiError, GenerateRequest, GroundingSource, TextGenerator};
use crate::market::chart::{derive_series, PricePoint};
use crate::market::parser::{extract_price, parse_results, CommodityResult};

// ---------------------------------------------------------------------------
// SearchOutcome
// ---------------------------------------------------------------------------

/// Everything one successful search produces.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// Parsed result cards, in response order.
    pub results: Vec<CommodityResult>,
    /// Derived 7-point series, keyed by result id.
    pub charts: HashMap<String, Vec<PricePoint>>,
    /// Web citations backing the answer, deduplicated by uri.
    pub sources: Vec<GroundingSource>,
}

// ---------------------------------------------------------------------------
// MarketSearcher
// ---------------------------------------------------------------------------

/// Runs market price queries against a [`TextGenerator`].
pub struct MarketSearcher {
    generator: Arc<dyn TextGenerator>,
    model: String,
}

impl MarketSearcher {
    /// `model` is the market-query model identifier from config.
    pub fn new(generator: Arc<dyn TextGenerator>, model: impl Into<String>) -> Self {
        Self {
            generator,
            model: model.into(),
        }
    }

    /// Run one query. `market` optionally refines to a specific mandi.
    ///
    /// Errors surface unchanged from the AI boundary ([`AiError::Quota`] for
    /// HTTP 429, [`AiError::MissingApiKey`] when unconfigured); parsing
    /// itself never fails.
    pub async fn search(
        &self,
        query: &str,
        market: Option<&str>,
    ) -> Result<SearchOutcome, AiError> {
        let request = GenerateRequest {
            model: self.model.clone(),
            prompt: market_prompt(query, market),
            grounding: true,
        };

        log::debug!("market search: query={query:?} market={market:?}");
        let response = self.generator.generate(&request).await?;

        let results = parse_results(&response.text);
        log::info!("market search returned {} result(s)", results.len());

        let charts = results
            .iter()
            .map(|result| {
                let base = extract_price(&result.summary);
                (result.id.clone(), derive_series(base))
            })
            .collect();

        Ok(SearchOutcome {
            charts,
            sources: dedup_sources(response.sources),
            results,
        })
    }
}

/// Keep the first occurrence of each uri, preserving response order.
fn dedup_sources(sources: Vec<GroundingSource>) -> Vec<GroundingSource> {
    let mut seen = std::collections::HashSet::new();
    sources
        .into_iter()
        .filter(|source| seen.insert(source.uri.clone()))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
