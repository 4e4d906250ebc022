//! Market query pipeline: parsing, series derivation, search, favorites.
//!
//! ```text
//! query ──▶ market_prompt ──▶ TextGenerator ──▶ parse_results ─┬─▶ CommodityResult list
//!                                                              │
//!                                      extract_price(summary) ─┴─▶ derive_series (7 points)
//! ```
//!
//! This module provides:
//! * [`parser`] — turns semi-structured AI text into [`CommodityResult`]s.
//! * [`chart`]  — the deterministic 7-point price-series deriver.
//! * [`search`] — the [`MarketSearcher`] pipeline driver.
//! * [`favorites`] — the persisted, capped watchlist.

pub mod chart;
pub mod favorites;
pub mod parser;
pub mod search;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use chart::{derive_series, PricePoint, FALLBACK_SERIES};
pub use favorites::FavoriteList;
pub use parser::{extract_price, parse_results, price_label, strip_markdown, CommodityResult};
pub use search::{MarketSearcher, SearchOutcome};
