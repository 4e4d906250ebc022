//! Result parser — converts one raw AI answer into typed commodity records.
//!
//! The market prompt instructs the model to separate items with a literal
//! `---ITEM---` token and to shape each item as:
//!
//! ```text
//! # [Commodity Name] at [Market Name]
//! [one-sentence price summary per quintal]
//! [detailed analysis ...]
//! ```
//!
//! Upstream is free text, so the parser is deliberately lenient: it never
//! fails.  Missing lines default to empty strings, an unparseable name line
//! falls back to `"Commodity"` / `"Local Market"`, and a summary without a
//! recognizable price simply gets the `"Latest Rate"` label.

use std::sync::OnceLock;

use regex::Regex;

use crate::ai::prompt::ITEM_DELIMITER;

// ---------------------------------------------------------------------------
// CommodityResult
// ---------------------------------------------------------------------------

/// One parsed item block, immutable once parsed.
///
/// `id` is stable within one response batch and assigned by position among
/// surviving segments (`"res-0"`, `"res-1"`, ...).
#[derive(Debug, Clone, PartialEq)]
pub struct CommodityResult {
    pub id: String,
    pub name: String,
    pub market: String,
    /// Display label: `"₹2,500 per quintal"` or the fallback `"Latest Rate"`.
    pub price_label: String,
    pub summary: String,
    pub details: String,
}

// ---------------------------------------------------------------------------
// Markdown stripping
// ---------------------------------------------------------------------------

/// Remove markdown emphasis (`**`) and heading/markup characters
/// (`#`, `*`, `_`, `~`, `` ` ``) from `text`.
pub fn strip_markdown(text: &str) -> String {
    text.replace("**", "")
        .chars()
        .filter(|c| !matches!(c, '#' | '*' | '_' | '~' | '`'))
        .collect()
}

// ---------------------------------------------------------------------------
// Price extraction
// ---------------------------------------------------------------------------

/// Pattern: the rupee glyph immediately followed by a comma-grouped number
/// with an optional two-decimal fraction, e.g. `₹12,345.00`.
fn price_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"₹([0-9,]+(?:\.[0-9]{2})?)").unwrap())
}

/// Extract the first rupee price from `text`.
///
/// Commas are thousands separators and are removed before parsing.  Returns
/// `None` when no match is present — malformed currency strings are not an
/// error.
pub fn extract_price(text: &str) -> Option<f64> {
    let captures = price_pattern().captures(text)?;
    captures[1].replace(',', "").parse::<f64>().ok()
}

// ---------------------------------------------------------------------------
// Price label
// ---------------------------------------------------------------------------

/// Render the display label for an extracted price.
///
/// A present, non-zero price becomes the glyph plus the number with locale
/// thousands grouping and the `" per quintal"` suffix; `None` (or an exact
/// zero, which the original treats as absent) yields `"Latest Rate"`.
pub fn price_label(price: Option<f64>) -> String {
    match price {
        Some(p) if p != 0.0 => format!("₹{} per quintal", group_thousands(p)),
        _ => "Latest Rate".to_string(),
    }
}

/// Format `value` with comma thousands grouping, trimming trailing fraction
/// zeros (so `2500` → `"2,500"` and `1234.50` → `"1,234.5"`).
fn group_thousands(value: f64) -> String {
    let fixed = format!("{value:.3}");
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    let digits: Vec<char> = int_part.chars().collect();
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*c);
    }

    let frac_trimmed = frac_part.trim_end_matches('0');
    if !frac_trimmed.is_empty() {
        grouped.push('.');
        grouped.push_str(frac_trimmed);
    }
    grouped
}

// ---------------------------------------------------------------------------
// parse_results
// ---------------------------------------------------------------------------

/// Parse one raw AI answer into an ordered list of [`CommodityResult`]s.
///
/// Splits on the item delimiter, drops noise segments (trimmed length of
/// 10 characters or fewer — empty preamble, stray acknowledgements), and
/// maps each survivor by line position:
///
/// * line 0 — name line, split on `" at "` into name and market;
/// * lines 1–2 — joined with a space into the summary;
/// * lines 3+ — joined with newlines into the details.
///
/// Pure function of its input; empty or delimiter-free noise input yields
/// an empty vec, never an error.
pub fn parse_results(raw: &str) -> Vec<CommodityResult> {
    raw.split(ITEM_DELIMITER)
        .filter(|segment| segment.trim().chars().count() > 10)
        .enumerate()
        .map(|(index, segment)| parse_segment(index, segment))
        .collect()
}

fn parse_segment(index: usize, segment: &str) -> CommodityResult {
    let lines: Vec<&str> = segment.trim().split('\n').collect();

    let name_line = strip_markdown(lines.first().copied().unwrap_or_default());
    let mut name_parts = name_line.splitn(2, " at ");
    let name = name_parts
        .next()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("Commodity")
        .to_string();
    let market = name_parts
        .next()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("Local Market")
        .to_string();

    let summary = strip_markdown(
        &lines
            .iter()
            .skip(1)
            .take(2)
            .copied()
            .collect::<Vec<_>>()
            .join(" "),
    );
    let details = strip_markdown(
        &lines
            .iter()
            .skip(3)
            .copied()
            .collect::<Vec<_>>()
            .join("\n"),
    );

    let price = extract_price(&summary);

    CommodityResult {
        id: format!("res-{index}"),
        name,
        market,
        price_label: price_label(price),
        summary,
        details,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
