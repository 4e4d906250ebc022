//! Prompt templates for the two AI call sites.
//!
//! * [`market_prompt`] — instructs the model to act as a market expert and
//!   emit one `---ITEM---`-delimited block per commodity/market match, in
//!   the exact shape [`parse_results`](crate::market::parse_results)
//!   expects, using search grounding for current data.
//! * [`negotiation_prompt`] — the "Mandi Mediator" framing wrapped around a
//!   single finalized utterance, with a 2–4 sentence length instruction and
//!   translate-to-English guidance for regional-language speakers.

/// Delimiter token the model is told to place between result items.
pub const ITEM_DELIMITER: &str = "---ITEM---";

/// Build the market price query prompt.
///
/// `market` refines the query to a specific mandi; pass `None` (or an empty
/// string) for a nationwide answer.
pub fn market_prompt(query: &str, market: Option<&str>) -> String {
    let refinement = match market {
        Some(m) if !m.trim().is_empty() => format!(" in {}", m.trim()),
        _ => String::new(),
    };

    format!(
        "Act as a market expert. Provide the latest mandi prices for: {query}{refinement}.
IMPORTANT: If there are multiple commodities or markets matching the query, list them separately.
Format EACH result exactly like this:
{delim}
# [Commodity Name] at [Market Name]
[A one-sentence current price summary per quintal]
[Detailed analysis of trends, arrival volumes, and quality grades]

Ensure you use search grounding to get real, up-to-date data for today. Answer in English.",
        query = query.trim(),
        refinement = refinement,
        delim = ITEM_DELIMITER,
    )
}

/// Build the negotiation mediation prompt for one finalized utterance.
pub fn negotiation_prompt(utterance: &str) -> String {
    format!(
        "You are \"Mandi Mediator\" - an AI assistant helping Indian agricultural traders negotiate prices.

User said: {utterance}

Respond concisely (2-4 sentences). If a commodity is mentioned, provide a fair price range and a negotiation tip. If the user speaks in a regional language, translate and respond in English but keep it simple."
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn market_prompt_contains_query_and_delimiter() {
        let prompt = market_prompt("Tomato", None);
        assert!(prompt.contains("Tomato"));
        assert!(prompt.contains(ITEM_DELIMITER));
        assert!(prompt.contains("Answer in English"));
    }

    #[test]
    fn market_prompt_includes_market_refinement() {
        let prompt = market_prompt("Tomato", Some("Delhi"));
        assert!(prompt.contains("Tomato in Delhi"));
    }

    #[test]
    fn market_prompt_ignores_blank_refinement() {
        let prompt = market_prompt("Garlic", Some("   "));
        assert!(prompt.contains("for: Garlic."));
        assert!(!prompt.contains(" in ."));
    }

    #[test]
    fn negotiation_prompt_embeds_utterance() {
        let prompt = negotiation_prompt("टमाटर का भाव क्या है");
        assert!(prompt.contains("Mandi Mediator"));
        assert!(prompt.contains("टमाटर का भाव क्या है"));
        assert!(prompt.contains("2-4 sentences"));
        assert!(prompt.contains("translate and respond in English"));
    }
}
