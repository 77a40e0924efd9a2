//! Extraction of structured data from free-text model replies.
//!
//! Every call site declares the shape it expects and the value to use when
//! the reply does not contain it. Nothing in here returns an error: malformed
//! output always degrades to the declared default.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::state::clamp_confidence;

pub const MAX_SEARCH_QUERIES: usize = 3;
pub const DEFAULT_CONFIDENCE: f64 = 75.0;

/// Parses the first candidate fragment of `raw` that deserializes as `T`.
pub fn parse_structured<T: DeserializeOwned>(raw: &str) -> Option<T> {
    candidates(raw)
        .into_iter()
        .find_map(|fragment| serde_json::from_str::<T>(&fragment).ok())
}

pub fn parse_or_default<T: DeserializeOwned>(raw: &str, default: T) -> T {
    parse_structured(raw).unwrap_or(default)
}

/// Best-effort JSON reading of a reply, for payloads kept opaque otherwise.
pub fn structured_value(raw: &str) -> Option<Value> {
    parse_structured::<Value>(raw).filter(|value| value.is_object() || value.is_array())
}

/// Candidate fragments in priority order: a ```json fence, any fence, the
/// whole reply, then the first balanced object. Reasoning blocks are removed
/// before any of them is looked for.
fn candidates(raw: &str) -> Vec<String> {
    let cleaned = strip_think_blocks(raw);
    let mut found = Vec::new();
    if let Some(block) = fenced_block(&cleaned, "```json") {
        found.push(block);
    }
    if let Some(block) = fenced_block(&cleaned, "```") {
        found.push(block);
    }
    found.push(cleaned.trim().to_string());
    if let Some(object) = extract_json_object(&cleaned) {
        found.push(object);
    }
    found
}

fn fenced_block(raw: &str, opener: &str) -> Option<String> {
    let start = raw.find(opener)? + opener.len();
    let rest = &raw[start..];
    let end = rest.find("```").unwrap_or(rest.len());
    let block = rest[..end].trim();
    (!block.is_empty()).then(|| block.to_string())
}

fn strip_think_blocks(input: &str) -> String {
    let mut cleaned = input.to_string();
    while let Some(think_start) = cleaned.find("<think>") {
        match cleaned[think_start..].find("</think>") {
            Some(think_end) => {
                let absolute_end = think_start + think_end + "</think>".len();
                cleaned.replace_range(think_start..absolute_end, "");
            }
            None => {
                cleaned.truncate(think_start);
                break;
            }
        }
    }
    cleaned
}

fn extract_json_object(cleaned: &str) -> Option<String> {
    let start = cleaned.find('{')?;

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (idx, ch) in cleaned[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(cleaned[start..=start + idx].to_string());
                }
            }
            _ => {}
        }
    }
    None
}

#[derive(Debug, Default, Deserialize)]
struct SearchPlanPayload {
    #[serde(default)]
    search_queries: Vec<String>,
    #[serde(default)]
    reasoning: Option<String>,
}

/// Search terms proposed by the researcher stage.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPlan {
    pub queries: Vec<String>,
    pub reasoning: Option<String>,
    /// True when the reply held no usable queries and the original query was used.
    pub fell_back: bool,
}

impl SearchPlan {
    /// Always yields between one and [`MAX_SEARCH_QUERIES`] queries.
    pub fn from_reply(raw: &str, original_query: &str) -> Self {
        let payload = parse_or_default(raw, SearchPlanPayload::default());
        let queries: Vec<String> = payload
            .search_queries
            .into_iter()
            .map(|query| query.trim().to_string())
            .filter(|query| !query.is_empty())
            .take(MAX_SEARCH_QUERIES)
            .collect();

        if queries.is_empty() {
            return Self {
                queries: vec![original_query.to_string()],
                reasoning: None,
                fell_back: true,
            };
        }

        Self {
            queries,
            reasoning: payload.reasoning.filter(|text| !text.trim().is_empty()),
            fell_back: false,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct AnalysisPayload {
    #[serde(default, deserialize_with = "lenient_number")]
    confidence: Option<f64>,
    #[serde(default, deserialize_with = "lenient_bool")]
    needs_more_research: Option<bool>,
}

/// The two analyzer fields routing depends on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalysisSignals {
    pub confidence: f64,
    pub needs_more_research: bool,
}

impl Default for AnalysisSignals {
    fn default() -> Self {
        Self {
            confidence: DEFAULT_CONFIDENCE,
            needs_more_research: false,
        }
    }
}

impl AnalysisSignals {
    pub fn from_reply(raw: &str) -> Self {
        let payload = parse_or_default(raw, AnalysisPayload::default());
        let defaults = Self::default();
        Self {
            confidence: clamp_confidence(payload.confidence.unwrap_or(defaults.confidence)),
            needs_more_research: payload
                .needs_more_research
                .unwrap_or(defaults.needs_more_research),
        }
    }
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text
            .trim()
            .trim_end_matches('%')
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|number| number.is_finite()),
        _ => None,
    }))
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| match value {
        Value::Bool(flag) => Some(flag),
        Value::String(text) => match text.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" => Some(true),
            "false" | "no" => Some(false),
            _ => None,
        },
        _ => None,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_plan_reads_fenced_block() {
        let reply = "Here you go:\n```json\n{\"search_queries\": [\"a\",\"b\"], \"reasoning\": \"cover both\"}\n```\nGood luck";
        let plan = SearchPlan::from_reply(reply, "original");

        assert_eq!(plan.queries, vec!["a", "b"]);
        assert_eq!(plan.reasoning.as_deref(), Some("cover both"));
        assert!(!plan.fell_back);
    }

    #[test]
    fn search_plan_reads_bare_json_and_prose_wrapped_json() {
        let bare = r#"{"search_queries": ["x"]}"#;
        assert_eq!(SearchPlan::from_reply(bare, "q").queries, vec!["x"]);

        let wrapped = r#"Sure! {"search_queries": ["y {braced}"], "reasoning": "r"} Hope it helps."#;
        assert_eq!(SearchPlan::from_reply(wrapped, "q").queries, vec!["y {braced}"]);
    }

    #[test]
    fn search_plan_falls_back_to_original_query() {
        let plan = SearchPlan::from_reply("I would search for recent papers.", "battery chemistry");

        assert_eq!(plan.queries, vec!["battery chemistry"]);
        assert!(plan.fell_back);
    }

    #[test]
    fn search_plan_falls_back_on_empty_or_blank_queries() {
        let empty = SearchPlan::from_reply(r#"{"search_queries": []}"#, "q");
        assert_eq!(empty.queries, vec!["q"]);

        let blank = SearchPlan::from_reply(r#"{"search_queries": ["  ", ""]}"#, "q");
        assert_eq!(blank.queries, vec!["q"]);
    }

    #[test]
    fn search_plan_keeps_at_most_three_queries() {
        let plan = SearchPlan::from_reply(r#"{"search_queries": ["1","2","3","4","5"]}"#, "q");
        assert_eq!(plan.queries, vec!["1", "2", "3"]);
    }

    #[test]
    fn search_plan_ignores_think_blocks() {
        let reply = "<think>maybe {\"search_queries\": [\"wrong\"]}</think>{\"search_queries\": [\"right\"]}";
        assert_eq!(SearchPlan::from_reply(reply, "q").queries, vec!["right"]);
    }

    #[test]
    fn analysis_signals_read_fields() {
        let reply = "```json\n{\"insights\": [], \"confidence\": 62, \"needs_more_research\": true}\n```";
        let signals = AnalysisSignals::from_reply(reply);

        assert_eq!(signals.confidence, 62.0);
        assert!(signals.needs_more_research);
    }

    #[test]
    fn analysis_signals_accept_strings() {
        let reply = r#"{"confidence": "88%", "needs_more_research": "false"}"#;
        let signals = AnalysisSignals::from_reply(reply);

        assert_eq!(signals.confidence, 88.0);
        assert!(!signals.needs_more_research);
    }

    #[test]
    fn analysis_signals_default_when_unparseable() {
        assert_eq!(
            AnalysisSignals::from_reply("The evidence is strong overall."),
            AnalysisSignals {
                confidence: 75.0,
                needs_more_research: false
            }
        );
    }

    #[test]
    fn analysis_signals_default_missing_or_malformed_fields() {
        let signals = AnalysisSignals::from_reply(r#"{"confidence": {"value": 10}}"#);
        assert_eq!(signals, AnalysisSignals::default());

        let clamped = AnalysisSignals::from_reply(r#"{"confidence": 250}"#);
        assert_eq!(clamped.confidence, 100.0);
    }

    #[test]
    fn analysis_signals_reject_non_finite_strings() {
        for raw in ["NaN", "inf", "-infinity"] {
            let reply = format!(r#"{{"confidence": "{raw}", "needs_more_research": false}}"#);
            assert_eq!(
                AnalysisSignals::from_reply(&reply).confidence,
                DEFAULT_CONFIDENCE,
                "{raw}"
            );
        }
    }

    #[test]
    fn fenced_block_inside_think_block_is_ignored() {
        let reply = "<think>draft ```json{\"search_queries\":[\"wrong\"]}```</think>```json{\"search_queries\":[\"right\"]}```";
        assert_eq!(SearchPlan::from_reply(reply, "q").queries, vec!["right"]);
    }

    #[test]
    fn analysis_signals_are_stable_across_calls() {
        let reply = "noise ```{\"confidence\": 41.5, \"needs_more_research\": false}``` noise";
        let first = AnalysisSignals::from_reply(reply);
        let second = AnalysisSignals::from_reply(reply);

        assert_eq!(first, second);
        assert_eq!(first.confidence, 41.5);
    }

    #[test]
    fn structured_value_only_accepts_containers() {
        assert!(structured_value(r#"{"metrics": {"sources": 4}}"#).is_some());
        assert!(structured_value("42").is_none());
        assert!(structured_value("plain prose").is_none());
    }
}
