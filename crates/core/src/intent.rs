use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Value};

use crate::models::{Capability, ParameterSet};
use crate::registry::{INVESTMENT_ADVICE, SPENDING_ANALYSIS, TRIP_PLANNING};

pub fn normalize_text(input: &str) -> String {
    input
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntentMatch {
    pub capability: String,
    pub matched_phrase: String,
}

pub trait IntentClassifier: Send + Sync {
    fn classify(&self, text: &str) -> Option<IntentMatch>;
}

const SPENDING_TRIGGERS: &[&str] = &[
    "spending analysis",
    "money spent",
    "spending",
    "expenses",
    "expense",
    "transactions",
    "transaction",
    "spent",
    "spend",
    "analysis",
];

const TRIP_TRIGGERS: &[&str] = &[
    "plan a trip",
    "vacation",
    "itinerary",
    "journey",
    "travel",
    "hotels",
    "hotel",
    "trip",
    "tour",
    "plan",
];

const INVESTMENT_TRIGGERS: &[&str] = &[
    "money allocation",
    "investment",
    "portfolio",
    "allocate",
    "invest",
    "returns",
    "risk",
];

// Tie-break is longest matched phrase, then registry declaration order.
// Trigger slices are scanned in that declaration order.
const CAPABILITY_TRIGGERS: &[(&str, &[&str])] = &[
    (SPENDING_ANALYSIS, SPENDING_TRIGGERS),
    (TRIP_PLANNING, TRIP_TRIGGERS),
    (INVESTMENT_ADVICE, INVESTMENT_TRIGGERS),
];

#[derive(Debug, Default, Clone, Copy)]
pub struct KeywordClassifier;

impl IntentClassifier for KeywordClassifier {
    fn classify(&self, text: &str) -> Option<IntentMatch> {
        let lower = text.to_lowercase();
        let mut best: Option<IntentMatch> = None;

        for (capability, triggers) in CAPABILITY_TRIGGERS {
            let Some(hit) = longest_trigger(&lower, triggers) else {
                continue;
            };
            let better = match &best {
                Some(current) => hit.len() > current.matched_phrase.len(),
                None => true,
            };
            if better {
                best = Some(IntentMatch {
                    capability: capability.to_string(),
                    matched_phrase: hit.to_string(),
                });
            }
        }

        best
    }
}

fn longest_trigger<'a>(lower: &str, triggers: &[&'a str]) -> Option<&'a str> {
    triggers
        .iter()
        .filter(|phrase| phrase_present(lower, phrase))
        .copied()
        .max_by_key(|phrase| phrase.len())
}

fn phrase_present(text: &str, phrase: &str) -> bool {
    let mut start = 0;
    while let Some(position) = text[start..].find(phrase) {
        let at = start + position;
        let end = at + phrase.len();
        let bytes = text.as_bytes();
        let boundary_before = at == 0 || !bytes[at - 1].is_ascii_alphanumeric();
        let boundary_after = end == text.len() || !bytes[end].is_ascii_alphanumeric();
        if boundary_before && boundary_after {
            return true;
        }
        start = end;
    }
    false
}

static USER_ID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\buser_[A-Za-z0-9]+\b").unwrap());
static MONTH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(20\d{2}-(?:0[1-9]|1[0-2]))\b").unwrap());
static FROM_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bfrom\s+([A-Za-z][A-Za-z'-]*)").unwrap());
static TO_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bto\s+([A-Za-z][A-Za-z'-]*)").unwrap());
static DAYS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\b(\d{1,2})\s*-?\s*days?\b").unwrap());
static BUDGET_PREFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:budget(?:\s+of)?(?:\s+is)?\s*|₹\s*)(\d[\d,]*)").unwrap());
static BUDGET_SUFFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(\d[\d,]*)\s*(?:inr|rupees)\b").unwrap());
static RISK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\b(low|medium|high)\b").unwrap());
static AMOUNT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(\d[\d,]*)\b").unwrap());

// Words that follow "to"/"from" in trip phrasing without naming a place.
const PLACE_STOPWORDS: &[&str] = &[
    "plan", "go", "going", "visit", "travel", "book", "make", "take", "know", "see", "have",
    "do", "be", "get", "the", "a", "an", "my", "our",
];

pub fn extract_params(capability: &Capability, text: &str) -> ParameterSet {
    let mut params = ParameterSet::new();

    for spec in &capability.params {
        if let Some(value) = extract_value(&spec.name, text) {
            params.insert(spec.name.clone(), value);
        } else if let Some(default) = &spec.default {
            params.insert(spec.name.clone(), default.clone());
        }
    }

    params
}

fn extract_value(name: &str, text: &str) -> Option<Value> {
    match name {
        "user_id" => USER_ID_RE
            .find(text)
            .map(|hit| json!(hit.as_str().to_lowercase())),
        "month" => MONTH_RE
            .captures(text)
            .map(|captures| json!(&captures[1])),
        "origin" => place_after(&FROM_RE, text),
        "destination" => place_after(&TO_RE, text),
        "days" => DAYS_RE
            .captures(text)
            .and_then(|captures| captures[1].parse::<u64>().ok())
            .map(|days| json!(days)),
        "budget_inr" => BUDGET_PREFIX_RE
            .captures(text)
            .or_else(|| BUDGET_SUFFIX_RE.captures(text))
            .and_then(|captures| parse_grouped_number(&captures[1]))
            .map(|budget| json!(budget)),
        "travel_style" => travel_style_keyword(text).map(|style| json!(style)),
        "risk" => RISK_RE
            .captures(text)
            .map(|captures| json!(captures[1].to_lowercase())),
        "amount" => AMOUNT_RE
            .captures(text)
            .and_then(|captures| parse_grouped_number(&captures[1]))
            .map(|amount| json!(amount)),
        _ => None,
    }
}

fn place_after(pattern: &Regex, text: &str) -> Option<Value> {
    pattern
        .captures_iter(text)
        .map(|captures| captures[1].to_string())
        .find(|word| !PLACE_STOPWORDS.contains(&word.to_lowercase().as_str()))
        .map(|word| json!(word))
}

fn parse_grouped_number(raw: &str) -> Option<i64> {
    raw.replace(',', "").parse::<i64>().ok()
}

fn travel_style_keyword(text: &str) -> Option<&'static str> {
    let lower = text.to_lowercase();
    if phrase_present(&lower, "premium") || phrase_present(&lower, "luxury") {
        Some("premium")
    } else if phrase_present(&lower, "cheap") {
        Some("cheap")
    } else if phrase_present(&lower, "balanced") {
        Some("balanced")
    } else {
        None
    }
}
