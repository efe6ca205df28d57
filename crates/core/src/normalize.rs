use serde_json::Value;

use crate::models::{
    DispatchResult, FailureKind, NormalizedReply, ReplyError, ReplyStatus,
};
use crate::registry::{INVESTMENT_ADVICE, SPENDING_ANALYSIS, TRIP_PLANNING};

pub fn normalize(result: DispatchResult, capability: &str, query: &str) -> NormalizedReply {
    match result {
        DispatchResult::Success { payload } => NormalizedReply {
            status: ReplyStatus::Ok,
            reply_text: render_payload(capability, &payload),
            result: Some(payload),
            error: None,
            capability: Some(capability.to_string()),
            query: query.to_string(),
            missing_parameters: Vec::new(),
        },
        DispatchResult::Failure { kind, message } => NormalizedReply {
            status: ReplyStatus::Error,
            reply_text: failure_text(kind, capability),
            result: None,
            error: Some(ReplyError { kind, message }),
            capability: Some(capability.to_string()),
            query: query.to_string(),
            missing_parameters: Vec::new(),
        },
    }
}

pub fn needs_input_reply(capability: &str, missing: Vec<String>, query: &str) -> NormalizedReply {
    NormalizedReply {
        status: ReplyStatus::NeedsInput,
        reply_text: format!(
            "To run {} I still need: {}.",
            display_name(capability),
            missing.join(", ")
        ),
        result: None,
        error: None,
        capability: Some(capability.to_string()),
        query: query.to_string(),
        missing_parameters: missing,
    }
}

pub fn invalid_query_reply(query: &str) -> NormalizedReply {
    NormalizedReply {
        status: ReplyStatus::Error,
        reply_text: "Please send a non-empty query.".to_string(),
        result: None,
        error: Some(ReplyError {
            kind: FailureKind::InvalidQuery,
            message: "query text is empty".to_string(),
        }),
        capability: None,
        query: query.to_string(),
        missing_parameters: Vec::new(),
    }
}

pub fn direct_reply(text: &str, query: &str) -> NormalizedReply {
    NormalizedReply {
        status: ReplyStatus::Ok,
        reply_text: text.to_string(),
        result: None,
        error: None,
        capability: None,
        query: query.to_string(),
        missing_parameters: Vec::new(),
    }
}

fn failure_text(kind: FailureKind, capability: &str) -> String {
    match kind {
        FailureKind::Unavailable => format!(
            "The {} service is unavailable right now. Please try again in a moment.",
            display_name(capability)
        ),
        FailureKind::Internal => format!(
            "The {} routine could not complete this request.",
            display_name(capability)
        ),
        FailureKind::InvalidQuery => "Please send a non-empty query.".to_string(),
    }
}

fn display_name(capability: &str) -> String {
    capability.replace('_', " ")
}

fn render_payload(capability: &str, payload: &Value) -> String {
    match capability {
        SPENDING_ANALYSIS => render_spending(payload),
        TRIP_PLANNING => render_trip(payload),
        INVESTMENT_ADVICE => render_investment(payload),
        _ => compact(payload),
    }
}

fn render_spending(payload: &Value) -> String {
    if let Some(insight) = payload.get("insight").and_then(Value::as_str) {
        return insight.to_string();
    }

    match (
        payload.get("total_spent").and_then(Value::as_i64),
        payload.get("transaction_count").and_then(Value::as_u64),
    ) {
        (Some(total), Some(count)) => {
            format!("Total spent ₹{total} across {count} transactions.")
        }
        _ => compact(payload),
    }
}

fn render_trip(payload: &Value) -> String {
    let days = payload.get("days").and_then(Value::as_u64);
    let destination = payload.get("destination").and_then(Value::as_str);
    let hotel = payload.get("hotel_suggestion").and_then(Value::as_str);
    let total = payload.get("total_budget").and_then(Value::as_i64);

    match (days, destination, hotel, total) {
        (Some(days), Some(destination), Some(hotel), Some(total)) => format!(
            "{days}-day plan for {destination}. Stay: {hotel}. Planned budget ₹{total}.",
        ),
        _ => compact(payload),
    }
}

fn render_investment(payload: &Value) -> String {
    payload
        .get("advice")
        .and_then(Value::as_str)
        .map(|advice| format!("Suggested allocation: {advice}."))
        .unwrap_or_else(|| compact(payload))
}

fn compact(payload: &Value) -> String {
    payload.to_string()
}
