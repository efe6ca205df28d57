pub mod intent;
pub mod models;
pub mod normalize;
pub mod registry;

pub use intent::{
    extract_params, normalize_text, IntentClassifier, IntentMatch, KeywordClassifier,
};
pub use models::*;
pub use normalize::{direct_reply, invalid_query_reply, needs_input_reply, normalize};
pub use registry::{
    standard_capabilities, CapabilityRegistry, RegistryError, RemoteEndpoints, INVESTMENT_ADVICE,
    SPENDING_ANALYSIS, TRIP_PLANNING,
};
