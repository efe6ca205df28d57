use std::sync::Arc;
use std::time::Instant;

use teller_connector::Connector;
use teller_core::{
    direct_reply, extract_params, invalid_query_reply, needs_input_reply, normalize,
    normalize_text, Capability, CapabilityRegistry, ChatQuery, IntentClassifier, NormalizedReply,
    ParameterSet,
};
use teller_observability::AppMetrics;
use tracing::{info, instrument, warn};
use uuid::Uuid;

#[derive(Clone)]
pub struct Orchestrator<C: Connector> {
    registry: Arc<CapabilityRegistry>,
    connector: Arc<C>,
    classifier: Arc<dyn IntentClassifier>,
    metrics: Arc<AppMetrics>,
}

impl<C: Connector> Orchestrator<C> {
    pub fn new(
        registry: Arc<CapabilityRegistry>,
        connector: Arc<C>,
        classifier: Arc<dyn IntentClassifier>,
        metrics: Arc<AppMetrics>,
    ) -> Self {
        Self {
            registry,
            connector,
            classifier,
            metrics,
        }
    }

    pub fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    #[instrument(skip(self, query))]
    pub async fn handle(&self, query: ChatQuery) -> NormalizedReply {
        let started = Instant::now();
        self.metrics.inc_request();

        let text = normalize_text(&query.text);
        if text.is_empty() {
            return invalid_query_reply(&query.text);
        }

        let session_id = query
            .session_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let Some(selected) = self.classifier.classify(&text) else {
            self.metrics.inc_direct_reply();
            info!(session_id = %session_id, "no capability matched, answering directly");
            return direct_reply(&compose_direct_text(&text), &query.text);
        };

        let Some(capability) = self.registry.lookup(&selected.capability) else {
            // Classifier and registry disagree: an internal defect, not a user error.
            warn!(
                session_id = %session_id,
                capability = %selected.capability,
                "classifier selected a capability missing from the registry"
            );
            self.metrics.inc_direct_reply();
            return direct_reply(&compose_direct_text(&text), &query.text);
        };

        let params = extract_params(capability, &text);
        let reply = self
            .finish_dispatch(capability, params, &query.text, &session_id)
            .await;

        self.metrics.observe_latency(started.elapsed());
        reply
    }

    pub async fn dispatch_named(
        &self,
        capability_name: &str,
        params: ParameterSet,
        query: &str,
    ) -> NormalizedReply {
        self.metrics.inc_request();

        let Some(capability) = self.registry.lookup(capability_name) else {
            warn!(capability = %capability_name, "dispatch requested for unknown capability");
            return direct_reply(&compose_direct_text(query), query);
        };

        let session_id = Uuid::new_v4().to_string();
        self.finish_dispatch(capability, params, query, &session_id)
            .await
    }

    async fn finish_dispatch(
        &self,
        capability: &Capability,
        params: ParameterSet,
        query: &str,
        session_id: &str,
    ) -> NormalizedReply {
        let missing = capability.missing_required(&params);
        if !missing.is_empty() {
            self.metrics.inc_needs_input();
            info!(
                session_id = %session_id,
                capability = %capability.name,
                missing = ?missing,
                "required parameters missing"
            );
            return needs_input_reply(&capability.name, missing, query);
        }

        self.metrics.inc_dispatch();
        let result = self.connector.dispatch(capability, &params).await;
        if result.is_failure() {
            self.metrics.inc_dispatch_failure();
        }

        let reply = normalize(result, &capability.name, query);
        info!(
            session_id = %session_id,
            capability = %capability.name,
            status = ?reply.status,
            "dispatch completed"
        );
        reply
    }
}

const GREETINGS: &[&str] = &["hello", "hi", "hey", "good morning", "good evening", "namaste"];

fn compose_direct_text(text: &str) -> String {
    let lower = text.to_lowercase();
    let greeted = GREETINGS
        .iter()
        .any(|greeting| lower.starts_with(greeting) || lower == *greeting);

    if greeted {
        "Hello! I can analyze your spending, plan a trip, or suggest an investment allocation. \
         What would you like to do?"
            .to_string()
    } else {
        "I can help with spending analysis, trip planning, and investment advice. \
         Try asking about your expenses, a trip you want to take, or where to invest."
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use teller_core::{
        standard_capabilities, DispatchResult, FailureKind, IntentMatch, KeywordClassifier,
        ParameterSet, RemoteEndpoints, ReplyStatus, SPENDING_ANALYSIS,
    };

    #[derive(Clone)]
    struct StubConnector {
        result: DispatchResult,
    }

    impl Connector for StubConnector {
        async fn dispatch(&self, _capability: &Capability, _params: &ParameterSet) -> DispatchResult {
            self.result.clone()
        }
    }

    struct FixedClassifier(&'static str);

    impl IntentClassifier for FixedClassifier {
        fn classify(&self, _text: &str) -> Option<IntentMatch> {
            Some(IntentMatch {
                capability: self.0.to_string(),
                matched_phrase: "stub".to_string(),
            })
        }
    }

    fn orchestrator_with(
        result: DispatchResult,
        classifier: Arc<dyn IntentClassifier>,
    ) -> Orchestrator<StubConnector> {
        let registry = CapabilityRegistry::from_capabilities(standard_capabilities(
            RemoteEndpoints {
                spending: "http://127.0.0.1:8101/v1/summary".to_string(),
                trip: "http://127.0.0.1:8102/v1/plan".to_string(),
            },
        ))
        .unwrap();

        Orchestrator::new(
            Arc::new(registry),
            Arc::new(StubConnector { result }),
            classifier,
            AppMetrics::shared(),
        )
    }

    fn ok_connector_result() -> DispatchResult {
        DispatchResult::Success {
            payload: json!({"total_spent": 10500, "transaction_count": 5}),
        }
    }

    fn query(text: &str) -> ChatQuery {
        ChatQuery {
            text: text.to_string(),
            session_id: Some("session-1".to_string()),
        }
    }

    #[tokio::test]
    async fn empty_query_is_rejected_before_dispatch() {
        let orchestrator =
            orchestrator_with(ok_connector_result(), Arc::new(KeywordClassifier));

        let reply = orchestrator.handle(query("   ")).await;

        assert_eq!(reply.status, ReplyStatus::Error);
        assert_eq!(reply.error.unwrap().kind, FailureKind::InvalidQuery);
    }

    #[tokio::test]
    async fn greeting_gets_a_direct_reply() {
        let orchestrator =
            orchestrator_with(ok_connector_result(), Arc::new(KeywordClassifier));

        let reply = orchestrator.handle(query("hello there")).await;

        assert_eq!(reply.status, ReplyStatus::Ok);
        assert!(reply.capability.is_none());
        assert!(reply.reply_text.starts_with("Hello!"));
    }

    #[tokio::test]
    async fn missing_parameters_ask_instead_of_guessing() {
        let orchestrator =
            orchestrator_with(ok_connector_result(), Arc::new(KeywordClassifier));

        let reply = orchestrator.handle(query("show my expenses")).await;

        assert_eq!(reply.status, ReplyStatus::NeedsInput);
        assert_eq!(reply.missing_parameters, ["user_id"]);
        assert_eq!(reply.capability.as_deref(), Some(SPENDING_ANALYSIS));
    }

    #[tokio::test]
    async fn complete_query_dispatches_and_normalizes() {
        let orchestrator =
            orchestrator_with(ok_connector_result(), Arc::new(KeywordClassifier));

        let reply = orchestrator
            .handle(query("spending analysis for user_123"))
            .await;

        assert_eq!(reply.status, ReplyStatus::Ok);
        assert_eq!(reply.capability.as_deref(), Some(SPENDING_ANALYSIS));
        assert_eq!(reply.query, "spending analysis for user_123");
    }

    #[tokio::test]
    async fn backend_failure_stays_a_normalized_error() {
        let orchestrator = orchestrator_with(
            DispatchResult::failure(FailureKind::Unavailable, "spending_analysis is unreachable"),
            Arc::new(KeywordClassifier),
        );

        let reply = orchestrator
            .handle(query("spending analysis for user_123"))
            .await;

        assert_eq!(reply.status, ReplyStatus::Error);
        assert_eq!(reply.error.unwrap().kind, FailureKind::Unavailable);
    }

    #[tokio::test]
    async fn unknown_capability_degrades_to_direct_reply() {
        let orchestrator = orchestrator_with(
            ok_connector_result(),
            Arc::new(FixedClassifier("time_travel")),
        );

        let reply = orchestrator.handle(query("book me a time machine")).await;

        assert_eq!(reply.status, ReplyStatus::Ok);
        assert!(reply.capability.is_none());
    }

    #[tokio::test]
    async fn identical_queries_produce_identical_replies() {
        let orchestrator =
            orchestrator_with(ok_connector_result(), Arc::new(KeywordClassifier));

        let first = orchestrator
            .handle(query("spending analysis for user_123"))
            .await;
        let second = orchestrator
            .handle(query("spending analysis for user_123"))
            .await;

        assert_eq!(
            serde_json::to_value(&first).unwrap(),
            serde_json::to_value(&second).unwrap()
        );
    }
}
