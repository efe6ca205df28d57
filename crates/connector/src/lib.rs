use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use teller_core::{
    Capability, CapabilityRegistry, DispatchResult, DispatchTarget, FailureKind, ParameterSet,
};
use thiserror::Error;
use tracing::warn;

pub type LocalHandler = Arc<dyn Fn(&ParameterSet) -> anyhow::Result<Value> + Send + Sync>;

#[derive(Debug, Error)]
pub enum ConnectorError {
    #[error("local capability {0} has no registered handler")]
    MissingLocalHandler(String),
    #[error("failed to build http client")]
    HttpClient(#[from] reqwest::Error),
}

pub trait Connector: Send + Sync {
    fn dispatch(
        &self,
        capability: &Capability,
        params: &ParameterSet,
    ) -> impl std::future::Future<Output = DispatchResult> + Send;
}

#[derive(Clone)]
pub struct HttpConnector {
    client: Client,
    timeout: Duration,
    local_handlers: HashMap<String, LocalHandler>,
}

impl HttpConnector {
    pub fn new(timeout: Duration) -> Result<Self, ConnectorError> {
        let client = Client::builder()
            .connect_timeout(timeout.min(Duration::from_secs(3)))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            timeout,
            local_handlers: HashMap::new(),
        })
    }

    pub fn with_local_handler(mut self, capability: &str, handler: LocalHandler) -> Self {
        self.local_handlers.insert(capability.to_string(), handler);
        self
    }

    pub fn verify_against(&self, registry: &CapabilityRegistry) -> Result<(), ConnectorError> {
        for capability in registry.all() {
            if capability.target == DispatchTarget::Local
                && !self.local_handlers.contains_key(&capability.name)
            {
                return Err(ConnectorError::MissingLocalHandler(capability.name.clone()));
            }
        }
        Ok(())
    }

    async fn dispatch_remote(
        &self,
        capability: &Capability,
        endpoint: &str,
        params: &ParameterSet,
    ) -> DispatchResult {
        let response = match self.client.post(endpoint).json(params).send().await {
            Ok(response) => response,
            Err(error) => {
                warn!(capability = %capability.name, error = %error, "remote dispatch failed");
                let message = if error.is_timeout() {
                    format!(
                        "{} did not answer within {}s",
                        capability.name,
                        self.timeout.as_secs()
                    )
                } else {
                    format!("{} is unreachable", capability.name)
                };
                return DispatchResult::failure(FailureKind::Unavailable, message);
            }
        };

        if !response.status().is_success() {
            warn!(
                capability = %capability.name,
                status = %response.status(),
                "remote dispatch returned an error status"
            );
            return DispatchResult::failure(
                FailureKind::Unavailable,
                format!("{} rejected the request", capability.name),
            );
        }

        match response.json::<Value>().await {
            Ok(payload) => DispatchResult::Success { payload },
            Err(error) => {
                warn!(capability = %capability.name, error = %error, "remote response was not valid json");
                DispatchResult::failure(
                    FailureKind::Unavailable,
                    format!("{} returned an unreadable response", capability.name),
                )
            }
        }
    }

    fn dispatch_local(&self, capability: &Capability, params: &ParameterSet) -> DispatchResult {
        let Some(handler) = self.local_handlers.get(&capability.name) else {
            // verify_against catches this at startup; reaching it here is a wiring defect.
            warn!(capability = %capability.name, "local dispatch without a registered handler");
            return DispatchResult::failure(
                FailureKind::Internal,
                format!("{} has no local handler", capability.name),
            );
        };

        match handler(params) {
            Ok(payload) => DispatchResult::Success { payload },
            Err(error) => {
                warn!(capability = %capability.name, error = %error, "local dispatch failed");
                DispatchResult::failure(FailureKind::Internal, error.to_string())
            }
        }
    }
}

impl Connector for HttpConnector {
    async fn dispatch(&self, capability: &Capability, params: &ParameterSet) -> DispatchResult {
        match &capability.target {
            DispatchTarget::Remote { endpoint } => {
                self.dispatch_remote(capability, endpoint, params).await
            }
            DispatchTarget::Local => self.dispatch_local(capability, params),
        }
    }
}
