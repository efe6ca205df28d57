use std::collections::HashMap;

use serde_json::json;
use thiserror::Error;

use crate::models::{Capability, DispatchTarget, ParamSpec};

pub const SPENDING_ANALYSIS: &str = "spending_analysis";
pub const TRIP_PLANNING: &str = "trip_planning";
pub const INVESTMENT_ADVICE: &str = "investment_advice";

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("duplicate capability name: {0}")]
    DuplicateName(String),
    #[error("capability {0} declares a remote target with an empty endpoint")]
    EmptyEndpoint(String),
}

#[derive(Debug, Clone, Default)]
pub struct CapabilityRegistry {
    ordered: Vec<Capability>,
    index: HashMap<String, usize>,
}

impl CapabilityRegistry {
    pub fn from_capabilities(capabilities: Vec<Capability>) -> Result<Self, RegistryError> {
        let mut ordered = Vec::with_capacity(capabilities.len());
        let mut index = HashMap::with_capacity(capabilities.len());

        for capability in capabilities {
            if let DispatchTarget::Remote { endpoint } = &capability.target {
                if endpoint.trim().is_empty() {
                    return Err(RegistryError::EmptyEndpoint(capability.name));
                }
            }
            if index.contains_key(&capability.name) {
                return Err(RegistryError::DuplicateName(capability.name));
            }
            index.insert(capability.name.clone(), ordered.len());
            ordered.push(capability);
        }

        Ok(Self { ordered, index })
    }

    pub fn lookup(&self, name: &str) -> Option<&Capability> {
        self.index.get(name).map(|position| &self.ordered[*position])
    }

    pub fn all(&self) -> &[Capability] {
        &self.ordered
    }
}

#[derive(Debug, Clone)]
pub struct RemoteEndpoints {
    pub spending: String,
    pub trip: String,
}

pub fn standard_capabilities(endpoints: RemoteEndpoints) -> Vec<Capability> {
    vec![
        Capability {
            name: SPENDING_ANALYSIS.to_string(),
            description: "Per-user spending summary with category breakdown".to_string(),
            params: vec![ParamSpec::required("user_id"), ParamSpec::optional("month")],
            target: DispatchTarget::Remote {
                endpoint: endpoints.spending,
            },
        },
        Capability {
            name: TRIP_PLANNING.to_string(),
            description: "Day-by-day trip itinerary with a budget breakdown".to_string(),
            params: vec![
                ParamSpec::required("origin"),
                ParamSpec::required("destination"),
                ParamSpec::required("days"),
                ParamSpec::required("budget_inr"),
                ParamSpec::with_default("travel_style", json!("balanced")),
            ],
            target: DispatchTarget::Remote {
                endpoint: endpoints.trip,
            },
        },
        Capability {
            name: INVESTMENT_ADVICE.to_string(),
            description: "Risk-profile based investment allocation".to_string(),
            params: vec![ParamSpec::required("risk"), ParamSpec::required("amount")],
            target: DispatchTarget::Local,
        },
    ]
}
