use anyhow::{anyhow, bail, Result};
use serde_json::{json, Value};
use teller_core::ParameterSet;

pub fn investment_advice(risk: &str, _amount: i64) -> Result<Value> {
    let payload = match risk {
        "low" => json!({
            "advice": "80% FD, 20% bonds",
            "allocation": { "FD": 0.8, "bonds": 0.2 }
        }),
        "medium" => json!({
            "advice": "50% MF, 30% bonds, 20% stocks",
            "allocation": { "MF": 0.5, "bonds": 0.3, "stocks": 0.2 }
        }),
        "high" => json!({
            "advice": "80% stocks, 20% crypto",
            "allocation": { "stocks": 0.8, "crypto": 0.2 }
        }),
        other => bail!("unknown risk category: {other}"),
    };

    Ok(payload)
}

pub fn handle(params: &ParameterSet) -> Result<Value> {
    let risk = params
        .get("risk")
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow!("risk is required"))?;
    let amount = params
        .get("amount")
        .and_then(Value::as_i64)
        .ok_or_else(|| anyhow!("amount is required"))?;

    investment_advice(&risk.to_lowercase(), amount)
}
