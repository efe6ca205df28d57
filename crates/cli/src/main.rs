use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use teller_backends::investment;
use teller_connector::HttpConnector;
use teller_core::{
    standard_capabilities, CapabilityRegistry, ChatQuery, KeywordClassifier, ParameterSet,
    RemoteEndpoints, ReplyStatus, INVESTMENT_ADVICE, SPENDING_ANALYSIS, TRIP_PLANNING,
};
use teller_observability::{init_tracing, AppMetrics};
use teller_orchestrator::Orchestrator;

#[derive(Debug, Parser)]
#[command(name = "teller")]
#[command(about = "Teller concierge CLI")]
struct Cli {
    #[arg(
        long,
        env = "TELLER_SPENDING_URL",
        default_value = "http://127.0.0.1:8101/v1/summary"
    )]
    spending_url: String,

    #[arg(
        long,
        env = "TELLER_TRIP_URL",
        default_value = "http://127.0.0.1:8102/v1/plan"
    )]
    trip_url: String,

    #[arg(long, env = "TELLER_DISPATCH_TIMEOUT_SECS", default_value_t = 5)]
    dispatch_timeout_secs: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    Chat,
    Ask {
        query: String,
    },
    Spend {
        #[arg(long)]
        user_id: String,
        #[arg(long)]
        month: Option<String>,
    },
    PlanTrip {
        #[arg(long)]
        origin: String,
        #[arg(long)]
        destination: String,
        #[arg(long, default_value_t = 2)]
        days: u8,
        #[arg(long)]
        budget: i64,
        #[arg(long, default_value = "balanced")]
        style: String,
    },
    Invest {
        #[arg(long)]
        risk: String,
        #[arg(long)]
        amount: i64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("teller_cli");
    let cli = Cli::parse();

    let orchestrator = build_orchestrator(&cli)?;

    match cli.command {
        Command::Chat => run_chat(orchestrator).await?,
        Command::Ask { query } => {
            let reply = orchestrator
                .handle(ChatQuery {
                    text: query,
                    session_id: None,
                })
                .await;
            println!("{}", serde_json::to_string_pretty(&reply)?);
        }
        Command::Spend { user_id, month } => {
            let mut params = ParameterSet::new();
            params.insert("user_id".to_string(), json!(user_id));
            if let Some(month) = month {
                params.insert("month".to_string(), json!(month));
            }

            let reply = orchestrator
                .dispatch_named(SPENDING_ANALYSIS, params, "spend summary")
                .await;
            println!("{}", serde_json::to_string_pretty(&reply)?);
        }
        Command::PlanTrip {
            origin,
            destination,
            days,
            budget,
            style,
        } => {
            let mut params = ParameterSet::new();
            params.insert("origin".to_string(), json!(origin));
            params.insert("destination".to_string(), json!(destination));
            params.insert("days".to_string(), json!(days));
            params.insert("budget_inr".to_string(), json!(budget));
            params.insert("travel_style".to_string(), json!(style));

            let reply = orchestrator
                .dispatch_named(TRIP_PLANNING, params, "plan trip")
                .await;
            println!("{}", serde_json::to_string_pretty(&reply)?);
        }
        Command::Invest { risk, amount } => {
            let mut params = ParameterSet::new();
            params.insert("risk".to_string(), json!(risk));
            params.insert("amount".to_string(), json!(amount));

            let reply = orchestrator
                .dispatch_named(INVESTMENT_ADVICE, params, "investment advice")
                .await;
            println!("{}", serde_json::to_string_pretty(&reply)?);
        }
    }

    Ok(())
}

async fn run_chat(orchestrator: Orchestrator<HttpConnector>) -> Result<()> {
    println!("Teller chat mode. type 'exit' to quit.");

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        io::stdin().read_line(&mut line)?;

        let message = line.trim();
        if message.eq_ignore_ascii_case("exit") || message.eq_ignore_ascii_case("quit") {
            break;
        }

        if message.is_empty() {
            continue;
        }

        let reply = orchestrator
            .handle(ChatQuery {
                text: message.to_string(),
                session_id: None,
            })
            .await;

        println!("\n{}\n", reply.reply_text);

        if reply.status == ReplyStatus::NeedsInput && !reply.missing_parameters.is_empty() {
            println!("Still needed:");
            for name in &reply.missing_parameters {
                println!("- {name}");
            }
            println!();
        }
    }

    Ok(())
}

fn build_orchestrator(cli: &Cli) -> Result<Orchestrator<HttpConnector>> {
    let registry = CapabilityRegistry::from_capabilities(standard_capabilities(RemoteEndpoints {
        spending: cli.spending_url.clone(),
        trip: cli.trip_url.clone(),
    }))
    .context("failed to build capability registry")?;

    let connector = HttpConnector::new(Duration::from_secs(cli.dispatch_timeout_secs))
        .context("failed to build backend connector")?
        .with_local_handler(INVESTMENT_ADVICE, Arc::new(investment::handle));
    connector
        .verify_against(&registry)
        .context("capability registry is not fully dispatchable")?;

    Ok(Orchestrator::new(
        Arc::new(registry),
        Arc::new(connector),
        Arc::new(KeywordClassifier),
        AppMetrics::shared(),
    ))
}
