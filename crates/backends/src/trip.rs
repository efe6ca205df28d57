use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TravelStyle {
    Cheap,
    Balanced,
    Premium,
}

impl TravelStyle {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "cheap" | "budget" => Some(Self::Cheap),
            "balanced" => Some(Self::Balanced),
            "premium" | "luxury" => Some(Self::Premium),
            _ => None,
        }
    }

    fn hotel_suggestion(self) -> &'static str {
        match self {
            Self::Cheap => "Budget hotel / hostel near city center (₹500-800/night)",
            Self::Balanced => "3-star hotel with breakfast included (₹1500-2500/night)",
            Self::Premium => "5-star resort with ocean/city view (₹5000+/night)",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlanRequest {
    pub origin: String,
    pub destination: String,
    pub days: u8,
    pub budget_inr: i64,
    pub travel_style: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayPlan {
    pub day: u8,
    pub morning: String,
    pub afternoon: String,
    pub evening: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetBreakdown {
    pub hotel: i64,
    pub food: i64,
    pub activities: i64,
    pub transport: i64,
}

impl BudgetBreakdown {
    fn total(&self) -> i64 {
        self.hotel + self.food + self.activities + self.transport
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripPlan {
    pub origin: String,
    pub destination: String,
    pub days: u8,
    pub budget_inr: i64,
    pub travel_style: TravelStyle,
    pub hotel_suggestion: String,
    pub daily_plan: Vec<DayPlan>,
    pub budget_breakdown: BudgetBreakdown,
    pub total_budget: i64,
}

pub fn plan_trip(request: &PlanRequest) -> TripPlan {
    let style = request
        .travel_style
        .as_deref()
        .and_then(TravelStyle::parse)
        .unwrap_or(TravelStyle::Balanced);
    let hotel = style.hotel_suggestion();
    let days = request.days.clamp(1, 10);

    let daily_plan = (1..=days)
        .map(|day| DayPlan {
            day,
            morning: format!("Explore local attractions in {}", request.destination),
            afternoon: "Try popular local cuisine and street food".to_string(),
            evening: format!("Relax at {hotel}"),
        })
        .collect();

    // Truncating shares, summed back so the parts always equal the reported total.
    let budget_breakdown = BudgetBreakdown {
        hotel: request.budget_inr * 4 / 10,
        food: request.budget_inr * 3 / 10,
        activities: request.budget_inr * 2 / 10,
        transport: request.budget_inr / 10,
    };
    let total_budget = budget_breakdown.total();

    TripPlan {
        origin: request.origin.clone(),
        destination: request.destination.clone(),
        days,
        budget_inr: request.budget_inr,
        travel_style: style,
        hotel_suggestion: hotel.to_string(),
        daily_plan,
        budget_breakdown,
        total_budget,
    }
}

async fn plan(Json(request): Json<PlanRequest>) -> Json<TripPlan> {
    let plan = plan_trip(&request);
    tracing::info!(
        origin = %plan.origin,
        destination = %plan.destination,
        days = plan.days,
        travel_style = ?plan.travel_style,
        "trip plan served"
    );
    Json(plan)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "service": "trip-planning" }))
}

pub fn router() -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/v1/plan", post(plan))
}
