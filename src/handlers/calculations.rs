use actix_web::{web, HttpResponse};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::handlers::ApiResponse;
use crate::middleware::auth::Claims;
use crate::models::solar_calculation::{self, SystemType};
use crate::models::user_stats;
use crate::services::ledger::{LedgerService, StatEvent, CALCULATOR_REWARD_COINS};
use crate::services::recommendation::{self, sunlight_for_city};
use crate::services::solar_yield::{self, SolarProfile, YieldEstimate, DEFAULT_EFFICIENCY};
use crate::utils::config::Config;
use crate::utils::errors::ApiError;
use crate::utils::validators::validate_city_name;

/// Reference system sizes shown on the comparison page, kW.
const COMPARISON_CAPACITIES_KW: [f64; 5] = [3.0, 5.0, 10.0, 15.0, 25.0];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculateRequest {
    pub panel_capacity: f64,
    pub sunlight_hours: f64,
    pub efficiency: Option<f64>,
    pub city: String,
    pub system_type: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationResponse {
    pub calculation: solar_calculation::Model,
    pub reward_coins: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<user_stats::Model>,
}

fn parse_system_type(raw: Option<&str>) -> Result<SystemType, ApiError> {
    match raw {
        None => Ok(SystemType::GridTied),
        Some("grid-tied") => Ok(SystemType::GridTied),
        Some("off-grid") => Ok(SystemType::OffGrid),
        Some("hybrid") => Ok(SystemType::Hybrid),
        Some(other) => Err(ApiError::validation(format!(
            "Unknown system type '{}'. Supported: grid-tied, off-grid, hybrid",
            other
        ))),
    }
}

/// POST /api/calculate
pub async fn calculate(
    db: web::Data<DatabaseConnection>,
    config: web::Data<Config>,
    user_claims: web::ReqData<Claims>,
    payload: web::Json<CalculateRequest>,
) -> Result<HttpResponse, ApiError> {
    let user_id = user_claims
        .user_id()
        .map_err(|e| ApiError::validation(format!("Invalid user ID: {}", e)))?;

    validate_city_name(&payload.city).map_err(|e| ApiError::validation(e.to_string()))?;
    let system_type = parse_system_type(payload.system_type.as_deref())?;

    let profile = SolarProfile {
        panel_capacity_kw: payload.panel_capacity,
        sunlight_hours: payload.sunlight_hours,
        efficiency: payload.efficiency.unwrap_or(DEFAULT_EFFICIENCY),
    };

    let estimate = solar_yield::calculate(
        &profile,
        config.electricity_rate,
        config.carbon_intensity,
    )
    .map_err(|e| ApiError::validation(e.to_string()))?;

    let row = solar_calculation::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        city: Set(payload.city.trim().to_string()),
        system_type: Set(system_type),
        panel_capacity_kw: Set(profile.panel_capacity_kw),
        sunlight_hours: Set(profile.sunlight_hours),
        efficiency: Set(profile.efficiency),
        electricity_rate: Set(config.electricity_rate),
        carbon_intensity: Set(config.carbon_intensity),
        energy_per_day: Set(estimate.energy_per_day),
        energy_per_month: Set(estimate.energy_per_month),
        energy_per_year: Set(estimate.energy_per_year),
        cost_saving_per_day: Set(estimate.cost_saving_per_day),
        cost_saving_per_month: Set(estimate.cost_saving_per_month),
        cost_saving_per_year: Set(estimate.cost_saving_per_year),
        co2_reduced_per_day: Set(estimate.co2_reduced_per_day),
        co2_reduced_per_month: Set(estimate.co2_reduced_per_month),
        co2_reduced_per_year: Set(estimate.co2_reduced_per_year),
        trees_equivalent: Set(estimate.trees_equivalent),
        created_at: Set(Utc::now()),
    };
    let calculation = row.insert(db.get_ref()).await?;

    // Calculator reward is fire-and-forget: the calculation result is
    // returned even if the coin grant fails.
    let ledger = LedgerService::new(db.get_ref().clone());
    let stats = match ledger.apply(user_id, StatEvent::CalculatorUsed).await {
        Ok(stats) => Some(stats),
        Err(e) => {
            log::error!("Failed to grant calculator reward: {}", e);
            None
        }
    };

    Ok(ApiResponse::created(
        "Calculation saved",
        CalculationResponse {
            calculation,
            reward_coins: CALCULATOR_REWARD_COINS,
            stats,
        },
    ))
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<i32>,
    pub offset: Option<i32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    pub calculations: Vec<solar_calculation::Model>,
    pub total: i64,
    pub has_more: bool,
}

/// GET /api/calculate/history
pub async fn history(
    db: web::Data<DatabaseConnection>,
    user_claims: web::ReqData<Claims>,
    query: web::Query<HistoryQuery>,
) -> Result<HttpResponse, ApiError> {
    let user_id = user_claims
        .user_id()
        .map_err(|e| ApiError::validation(format!("Invalid user ID: {}", e)))?;

    let limit = query.limit.unwrap_or(20).clamp(1, 100) as u64;
    let offset = query.offset.unwrap_or(0).max(0) as u64;

    let base = solar_calculation::Entity::find()
        .filter(solar_calculation::Column::UserId.eq(user_id));

    let total = base.clone().count(db.get_ref()).await?;

    let calculations = base
        .order_by_desc(solar_calculation::Column::CreatedAt)
        .limit(limit)
        .offset(offset)
        .all(db.get_ref())
        .await?;

    Ok(ApiResponse::ok(
        "Calculation history",
        HistoryResponse {
            calculations,
            total: total as i64,
            has_more: (offset + limit) < total,
        },
    ))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendRequest {
    pub monthly_bill: f64,
    pub city: String,
    pub roof_area: Option<f64>,
}

/// POST /api/calculate/recommend
pub async fn recommend(
    config: web::Data<Config>,
    payload: web::Json<RecommendRequest>,
) -> Result<HttpResponse, ApiError> {
    validate_city_name(&payload.city).map_err(|e| ApiError::validation(e.to_string()))?;

    let recommendation = recommendation::recommend(
        payload.monthly_bill,
        &payload.city,
        payload.roof_area,
        config.electricity_rate,
    )
    .map_err(|e| ApiError::validation(e.to_string()))?;

    Ok(ApiResponse::ok("System recommendation", recommendation))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompareRequest {
    pub city: String,
    pub sunlight_hours: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonEntry {
    pub capacity_kw: f64,
    pub estimate: YieldEstimate,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResponse {
    pub city: String,
    pub sunlight_hours: f64,
    pub systems: Vec<ComparisonEntry>,
}

/// POST /api/calculate/compare
pub async fn compare(
    config: web::Data<Config>,
    payload: web::Json<CompareRequest>,
) -> Result<HttpResponse, ApiError> {
    validate_city_name(&payload.city).map_err(|e| ApiError::validation(e.to_string()))?;

    let sunlight_hours = payload
        .sunlight_hours
        .unwrap_or_else(|| sunlight_for_city(&payload.city));

    let mut systems = Vec::with_capacity(COMPARISON_CAPACITIES_KW.len());
    for capacity_kw in COMPARISON_CAPACITIES_KW {
        let estimate = solar_yield::calculate(
            &SolarProfile {
                panel_capacity_kw: capacity_kw,
                sunlight_hours,
                efficiency: DEFAULT_EFFICIENCY,
            },
            config.electricity_rate,
            config.carbon_intensity,
        )
        .map_err(|e| ApiError::validation(e.to_string()))?;

        systems.push(ComparisonEntry {
            capacity_kw,
            estimate,
        });
    }

    Ok(ApiResponse::ok(
        "System comparison",
        ComparisonResponse {
            city: payload.city.trim().to_string(),
            sunlight_hours,
            systems,
        },
    ))
}
