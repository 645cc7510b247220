use actix_web::{web, HttpResponse};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::handlers::ApiResponse;
use crate::middleware::auth::Claims;
use crate::models::energy_event::{self, EnergyEventType};
use crate::models::user_stats;
use crate::services::ledger::{LedgerService, StatEvent};
use crate::utils::errors::ApiError;
use crate::utils::validators::{validate_city_name, validate_energy_amount};

#[derive(Debug, Deserialize)]
pub struct RecordEnergyRequest {
    pub city: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub amount: f64,
    pub source: Option<String>,
    pub metadata: Option<JsonValue>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordEnergyResponse {
    pub event: energy_event::Model,
    pub stats: user_stats::Model,
}

fn parse_event_type(raw: &str) -> Result<EnergyEventType, ApiError> {
    match raw {
        "production" => Ok(EnergyEventType::Production),
        "saving" => Ok(EnergyEventType::Saving),
        other => Err(ApiError::validation(format!(
            "Unknown energy event type '{}'. Supported: production, saving",
            other
        ))),
    }
}

/// POST /api/energy
pub async fn record(
    db: web::Data<DatabaseConnection>,
    user_claims: web::ReqData<Claims>,
    payload: web::Json<RecordEnergyRequest>,
) -> Result<HttpResponse, ApiError> {
    let user_id = user_claims
        .user_id()
        .map_err(|e| ApiError::validation(format!("Invalid user ID: {}", e)))?;

    validate_city_name(&payload.city).map_err(|e| ApiError::validation(e.to_string()))?;
    validate_energy_amount(payload.amount).map_err(|e| ApiError::validation(e.to_string()))?;
    let event_type = parse_event_type(&payload.event_type)?;

    let city = payload.city.trim().to_string();

    // First event in this city makes the user a new participant there.
    let prior_in_city = energy_event::Entity::find()
        .filter(energy_event::Column::UserId.eq(user_id))
        .filter(energy_event::Column::City.eq(&city))
        .count(db.get_ref())
        .await?;

    let row = energy_event::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        city: Set(city.clone()),
        event_type: Set(event_type),
        amount_kwh: Set(payload.amount),
        source: Set(payload.source.clone()),
        metadata: Set(payload
            .metadata
            .clone()
            .unwrap_or_else(|| serde_json::json!({}))),
        created_at: Set(Utc::now()),
    };
    let event = row.insert(db.get_ref()).await?;

    let ledger = LedgerService::new(db.get_ref().clone());
    let stats = ledger
        .apply(user_id, StatEvent::EnergyRecorded { kwh: payload.amount })
        .await?;

    // The city aggregate is a second, uncoordinated write; on failure the
    // user keeps their credit and the city total lags until the next event.
    if let Err(e) = ledger
        .record_city_energy(&city, payload.amount, prior_in_city == 0)
        .await
    {
        log::error!("Failed to update city aggregate for '{}': {}", city, e);
    }

    log::info!(
        "Recorded {} kWh ({:?}) for user {} in {}",
        payload.amount,
        event.event_type,
        user_id,
        city
    );

    Ok(ApiResponse::created(
        "Energy event recorded",
        RecordEnergyResponse { event, stats },
    ))
}

#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    pub limit: Option<i32>,
    pub offset: Option<i32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsResponse {
    pub events: Vec<energy_event::Model>,
    pub total: i64,
    pub has_more: bool,
}

/// GET /api/energy
pub async fn list(
    db: web::Data<DatabaseConnection>,
    user_claims: web::ReqData<Claims>,
    query: web::Query<EventsQuery>,
) -> Result<HttpResponse, ApiError> {
    let user_id = user_claims
        .user_id()
        .map_err(|e| ApiError::validation(format!("Invalid user ID: {}", e)))?;

    let limit = query.limit.unwrap_or(20).clamp(1, 100) as u64;
    let offset = query.offset.unwrap_or(0).max(0) as u64;

    let base = energy_event::Entity::find().filter(energy_event::Column::UserId.eq(user_id));

    let total = base.clone().count(db.get_ref()).await?;

    let events = base
        .order_by_desc(energy_event::Column::CreatedAt)
        .limit(limit)
        .offset(offset)
        .all(db.get_ref())
        .await?;

    Ok(ApiResponse::ok(
        "Energy events",
        EventsResponse {
            events,
            total: total as i64,
            has_more: (offset + limit) < total,
        },
    ))
}
