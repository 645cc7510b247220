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
use crate::models::report::{self, ReportStatus, ReportType};
use crate::models::user_stats;
use crate::services::ledger::{LedgerService, StatEvent, REPORT_REWARD_COINS};
use crate::utils::errors::ApiError;
use crate::utils::validators::validate_city_name;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReportRequest {
    pub report_type: String,
    pub title: String,
    pub description: String,
    pub city: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReportResponse {
    pub report: report::Model,
    pub reward_coins: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<user_stats::Model>,
}

fn parse_report_type(raw: &str) -> Result<ReportType, ApiError> {
    match raw {
        "outage" => Ok(ReportType::Outage),
        "net-metering" => Ok(ReportType::NetMetering),
        "installation" => Ok(ReportType::Installation),
        "general" => Ok(ReportType::General),
        other => Err(ApiError::validation(format!(
            "Unknown report type '{}'. Supported: outage, net-metering, installation, general",
            other
        ))),
    }
}

/// POST /api/reports
pub async fn submit(
    db: web::Data<DatabaseConnection>,
    user_claims: web::ReqData<Claims>,
    payload: web::Json<SubmitReportRequest>,
) -> Result<HttpResponse, ApiError> {
    let user_id = user_claims
        .user_id()
        .map_err(|e| ApiError::validation(format!("Invalid user ID: {}", e)))?;

    let report_type = parse_report_type(&payload.report_type)?;

    let title = payload.title.trim();
    if title.is_empty() || title.len() > 100 {
        return Err(ApiError::validation(
            "Title must be between 1 and 100 characters",
        ));
    }
    let description = payload.description.trim();
    if description.is_empty() || description.len() > 2000 {
        return Err(ApiError::validation(
            "Description must be between 1 and 2000 characters",
        ));
    }
    if let Some(city) = &payload.city {
        validate_city_name(city).map_err(|e| ApiError::validation(e.to_string()))?;
    }

    let row = report::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        report_type: Set(report_type),
        title: Set(title.to_string()),
        description: Set(description.to_string()),
        city: Set(payload.city.as_ref().map(|c| c.trim().to_string())),
        status: Set(ReportStatus::Pending),
        created_at: Set(Utc::now()),
    };
    let created = row.insert(db.get_ref()).await?;

    // TODO: align with the per-type reward table the client displays
    // (25-100 coins); the grant is a flat 10 until product signs off.
    let ledger = LedgerService::new(db.get_ref().clone());
    let stats = match ledger.apply(user_id, StatEvent::ReportSubmitted).await {
        Ok(stats) => Some(stats),
        Err(e) => {
            log::error!("Failed to grant report reward: {}", e);
            None
        }
    };

    Ok(ApiResponse::created(
        "Report submitted",
        SubmitReportResponse {
            report: created,
            reward_coins: REPORT_REWARD_COINS,
            stats,
        },
    ))
}

#[derive(Debug, Deserialize)]
pub struct ReportsQuery {
    pub limit: Option<i32>,
    pub offset: Option<i32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportsResponse {
    pub reports: Vec<report::Model>,
    pub total: i64,
    pub has_more: bool,
}

/// GET /api/reports
pub async fn list(
    db: web::Data<DatabaseConnection>,
    user_claims: web::ReqData<Claims>,
    query: web::Query<ReportsQuery>,
) -> Result<HttpResponse, ApiError> {
    let user_id = user_claims
        .user_id()
        .map_err(|e| ApiError::validation(format!("Invalid user ID: {}", e)))?;

    let limit = query.limit.unwrap_or(20).clamp(1, 100) as u64;
    let offset = query.offset.unwrap_or(0).max(0) as u64;

    let base = report::Entity::find().filter(report::Column::UserId.eq(user_id));

    let total = base.clone().count(db.get_ref()).await?;

    let reports = base
        .order_by_desc(report::Column::CreatedAt)
        .limit(limit)
        .offset(offset)
        .all(db.get_ref())
        .await?;

    Ok(ApiResponse::ok(
        "Reports",
        ReportsResponse {
            reports,
            total: total as i64,
            has_more: (offset + limit) < total,
        },
    ))
}
