use actix_web::{web, HttpResponse};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::handlers::ApiResponse;
use crate::middleware::auth::Claims;
use crate::models::{achievement, user_stats};
use crate::services::ledger::{LedgerService, StatDelta};
use crate::utils::errors::ApiError;

/// Stats, streaks, and achievements are owner-only resources.
fn authorize_owner(claims: &Claims, path_id: &str) -> Result<Uuid, ApiError> {
    let target = Uuid::parse_str(path_id)
        .map_err(|e| ApiError::validation(format!("Invalid user ID: {}", e)))?;
    let caller = claims
        .user_id()
        .map_err(|e| ApiError::validation(format!("Invalid user ID: {}", e)))?;

    if caller != target {
        return Err(ApiError::forbidden(
            "You can only access your own resources",
        ));
    }

    Ok(target)
}

/// GET /api/users/{id}/stats
pub async fn get_stats(
    db: web::Data<DatabaseConnection>,
    user_claims: web::ReqData<Claims>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let user_id = authorize_owner(&user_claims, &path)?;

    let stats = user_stats::Entity::find()
        .filter(user_stats::Column::UserId.eq(user_id))
        .one(db.get_ref())
        .await?
        .ok_or_else(|| ApiError::not_found("User stats not found"))?;

    Ok(ApiResponse::ok("User stats", stats))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatsRequest {
    pub energy_saved: Option<f64>,
    pub co2_reduced: Option<f64>,
    pub green_coins: Option<i64>,
    pub energy_tokens: Option<f64>,
}

/// PUT /api/users/{id}/stats
///
/// Direct stat mutator: each supplied field is an increment (negative to
/// spend), applied through the ledger's atomic path.
pub async fn update_stats(
    db: web::Data<DatabaseConnection>,
    user_claims: web::ReqData<Claims>,
    path: web::Path<String>,
    payload: web::Json<UpdateStatsRequest>,
) -> Result<HttpResponse, ApiError> {
    let user_id = authorize_owner(&user_claims, &path)?;

    for (field, value) in [
        ("energySaved", payload.energy_saved),
        ("co2Reduced", payload.co2_reduced),
        ("energyTokens", payload.energy_tokens),
    ] {
        if let Some(v) = value {
            if !v.is_finite() {
                return Err(ApiError::validation(format!(
                    "{} must be a finite number",
                    field
                )));
            }
        }
    }

    let delta = StatDelta {
        energy_saved: payload.energy_saved.unwrap_or(0.0),
        co2_reduced: payload.co2_reduced.unwrap_or(0.0),
        green_coins: payload.green_coins.unwrap_or(0),
        energy_tokens: payload.energy_tokens.unwrap_or(0.0),
    };

    let ledger = LedgerService::new(db.get_ref().clone());
    let stats = ledger.apply_delta(user_id, delta).await?;

    Ok(ApiResponse::ok("Stats updated", stats))
}

/// POST /api/users/{id}/streak
pub async fn check_streak(
    db: web::Data<DatabaseConnection>,
    user_claims: web::ReqData<Claims>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let user_id = authorize_owner(&user_claims, &path)?;

    let ledger = LedgerService::new(db.get_ref().clone());
    let outcome = ledger.check_streak(user_id, Utc::now()).await?;

    Ok(ApiResponse::ok("Streak evaluated", outcome))
}

/// GET /api/users/{id}/achievements
pub async fn list_achievements(
    db: web::Data<DatabaseConnection>,
    user_claims: web::ReqData<Claims>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let user_id = authorize_owner(&user_claims, &path)?;

    let achievements = achievement::Entity::find()
        .filter(achievement::Column::UserId.eq(user_id))
        .order_by_desc(achievement::Column::EarnedAt)
        .all(db.get_ref())
        .await?;

    Ok(ApiResponse::ok("Achievements", achievements))
}

#[derive(Debug, Deserialize)]
pub struct AddAchievementRequest {
    pub name: String,
    pub description: Option<String>,
}

/// POST /api/users/{id}/achievements
pub async fn add_achievement(
    db: web::Data<DatabaseConnection>,
    user_claims: web::ReqData<Claims>,
    path: web::Path<String>,
    payload: web::Json<AddAchievementRequest>,
) -> Result<HttpResponse, ApiError> {
    let user_id = authorize_owner(&user_claims, &path)?;

    let name = payload.name.trim();
    if name.is_empty() || name.len() > 60 {
        return Err(ApiError::validation(
            "Achievement name must be between 1 and 60 characters",
        ));
    }

    let row = achievement::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        name: Set(name.to_string()),
        description: Set(payload.description.clone()),
        earned_at: Set(Utc::now()),
    };
    let created = row.insert(db.get_ref()).await?;

    Ok(ApiResponse::created("Achievement added", created))
}
