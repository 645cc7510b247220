use actix_web::{web, HttpResponse};
use chrono::Utc;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use serde::Serialize;
use std::collections::HashSet;
use uuid::Uuid;

use crate::handlers::ApiResponse;
use crate::middleware::auth::Claims;
use crate::models::{challenge, user_challenge, user_stats};
use crate::services::ledger::LedgerService;
use crate::utils::errors::ApiError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeEntry {
    #[serde(flatten)]
    pub challenge: challenge::Model,
    pub completed: bool,
}

/// GET /api/challenges
pub async fn list(
    db: web::Data<DatabaseConnection>,
    user_claims: web::ReqData<Claims>,
) -> Result<HttpResponse, ApiError> {
    let user_id = user_claims
        .user_id()
        .map_err(|e| ApiError::validation(format!("Invalid user ID: {}", e)))?;

    let challenges = challenge::Entity::find()
        .filter(challenge::Column::IsActive.eq(true))
        .order_by_asc(challenge::Column::CreatedAt)
        .all(db.get_ref())
        .await?;

    let completed: HashSet<Uuid> = user_challenge::Entity::find()
        .filter(user_challenge::Column::UserId.eq(user_id))
        .filter(user_challenge::Column::Completed.eq(true))
        .all(db.get_ref())
        .await?
        .into_iter()
        .map(|record| record.challenge_id)
        .collect();

    let entries: Vec<ChallengeEntry> = challenges
        .into_iter()
        .map(|c| ChallengeEntry {
            completed: completed.contains(&c.id),
            challenge: c,
        })
        .collect();

    Ok(ApiResponse::ok("Challenges", entries))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionResponse {
    pub challenge_id: String,
    pub stats: user_stats::Model,
}

/// POST /api/challenges/{id}/complete
pub async fn complete(
    db: web::Data<DatabaseConnection>,
    user_claims: web::ReqData<Claims>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let user_id = user_claims
        .user_id()
        .map_err(|e| ApiError::validation(format!("Invalid user ID: {}", e)))?;

    let challenge_id = Uuid::parse_str(&path)
        .map_err(|e| ApiError::validation(format!("Invalid challenge ID: {}", e)))?;

    let ledger = LedgerService::new(db.get_ref().clone());
    let stats = ledger
        .complete_challenge(user_id, challenge_id, Utc::now())
        .await?;

    log::info!("User {} completed challenge {}", user_id, challenge_id);

    Ok(ApiResponse::ok(
        "Challenge completed",
        CompletionResponse {
            challenge_id: challenge_id.to_string(),
            stats,
        },
    ))
}
