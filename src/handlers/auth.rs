use actix_web::{web, HttpResponse};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::handlers::ApiResponse;
use crate::models::user;
use crate::services::ledger::{LedgerService, StreakOutcome};
use crate::utils::auth::{create_jwt, hash_password, verify_password};
use crate::utils::config::Config;
use crate::utils::errors::ApiError;
use crate::utils::validators::{validate_city_name, validate_email, validate_username};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub city: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub user_id: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub streak: Option<StreakOutcome>,
}

/// POST /auth/register
pub async fn register(
    db: web::Data<DatabaseConnection>,
    config: web::Data<Config>,
    req: web::Json<RegisterRequest>,
) -> Result<HttpResponse, ApiError> {
    log::info!("Registration attempt for username: {}", req.username);

    if !config.allow_registration {
        log::warn!("Registration attempt rejected - registration is disabled");
        return Err(ApiError::forbidden("Registration is currently disabled"));
    }

    validate_username(&req.username).map_err(|e| ApiError::validation(e.to_string()))?;
    validate_email(&req.email).map_err(|e| ApiError::validation(e.to_string()))?;
    if let Some(city) = &req.city {
        validate_city_name(city).map_err(|e| ApiError::validation(e.to_string()))?;
    }
    if req.password.len() < 8 {
        return Err(ApiError::validation(
            "Password must be at least 8 characters",
        ));
    }

    let email = req.email.trim().to_lowercase();

    let email_taken = user::Entity::find()
        .filter(user::Column::Email.eq(&email))
        .one(db.get_ref())
        .await?;
    if email_taken.is_some() {
        log::warn!("Registration failed - email already registered");
        return Err(ApiError::validation("Email is already registered"));
    }

    let username_taken = user::Entity::find()
        .filter(user::Column::Username.eq(&req.username))
        .one(db.get_ref())
        .await?;
    if username_taken.is_some() {
        log::warn!(
            "Registration failed - username '{}' already exists",
            req.username
        );
        return Err(ApiError::validation("Username already exists"));
    }

    let password_hash = hash_password(&req.password)
        .map_err(|e| ApiError::Internal(format!("Failed to hash password: {}", e)))?;

    let now = Utc::now();
    let new_user = user::ActiveModel {
        id: Set(Uuid::new_v4()),
        username: Set(req.username.clone()),
        email: Set(email),
        password_hash: Set(password_hash),
        city: Set(req.city.as_ref().map(|c| c.trim().to_string())),
        created_at: Set(now),
        updated_at: Set(now),
    };

    let created = new_user.insert(db.get_ref()).await?;
    log::info!(
        "User '{}' created successfully (ID: {})",
        created.username,
        created.id
    );

    // Stats row with the welcome bonus. A failure here is logged rather
    // than rolling the account back; the row is recreated on support's side.
    let ledger = LedgerService::new(db.get_ref().clone());
    if let Err(e) = ledger.init_stats(created.id).await {
        log::error!("Failed to create stats for '{}': {}", created.username, e);
    }

    let token = create_jwt(
        created.id,
        &created.username,
        &config.jwt_secret,
        config.jwt_expiration_hours,
    )
    .map_err(|e| ApiError::Internal(format!("Failed to generate token: {}", e)))?;

    Ok(ApiResponse::created(
        "Account created",
        AuthResponse {
            token,
            user_id: created.id.to_string(),
            username: created.username,
            streak: None,
        },
    ))
}

/// POST /auth/login
pub async fn login(
    db: web::Data<DatabaseConnection>,
    config: web::Data<Config>,
    req: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    let email = req.email.trim().to_lowercase();
    log::info!("Login attempt for {}", email);

    let found = user::Entity::find()
        .filter(user::Column::Email.eq(&email))
        .one(db.get_ref())
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid credentials".to_string()))?;

    let verified = verify_password(&req.password, &found.password_hash)
        .map_err(|e| ApiError::Internal(format!("Failed to verify password: {}", e)))?;
    if !verified {
        log::warn!("Invalid password for '{}'", found.username);
        return Err(ApiError::Unauthorized("Invalid credentials".to_string()));
    }

    let token = create_jwt(
        found.id,
        &found.username,
        &config.jwt_secret,
        config.jwt_expiration_hours,
    )
    .map_err(|e| ApiError::Internal(format!("Failed to generate token: {}", e)))?;

    // Streaks are evaluated lazily on qualifying actions; login is one.
    // A ledger failure must not block the login itself.
    let ledger = LedgerService::new(db.get_ref().clone());
    let streak = match ledger.check_streak(found.id, Utc::now()).await {
        Ok(outcome) => Some(outcome),
        Err(e) => {
            log::error!("Streak check failed for '{}': {}", found.username, e);
            None
        }
    };

    log::info!("User '{}' logged in", found.username);

    Ok(ApiResponse::ok(
        "Login successful",
        AuthResponse {
            token,
            user_id: found.id.to_string(),
            username: found.username,
            streak,
        },
    ))
}
