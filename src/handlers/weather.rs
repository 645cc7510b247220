use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::Deserialize;

use crate::handlers::ApiResponse;
use crate::services::weather::WeatherService;
use crate::utils::config::Config;
use crate::utils::errors::ApiError;
use crate::utils::validators::validate_city_name;

#[derive(Debug, Deserialize)]
pub struct SunlightQuery {
    pub city: String,
}

/// GET /api/weather/sunlight
///
/// Never fails on upstream weather trouble; the response's `source` field
/// tells the caller whether the figure is live or simulated.
pub async fn sunlight(
    config: web::Data<Config>,
    query: web::Query<SunlightQuery>,
) -> Result<HttpResponse, ApiError> {
    validate_city_name(&query.city).map_err(|e| ApiError::validation(e.to_string()))?;

    let service = WeatherService::from_config(&config);
    let data = service
        .sunlight_hours(&query.city, Utc::now().date_naive())
        .await;

    Ok(ApiResponse::ok("Sunlight data", data))
}
