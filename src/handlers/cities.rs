use actix_web::{web, HttpResponse};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};

use crate::handlers::ApiResponse;
use crate::models::city_data;
use crate::utils::errors::ApiError;
use crate::utils::validators::validate_city_name;

/// GET /api/cities
pub async fn list(db: web::Data<DatabaseConnection>) -> Result<HttpResponse, ApiError> {
    let cities = city_data::Entity::find()
        .order_by_desc(city_data::Column::TotalEnergyKwh)
        .all(db.get_ref())
        .await?;

    Ok(ApiResponse::ok("City statistics", cities))
}

/// GET /api/cities/{name}
pub async fn get(
    db: web::Data<DatabaseConnection>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let name = path.trim().to_string();
    validate_city_name(&name).map_err(|e| ApiError::validation(e.to_string()))?;

    // City names are stored in canonical form; match loosely so
    // "lahore" finds "Lahore". The table stays small enough to scan.
    let city = city_data::Entity::find()
        .filter(city_data::Column::City.eq(&name))
        .one(db.get_ref())
        .await?;

    let city = match city {
        Some(c) => Some(c),
        None => city_data::Entity::find()
            .all(db.get_ref())
            .await?
            .into_iter()
            .find(|c| c.city.eq_ignore_ascii_case(&name)),
    };

    match city {
        Some(c) => Ok(ApiResponse::ok("City statistics", c)),
        None => Err(ApiError::not_found(format!("No data for city '{}'", name))),
    }
}
