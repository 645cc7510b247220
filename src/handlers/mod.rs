pub mod auth;
pub mod calculations;
pub mod challenges;
pub mod cities;
pub mod energy;
pub mod reports;
pub mod users;
pub mod weather;

use actix_web::HttpResponse;
use serde::Serialize;

/// Uniform success envelope; errors go through `ApiError` and carry the
/// same shape with `success: false`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> HttpResponse {
        HttpResponse::Ok().json(Self {
            success: true,
            message: message.into(),
            data: Some(data),
        })
    }

    pub fn created(message: impl Into<String>, data: T) -> HttpResponse {
        HttpResponse::Created().json(Self {
            success: true,
            message: message.into(),
            data: Some(data),
        })
    }
}
