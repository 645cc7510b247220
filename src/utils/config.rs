use serde::Deserialize;
use std::env;

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub allow_registration: bool,
    pub frontend_url: String,
    /// Grid tariff in PKR per kWh used by the calculators.
    pub electricity_rate: f64,
    /// Grid carbon intensity in kg CO2 per kWh.
    pub carbon_intensity: f64,
    /// Optional OpenWeatherMap key; without it sunlight data is simulated.
    pub openweather_api_key: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        dotenv::dotenv().ok();

        Ok(Config {
            database_url: env::var("DATABASE_URL")?,
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .expect("PORT must be a number"),
            jwt_secret: env::var("JWT_SECRET")?,
            jwt_expiration_hours: env::var("JWT_EXPIRATION_HOURS")
                .unwrap_or_else(|_| "24".to_string())
                .parse()
                .expect("JWT_EXPIRATION_HOURS must be a number"),
            allow_registration: env::var("ALLOW_REGISTRATION")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .expect("ALLOW_REGISTRATION must be true or false"),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            electricity_rate: env::var("ELECTRICITY_RATE_PKR")
                .unwrap_or_else(|_| "18".to_string())
                .parse()
                .expect("ELECTRICITY_RATE_PKR must be a number"),
            carbon_intensity: env::var("CARBON_INTENSITY_KG_PER_KWH")
                .unwrap_or_else(|_| "0.85".to_string())
                .parse()
                .expect("CARBON_INTENSITY_KG_PER_KWH must be a number"),
            openweather_api_key: env::var("OPENWEATHER_API_KEY").ok(),
        })
    }
}
