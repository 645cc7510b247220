use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::services::recommendation::sunlight_for_city;
use crate::utils::config::Config;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SunlightSource {
    OpenWeatherMap,
    Simulated,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SunlightData {
    pub city: String,
    pub sunlight_hours: f64,
    pub source: SunlightSource,
}

#[async_trait]
pub trait SunlightProvider: Send + Sync {
    async fn sunlight_hours(&self, city: &str, date: NaiveDate) -> anyhow::Result<SunlightData>;
}

// ── OpenWeatherMap ───────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct OwmResponse {
    clouds: OwmClouds,
    sys: OwmSys,
}

#[derive(Debug, Deserialize)]
struct OwmClouds {
    all: f64, // percent
}

#[derive(Debug, Deserialize)]
struct OwmSys {
    sunrise: i64, // unix seconds
    sunset: i64,
}

pub struct OpenWeatherMapProvider {
    client: reqwest::Client,
    api_key: String,
}

impl OpenWeatherMapProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
        }
    }
}

#[async_trait]
impl SunlightProvider for OpenWeatherMapProvider {
    async fn sunlight_hours(&self, city: &str, _date: NaiveDate) -> anyhow::Result<SunlightData> {
        let url = "https://api.openweathermap.org/data/2.5/weather";
        let response = self
            .client
            .get(url)
            .query(&[("q", format!("{},PK", city.trim())), ("appid", self.api_key.clone())])
            .send()
            .await?
            .error_for_status()?
            .json::<OwmResponse>()
            .await?;

        let daylight_hours = (response.sys.sunset - response.sys.sunrise).max(0) as f64 / 3600.0;
        let cloud_fraction = (response.clouds.all / 100.0).clamp(0.0, 1.0);

        // Daylight hours scaled down to effective peak-sun hours: roughly
        // 75% of daylight counts at full clear sky, clouds knock off up to
        // 60% of that.
        let sunlight = (daylight_hours * 0.75 * (1.0 - 0.6 * cloud_fraction)).clamp(0.0, 14.0);

        Ok(SunlightData {
            city: city.trim().to_string(),
            sunlight_hours: (sunlight * 100.0).round() / 100.0,
            source: SunlightSource::OpenWeatherMap,
        })
    }
}

// ── Simulated fallback ───────────────────────────────────────

pub struct SimulatedSunlightProvider;

/// Deterministic sunlight model: city baseline, a seasonal sinusoid peaking
/// near the summer solstice, and a per-day hash jitter so consecutive days
/// differ without any RNG state. Same (city, date) always gives the same
/// answer.
pub fn simulate_sunlight(city: &str, date: NaiveDate) -> f64 {
    let baseline = sunlight_for_city(city);

    let doy = date.ordinal() as f64;
    let seasonal = 0.12 * (2.0 * std::f64::consts::PI * (doy - 172.0) / 365.0).cos();

    let mut seed: i64 = doy as i64 * 1013;
    for b in city.trim().to_ascii_lowercase().bytes() {
        seed = seed.wrapping_mul(31).wrapping_add(b as i64);
    }
    let jitter = (seed.rem_euclid(1000) as f64 / 1000.0 - 0.5) * 0.10; // ±5%

    (baseline * (1.0 + seasonal + jitter)).clamp(0.0, 14.0)
}

#[async_trait]
impl SunlightProvider for SimulatedSunlightProvider {
    async fn sunlight_hours(&self, city: &str, date: NaiveDate) -> anyhow::Result<SunlightData> {
        let sunlight = simulate_sunlight(city, date);
        Ok(SunlightData {
            city: city.trim().to_string(),
            sunlight_hours: (sunlight * 100.0).round() / 100.0,
            source: SunlightSource::Simulated,
        })
    }
}

// ── Service with fallback ────────────────────────────────────

/// Live provider when an API key is configured, simulated otherwise. An
/// upstream failure degrades to the simulation instead of failing the
/// request; the fallback is the retry strategy.
pub struct WeatherService {
    primary: Option<OpenWeatherMapProvider>,
    fallback: SimulatedSunlightProvider,
}

impl WeatherService {
    pub fn from_config(config: &Config) -> Self {
        Self {
            primary: config
                .openweather_api_key
                .clone()
                .map(OpenWeatherMapProvider::new),
            fallback: SimulatedSunlightProvider,
        }
    }

    pub async fn sunlight_hours(&self, city: &str, date: NaiveDate) -> SunlightData {
        if let Some(primary) = &self.primary {
            match primary.sunlight_hours(city, date).await {
                Ok(data) => return data,
                Err(e) => {
                    log::warn!(
                        "OpenWeatherMap lookup failed for '{}', falling back to simulated data: {}",
                        city,
                        e
                    );
                }
            }
        }

        self.fallback
            .sunlight_hours(city, date)
            .await
            .expect("simulated sunlight provider is infallible")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_simulation_is_deterministic() {
        let a = simulate_sunlight("Lahore", date(2025, 6, 21));
        let b = simulate_sunlight("Lahore", date(2025, 6, 21));
        assert_eq!(a, b);
    }

    #[test]
    fn test_simulation_stays_in_range() {
        for city in ["Karachi", "Quetta", "Nowhere"] {
            for day in 1..=365u32 {
                let d = NaiveDate::from_yo_opt(2025, day).unwrap();
                let hours = simulate_sunlight(city, d);
                assert!((0.0..=14.0).contains(&hours), "{} on {}: {}", city, d, hours);
            }
        }
    }

    #[test]
    fn test_summer_beats_winter() {
        let summer = simulate_sunlight("Lahore", date(2025, 6, 21));
        let winter = simulate_sunlight("Lahore", date(2025, 12, 21));
        assert!(summer > winter);
    }

    #[test]
    fn test_cities_differ_on_the_same_day() {
        let d = date(2025, 3, 1);
        assert_ne!(
            simulate_sunlight("Lahore", d),
            simulate_sunlight("Quetta", d)
        );
    }
}
