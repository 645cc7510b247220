use serde::Serialize;
use thiserror::Error;

use super::solar_yield::{round2, DEFAULT_EFFICIENCY};

/// Typical residential panel wattage and footprint.
pub const PANEL_WATTS: f64 = 350.0;
pub const PANEL_AREA_M2: f64 = 2.0;

/// Installed system cost, PKR per kW (panels, inverter, mounting, labour).
pub const COST_PER_KW_PKR: f64 = 150_000.0;

pub const DEFAULT_SUNLIGHT_HOURS: f64 = 8.0;

/// Supported cities with province and climatological average peak-sun hours.
/// Also the seed source for the city_data table.
pub const CITY_SUNLIGHT: &[(&str, &str, f64)] = &[
    ("Karachi", "Sindh", 8.5),
    ("Lahore", "Punjab", 8.2),
    ("Islamabad", "Islamabad Capital Territory", 7.8),
    ("Rawalpindi", "Punjab", 7.8),
    ("Peshawar", "Khyber Pakhtunkhwa", 8.0),
    ("Quetta", "Balochistan", 9.0),
    ("Multan", "Punjab", 8.6),
    ("Faisalabad", "Punjab", 8.3),
    ("Hyderabad", "Sindh", 8.7),
    ("Sialkot", "Punjab", 7.9),
];

pub fn city_sunlight_hours(city: &str) -> Option<f64> {
    CITY_SUNLIGHT
        .iter()
        .find(|(name, _, _)| name.eq_ignore_ascii_case(city.trim()))
        .map(|(_, _, hours)| *hours)
}

/// Average sunlight for a city, falling back to the national default when
/// the city is not in the table.
pub fn sunlight_for_city(city: &str) -> f64 {
    city_sunlight_hours(city).unwrap_or(DEFAULT_SUNLIGHT_HOURS)
}

#[derive(Debug, Error, PartialEq)]
pub enum RecommendationError {
    #[error("monthlyBill must be a positive amount in PKR")]
    InvalidBill,
    #[error("roofArea must be a positive area in square meters")]
    InvalidRoofArea,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Suitability {
    Excellent,
    Limited,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub recommended_capacity_kw: f64,
    pub panel_count: u32,
    pub required_roof_area_m2: f64,
    pub estimated_cost_pkr: f64,
    pub monthly_consumption_kwh: f64,
    pub daily_consumption_kwh: f64,
    pub sunlight_hours: f64,
    pub estimated_monthly_saving_pkr: f64,
    pub payback_months: f64,
    pub payback_years: f64,
    pub suitability: Suitability,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Size a system that covers the given monthly bill. Closed-form inversion
/// of the yield formula; capacity is rounded up to the next 0.5 kW so the
/// suggestion always covers the bill.
pub fn recommend(
    monthly_bill: f64,
    city: &str,
    roof_area_m2: Option<f64>,
    electricity_rate: f64,
) -> Result<Recommendation, RecommendationError> {
    if !monthly_bill.is_finite() || monthly_bill <= 0.0 {
        return Err(RecommendationError::InvalidBill);
    }
    if let Some(area) = roof_area_m2 {
        if !area.is_finite() || area <= 0.0 {
            return Err(RecommendationError::InvalidRoofArea);
        }
    }

    let sunlight_hours = sunlight_for_city(city);

    let monthly_consumption = monthly_bill / electricity_rate;
    let daily_consumption = monthly_consumption / 30.0;

    let raw_capacity = daily_consumption / (sunlight_hours * DEFAULT_EFFICIENCY);
    let capacity_kw = (raw_capacity * 2.0).ceil() / 2.0;

    let panel_count = (capacity_kw * 1000.0 / PANEL_WATTS).ceil() as u32;
    let required_area = panel_count as f64 * PANEL_AREA_M2;

    let estimated_cost = capacity_kw * COST_PER_KW_PKR;
    let monthly_saving =
        capacity_kw * sunlight_hours * DEFAULT_EFFICIENCY * 30.0 * electricity_rate;
    let payback_months = estimated_cost / monthly_saving;
    let payback_years = (payback_months / 12.0 * 10.0).round() / 10.0;

    let (suitability, warning) = match roof_area_m2 {
        Some(area) if area < required_area => (
            Suitability::Limited,
            Some(format!(
                "Your roof area of {:.0} m2 is below the {:.0} m2 required for {} panels; consider a smaller system or higher-wattage panels",
                area, required_area, panel_count
            )),
        ),
        _ => (Suitability::Excellent, None),
    };

    Ok(Recommendation {
        recommended_capacity_kw: capacity_kw,
        panel_count,
        required_roof_area_m2: required_area,
        estimated_cost_pkr: estimated_cost,
        monthly_consumption_kwh: round2(monthly_consumption),
        daily_consumption_kwh: round2(daily_consumption),
        sunlight_hours,
        estimated_monthly_saving_pkr: monthly_saving.round(),
        payback_months: round2(payback_months),
        payback_years,
        suitability,
        warning,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::solar_yield::{self, SolarProfile, DEFAULT_CARBON_INTENSITY};

    const RATE: f64 = 18.0;

    #[test]
    fn test_capacity_rounded_up_to_half_kw() {
        let rec = recommend(15_000.0, "Lahore", None, RATE).unwrap();
        // 15000 PKR -> 833.33 kWh/month -> 27.78 kWh/day -> 4.23 kW raw
        assert_eq!(rec.recommended_capacity_kw, 4.5);
        assert_eq!(rec.panel_count, 13);
        assert_eq!(rec.required_roof_area_m2, 26.0);
    }

    #[test]
    fn test_recommendation_covers_the_bill() {
        // Feeding the suggested system back through the yield formula must
        // produce monthly savings at least the input bill, and not more
        // than one 0.5 kW sizing step above it.
        for bill in [3_000.0, 8_000.0, 15_000.0, 42_000.0] {
            for city in ["Karachi", "Lahore", "Quetta", "Nowhere"] {
                let rec = recommend(bill, city, None, RATE).unwrap();
                let est = solar_yield::calculate(
                    &SolarProfile {
                        panel_capacity_kw: rec.recommended_capacity_kw,
                        sunlight_hours: rec.sunlight_hours,
                        efficiency: 0.8,
                    },
                    RATE,
                    DEFAULT_CARBON_INTENSITY,
                )
                .unwrap();

                let step = 0.5 * rec.sunlight_hours * 0.8 * 30.0 * RATE;
                assert!(
                    est.cost_saving_per_month >= bill - 1.0,
                    "bill {} city {}: saving {} under bill",
                    bill,
                    city,
                    est.cost_saving_per_month
                );
                assert!(
                    est.cost_saving_per_month <= bill + step + 1.0,
                    "bill {} city {}: saving {} overshoots by more than one step",
                    bill,
                    city,
                    est.cost_saving_per_month
                );
            }
        }
    }

    #[test]
    fn test_unknown_city_uses_fallback_sunlight() {
        let rec = recommend(10_000.0, "Atlantis", None, RATE).unwrap();
        assert_eq!(rec.sunlight_hours, DEFAULT_SUNLIGHT_HOURS);
    }

    #[test]
    fn test_city_lookup_is_case_insensitive() {
        assert_eq!(city_sunlight_hours("lahore"), Some(8.2));
        assert_eq!(city_sunlight_hours(" KARACHI "), Some(8.5));
        assert_eq!(city_sunlight_hours("Gotham"), None);
    }

    #[test]
    fn test_limited_roof_flags_warning() {
        let rec = recommend(15_000.0, "Lahore", Some(10.0), RATE).unwrap();
        assert_eq!(rec.suitability, Suitability::Limited);
        assert!(rec.warning.is_some());

        let roomy = recommend(15_000.0, "Lahore", Some(60.0), RATE).unwrap();
        assert_eq!(roomy.suitability, Suitability::Excellent);
        assert!(roomy.warning.is_none());
    }

    #[test]
    fn test_invalid_inputs_rejected() {
        assert_eq!(
            recommend(0.0, "Lahore", None, RATE).unwrap_err(),
            RecommendationError::InvalidBill
        );
        assert_eq!(
            recommend(-500.0, "Lahore", None, RATE).unwrap_err(),
            RecommendationError::InvalidBill
        );
        assert_eq!(
            recommend(10_000.0, "Lahore", Some(-5.0), RATE).unwrap_err(),
            RecommendationError::InvalidRoofArea
        );
    }

    #[test]
    fn test_payback_is_cost_over_savings() {
        let rec = recommend(20_000.0, "Karachi", None, RATE).unwrap();
        let expected_months = rec.estimated_cost_pkr
            / (rec.recommended_capacity_kw * rec.sunlight_hours * 0.8 * 30.0 * RATE);
        assert!((rec.payback_months - round2(expected_months)).abs() < 0.01);
        assert!((rec.payback_years - (expected_months / 12.0 * 10.0).round() / 10.0).abs() < 1e-9);
    }
}
