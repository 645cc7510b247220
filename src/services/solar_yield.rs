use serde::Serialize;
use thiserror::Error;

pub const DEFAULT_EFFICIENCY: f64 = 0.8;
pub const DEFAULT_ELECTRICITY_RATE: f64 = 18.0;
pub const DEFAULT_CARBON_INTENSITY: f64 = 0.85;

/// One mature tree absorbs roughly 21 kg of CO2 per year.
pub const TREE_CO2_KG_PER_YEAR: f64 = 21.0;

pub const MIN_CAPACITY_KW: f64 = 0.1;
pub const MAX_CAPACITY_KW: f64 = 1000.0;
pub const MIN_SUNLIGHT_HOURS: f64 = 0.0;
pub const MAX_SUNLIGHT_HOURS: f64 = 14.0;
pub const MIN_EFFICIENCY: f64 = 0.1;
pub const MAX_EFFICIENCY: f64 = 1.0;

/// Out-of-range inputs are rejected, never clamped. The field name is kept
/// so handlers can surface it in the 400 body.
#[derive(Debug, Error, PartialEq)]
#[error("{field} {message}")]
pub struct YieldValidationError {
    pub field: &'static str,
    pub message: String,
}

impl YieldValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Calculator input as submitted by the user. Immutable once calculated;
/// each submission produces a new history row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolarProfile {
    pub panel_capacity_kw: f64,
    pub sunlight_hours: f64,
    pub efficiency: f64,
}

impl SolarProfile {
    pub fn validate(&self) -> Result<(), YieldValidationError> {
        if !self.panel_capacity_kw.is_finite()
            || self.panel_capacity_kw < MIN_CAPACITY_KW
            || self.panel_capacity_kw > MAX_CAPACITY_KW
        {
            return Err(YieldValidationError::new(
                "panelCapacity",
                format!(
                    "must be between {} and {} kW",
                    MIN_CAPACITY_KW, MAX_CAPACITY_KW
                ),
            ));
        }

        if !self.sunlight_hours.is_finite()
            || self.sunlight_hours < MIN_SUNLIGHT_HOURS
            || self.sunlight_hours > MAX_SUNLIGHT_HOURS
        {
            return Err(YieldValidationError::new(
                "sunlightHours",
                format!(
                    "must be between {} and {} hours",
                    MIN_SUNLIGHT_HOURS, MAX_SUNLIGHT_HOURS
                ),
            ));
        }

        if !self.efficiency.is_finite()
            || self.efficiency < MIN_EFFICIENCY
            || self.efficiency > MAX_EFFICIENCY
        {
            return Err(YieldValidationError::new(
                "efficiency",
                format!("must be between {} and {}", MIN_EFFICIENCY, MAX_EFFICIENCY),
            ));
        }

        Ok(())
    }
}

/// Derived yield figures. Energy in kWh (2 dp), savings in whole PKR, CO2 in
/// kg (daily at 2 dp, monthly/yearly whole). All fields are linear in
/// `energy_per_day`; nothing here is calendar-aware (fixed 30/365 factors).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YieldEstimate {
    pub energy_per_day: f64,
    pub energy_per_month: f64,
    pub energy_per_year: f64,
    pub cost_saving_per_day: f64,
    pub cost_saving_per_month: f64,
    pub cost_saving_per_year: f64,
    pub co2_reduced_per_day: f64,
    pub co2_reduced_per_month: f64,
    pub co2_reduced_per_year: f64,
    pub trees_equivalent: i32,
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Compute the yield estimate for a validated profile. Pure: no side
/// effects, callers persist the result if they want history.
pub fn calculate(
    profile: &SolarProfile,
    electricity_rate: f64,
    carbon_intensity: f64,
) -> Result<YieldEstimate, YieldValidationError> {
    profile.validate()?;

    let energy_per_day = profile.panel_capacity_kw * profile.sunlight_hours * profile.efficiency;
    let energy_per_month = energy_per_day * 30.0;
    let energy_per_year = energy_per_day * 365.0;

    let co2_per_year = energy_per_year * carbon_intensity;

    Ok(YieldEstimate {
        energy_per_day: round2(energy_per_day),
        energy_per_month: round2(energy_per_month),
        energy_per_year: round2(energy_per_year),
        cost_saving_per_day: (energy_per_day * electricity_rate).round(),
        cost_saving_per_month: (energy_per_month * electricity_rate).round(),
        cost_saving_per_year: (energy_per_year * electricity_rate).round(),
        co2_reduced_per_day: round2(energy_per_day * carbon_intensity),
        co2_reduced_per_month: (energy_per_month * carbon_intensity).round(),
        co2_reduced_per_year: co2_per_year.round(),
        trees_equivalent: (co2_per_year / TREE_CO2_KG_PER_YEAR).round() as i32,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(capacity: f64, sunlight: f64, efficiency: f64) -> SolarProfile {
        SolarProfile {
            panel_capacity_kw: capacity,
            sunlight_hours: sunlight,
            efficiency,
        }
    }

    #[test]
    fn test_lahore_reference_system() {
        // 5 kW at 8.2 peak-sun hours and 0.8 derating
        let estimate = calculate(
            &profile(5.0, 8.2, 0.8),
            DEFAULT_ELECTRICITY_RATE,
            DEFAULT_CARBON_INTENSITY,
        )
        .unwrap();

        assert!((estimate.energy_per_day - 32.8).abs() < 1e-9);
        assert_eq!(estimate.cost_saving_per_day, 590.0);
        assert!((estimate.co2_reduced_per_day - 27.88).abs() < 1e-9);
    }

    #[test]
    fn test_linearity_of_periods() {
        for &(c, s, e) in &[
            (0.1, 0.0, 0.1),
            (1.0, 5.5, 0.75),
            (5.0, 8.2, 0.8),
            (25.0, 9.0, 1.0),
            (1000.0, 14.0, 0.1),
        ] {
            let est = calculate(
                &profile(c, s, e),
                DEFAULT_ELECTRICITY_RATE,
                DEFAULT_CARBON_INTENSITY,
            )
            .unwrap();
            let day = c * s * e;
            assert!((est.energy_per_month - round2(day * 30.0)).abs() < 0.01);
            assert!((est.energy_per_year - round2(day * 365.0)).abs() < 0.01);
        }
    }

    #[test]
    fn test_boundary_rejection_not_clamping() {
        let cases = [
            profile(0.05, 8.0, 0.8),
            profile(1001.0, 8.0, 0.8),
            profile(5.0, -1.0, 0.8),
            profile(5.0, 15.0, 0.8),
            profile(5.0, 8.0, 0.0),
            profile(5.0, 8.0, 1.1),
        ];
        for p in cases {
            assert!(
                calculate(&p, DEFAULT_ELECTRICITY_RATE, DEFAULT_CARBON_INTENSITY).is_err(),
                "expected rejection for {:?}",
                p
            );
        }
    }

    #[test]
    fn test_boundary_values_accepted() {
        assert!(calculate(&profile(0.1, 0.0, 0.1), 18.0, 0.85).is_ok());
        assert!(calculate(&profile(1000.0, 14.0, 1.0), 18.0, 0.85).is_ok());
    }

    #[test]
    fn test_nan_rejected() {
        assert!(calculate(&profile(f64::NAN, 8.0, 0.8), 18.0, 0.85).is_err());
        assert!(calculate(&profile(5.0, f64::INFINITY, 0.8), 18.0, 0.85).is_err());
    }

    #[test]
    fn test_validation_error_names_field() {
        let err = calculate(&profile(1001.0, 8.0, 0.8), 18.0, 0.85).unwrap_err();
        assert_eq!(err.field, "panelCapacity");
    }

    #[test]
    fn test_trees_equivalent() {
        // Pick a profile that lands exactly on 1000 kg CO2/year:
        // energy/year = 1000 / 0.85, energy/day = that / 365
        let energy_per_day = 1000.0 / DEFAULT_CARBON_INTENSITY / 365.0;
        let capacity = energy_per_day / (8.0 * 0.8);
        let est = calculate(
            &profile(capacity, 8.0, 0.8),
            DEFAULT_ELECTRICITY_RATE,
            DEFAULT_CARBON_INTENSITY,
        )
        .unwrap();
        assert_eq!(est.co2_reduced_per_year, 1000.0);
        assert_eq!(est.trees_equivalent, 48);
    }

    #[test]
    fn test_zero_sunlight_yields_zero() {
        let est = calculate(&profile(5.0, 0.0, 0.8), 18.0, 0.85).unwrap();
        assert_eq!(est.energy_per_day, 0.0);
        assert_eq!(est.cost_saving_per_year, 0.0);
        assert_eq!(est.trees_equivalent, 0);
    }
}
