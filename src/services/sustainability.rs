use crate::models::user_stats;

/// Score weights. Each component saturates at its ceiling before weighting,
/// so the total is always within [0, 100].
pub const WEIGHT_ENERGY: f64 = 0.35;
pub const WEIGHT_CO2: f64 = 0.30;
pub const WEIGHT_ENGAGEMENT: f64 = 0.20;
pub const WEIGHT_CONSISTENCY: f64 = 0.15;

/// Saturation ceilings: lifetime kWh, lifetime kg CO2, coin balance, streak days.
pub const ENERGY_CEILING_KWH: f64 = 5_000.0;
pub const CO2_CEILING_KG: f64 = 2_500.0;
pub const ENGAGEMENT_CEILING_COINS: f64 = 2_000.0;
pub const CONSISTENCY_CEILING_DAYS: f64 = 30.0;

/// The slice of a stats row the score depends on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreInput {
    pub energy_saved_kwh: f64,
    pub co2_reduced_kg: f64,
    pub green_coins: i64,
    pub streak_days: i32,
}

impl From<&user_stats::Model> for ScoreInput {
    fn from(stats: &user_stats::Model) -> Self {
        Self {
            energy_saved_kwh: stats.energy_saved,
            co2_reduced_kg: stats.co2_reduced,
            green_coins: stats.green_coins,
            streak_days: stats.streak,
        }
    }
}

fn component(value: f64, ceiling: f64) -> f64 {
    (value / ceiling * 100.0).clamp(0.0, 100.0)
}

/// Deterministic 0-100 composite of a stats snapshot. Recomputing on an
/// unchanged snapshot always returns the same value.
pub fn calculate_sustainability_score(input: &ScoreInput) -> i32 {
    let energy = component(input.energy_saved_kwh, ENERGY_CEILING_KWH);
    let co2 = component(input.co2_reduced_kg, CO2_CEILING_KG);
    let engagement = component(input.green_coins as f64, ENGAGEMENT_CEILING_COINS);
    let consistency = component(input.streak_days as f64, CONSISTENCY_CEILING_DAYS);

    let score = WEIGHT_ENERGY * energy
        + WEIGHT_CO2 * co2
        + WEIGHT_ENGAGEMENT * engagement
        + WEIGHT_CONSISTENCY * consistency;

    score.round().clamp(0.0, 100.0) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(energy: f64, co2: f64, coins: i64, streak: i32) -> ScoreInput {
        ScoreInput {
            energy_saved_kwh: energy,
            co2_reduced_kg: co2,
            green_coins: coins,
            streak_days: streak,
        }
    }

    #[test]
    fn test_new_account_scores_zero() {
        assert_eq!(calculate_sustainability_score(&input(0.0, 0.0, 0, 0)), 0);
    }

    #[test]
    fn test_saturated_account_scores_one_hundred() {
        assert_eq!(
            calculate_sustainability_score(&input(5_000.0, 2_500.0, 2_000, 30)),
            100
        );
        // Beyond the ceilings does not overflow the scale
        assert_eq!(
            calculate_sustainability_score(&input(1e9, 1e9, i64::MAX / 2, 10_000)),
            100
        );
    }

    #[test]
    fn test_recomputation_is_idempotent() {
        let snapshot = input(1_234.5, 617.25, 480, 12);
        let first = calculate_sustainability_score(&snapshot);
        let second = calculate_sustainability_score(&snapshot);
        assert_eq!(first, second);
    }

    #[test]
    fn test_mid_range_value() {
        // half of every ceiling -> half of every weight -> 50
        assert_eq!(
            calculate_sustainability_score(&input(2_500.0, 1_250.0, 1_000, 15)),
            50
        );
    }

    #[test]
    fn test_welcome_bonus_alone_barely_moves_the_score() {
        // 100 coins is 5% engagement at weight 0.20 -> rounds to 1
        assert_eq!(calculate_sustainability_score(&input(0.0, 0.0, 100, 0)), 1);
    }

    #[test]
    fn test_negative_values_do_not_underflow() {
        assert_eq!(calculate_sustainability_score(&input(-50.0, -10.0, -5, -3)), 0);
    }

    #[test]
    fn test_score_is_monotonic_in_energy() {
        let low = calculate_sustainability_score(&input(100.0, 0.0, 0, 0));
        let high = calculate_sustainability_score(&input(2_000.0, 0.0, 0, 0));
        assert!(high > low);
    }
}
