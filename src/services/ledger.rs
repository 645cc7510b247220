use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, ExprTrait};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{achievement, challenge, city_data, user_challenge, user_stats};
use crate::services::recommendation;
use crate::services::streak::{self, StreakTransition};
use crate::services::sustainability::calculate_sustainability_score;
use crate::utils::errors::ApiError;

pub const WELCOME_BONUS_COINS: i64 = 100;
pub const CALCULATOR_REWARD_COINS: i64 = 10;
pub const REPORT_REWARD_COINS: i64 = 10;
pub const COINS_PER_KWH: f64 = 2.0;
/// Grid displacement factor credited per recorded kWh. Deliberately more
/// conservative than the calculator's grid carbon intensity.
pub const CO2_KG_PER_KWH_RECORDED: f64 = 0.5;

/// Participant count at which a city is considered fully engaged.
pub const ADOPTION_TARGET_PARTICIPANTS: f64 = 5_000.0;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("User stats not found")]
    StatsNotFound,
    #[error("Challenge not found")]
    ChallengeNotFound,
    #[error("Challenge is not active")]
    ChallengeInactive,
    #[error("Challenge already completed")]
    ChallengeAlreadyCompleted,
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::StatsNotFound | LedgerError::ChallengeNotFound => {
                ApiError::NotFound(err.to_string())
            }
            LedgerError::ChallengeInactive | LedgerError::ChallengeAlreadyCompleted => {
                ApiError::Validation(err.to_string())
            }
            LedgerError::Database(e) => ApiError::Database(e),
        }
    }
}

/// Every stat-mutating trigger in the platform, in one place. Each variant
/// maps deterministically onto a `StatDelta`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StatEvent {
    EnergyRecorded { kwh: f64 },
    CalculatorUsed,
    ReportSubmitted,
    ChallengeCompleted { coins: i64, tokens: f64 },
    StreakChecked { new_streak: i32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StatDelta {
    pub energy_saved: f64,
    pub co2_reduced: f64,
    pub green_coins: i64,
    pub energy_tokens: f64,
}

pub fn delta_for(event: &StatEvent) -> StatDelta {
    match *event {
        StatEvent::EnergyRecorded { kwh } => StatDelta {
            energy_saved: kwh,
            co2_reduced: kwh * CO2_KG_PER_KWH_RECORDED,
            green_coins: (kwh * COINS_PER_KWH).floor() as i64,
            energy_tokens: kwh,
        },
        StatEvent::CalculatorUsed => StatDelta {
            green_coins: CALCULATOR_REWARD_COINS,
            ..StatDelta::default()
        },
        StatEvent::ReportSubmitted => StatDelta {
            green_coins: REPORT_REWARD_COINS,
            ..StatDelta::default()
        },
        StatEvent::ChallengeCompleted { coins, tokens } => StatDelta {
            green_coins: coins,
            energy_tokens: tokens,
            ..StatDelta::default()
        },
        StatEvent::StreakChecked { new_streak } => StatDelta {
            green_coins: streak::milestone_bonus(new_streak),
            ..StatDelta::default()
        },
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakOutcome {
    pub transition: String,
    pub streak: i32,
    pub milestone_coins: i64,
    pub stats: user_stats::Model,
}

/// Owns every mutation of `user_stats` and the city aggregates. Handlers
/// never write those tables directly.
pub struct LedgerService {
    db: DatabaseConnection,
}

impl LedgerService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create the stats row at signup, seeded with the welcome bonus.
    pub async fn init_stats(&self, user_id: Uuid) -> Result<user_stats::Model, LedgerError> {
        let now = Utc::now();
        let mut stats = user_stats::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            energy_saved: Set(0.0),
            co2_reduced: Set(0.0),
            green_coins: Set(WELCOME_BONUS_COINS),
            energy_tokens: Set(0.0),
            streak: Set(0),
            sustainability_score: Set(0),
            last_streak_update: Set(now),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let score = calculate_sustainability_score(
            &crate::services::sustainability::ScoreInput {
                energy_saved_kwh: 0.0,
                co2_reduced_kg: 0.0,
                green_coins: WELCOME_BONUS_COINS,
                streak_days: 0,
            },
        );
        stats.sustainability_score = Set(score);

        Ok(stats.insert(&self.db).await?)
    }

    pub async fn apply(
        &self,
        user_id: Uuid,
        event: StatEvent,
    ) -> Result<user_stats::Model, LedgerError> {
        self.apply_delta(user_id, delta_for(&event)).await
    }

    /// Apply a delta through a single additive UPDATE statement. Concurrent
    /// requests for the same user cannot lose each other's increments.
    pub async fn apply_delta(
        &self,
        user_id: Uuid,
        delta: StatDelta,
    ) -> Result<user_stats::Model, LedgerError> {
        let result = user_stats::Entity::update_many()
            .col_expr(
                user_stats::Column::EnergySaved,
                Expr::col(user_stats::Column::EnergySaved).add(delta.energy_saved),
            )
            .col_expr(
                user_stats::Column::Co2Reduced,
                Expr::col(user_stats::Column::Co2Reduced).add(delta.co2_reduced),
            )
            .col_expr(
                user_stats::Column::GreenCoins,
                Expr::col(user_stats::Column::GreenCoins).add(delta.green_coins),
            )
            .col_expr(
                user_stats::Column::EnergyTokens,
                Expr::col(user_stats::Column::EnergyTokens).add(delta.energy_tokens),
            )
            .col_expr(user_stats::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(user_stats::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(LedgerError::StatsNotFound);
        }

        self.refresh_score(user_id).await
    }

    /// Recompute the sustainability score from a fresh snapshot. The score
    /// read-back races with concurrent deltas, but the function is
    /// deterministic over whichever snapshot it sees and the next mutation
    /// recomputes again.
    async fn refresh_score(&self, user_id: Uuid) -> Result<user_stats::Model, LedgerError> {
        let stats = user_stats::Entity::find()
            .filter(user_stats::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?
            .ok_or(LedgerError::StatsNotFound)?;

        let score = calculate_sustainability_score(&(&stats).into());
        if score == stats.sustainability_score {
            return Ok(stats);
        }

        let mut active: user_stats::ActiveModel = stats.into();
        active.sustainability_score = Set(score);
        Ok(active.update(&self.db).await?)
    }

    /// Lazily evaluate the streak. Called from login and the explicit
    /// check-in endpoint only; quiescent users keep their stored value.
    pub async fn check_streak(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<StreakOutcome, LedgerError> {
        let stats = user_stats::Entity::find()
            .filter(user_stats::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?
            .ok_or(LedgerError::StatsNotFound)?;

        let transition = streak::evaluate(stats.last_streak_update, now);
        if transition == StreakTransition::NoOp {
            return Ok(StreakOutcome {
                transition: "no-op".to_string(),
                streak: stats.streak,
                milestone_coins: 0,
                stats,
            });
        }

        let new_streak = streak::apply(stats.streak, transition);

        // Read-modify-write: the streak needs the previous timestamp, so it
        // cannot be a blind column expression. Only the owning user's
        // login/check-in reaches this path.
        let mut active: user_stats::ActiveModel = stats.into();
        active.streak = Set(new_streak);
        active.last_streak_update = Set(now);
        active.updated_at = Set(now);
        active.update(&self.db).await?;

        let milestone_coins = match transition {
            StreakTransition::Continue => streak::milestone_bonus(new_streak),
            _ => 0,
        };

        let stats = self
            .apply(user_id, StatEvent::StreakChecked { new_streak })
            .await?;

        let label = match transition {
            StreakTransition::Continue => "continue",
            StreakTransition::Reset => "reset",
            StreakTransition::NoOp => unreachable!(),
        };

        Ok(StreakOutcome {
            transition: label.to_string(),
            streak: new_streak,
            milestone_coins,
            stats,
        })
    }

    /// Grant a challenge's configured reward exactly once per user. The
    /// completed flag on the join record is the idempotency guard.
    pub async fn complete_challenge(
        &self,
        user_id: Uuid,
        challenge_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<user_stats::Model, LedgerError> {
        let challenge = challenge::Entity::find_by_id(challenge_id)
            .one(&self.db)
            .await?
            .ok_or(LedgerError::ChallengeNotFound)?;

        if !challenge.is_active {
            return Err(LedgerError::ChallengeInactive);
        }

        let existing = user_challenge::Entity::find()
            .filter(user_challenge::Column::UserId.eq(user_id))
            .filter(user_challenge::Column::ChallengeId.eq(challenge_id))
            .one(&self.db)
            .await?;

        match existing {
            Some(record) if record.completed => {
                return Err(LedgerError::ChallengeAlreadyCompleted);
            }
            Some(record) => {
                let mut active: user_challenge::ActiveModel = record.into();
                active.completed = Set(true);
                active.completed_at = Set(Some(now));
                active.update(&self.db).await?;
            }
            None => {
                let record = user_challenge::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    user_id: Set(user_id),
                    challenge_id: Set(challenge_id),
                    completed: Set(true),
                    completed_at: Set(Some(now)),
                    created_at: Set(now),
                };
                record.insert(&self.db).await?;
            }
        }

        if let Some(name) = &challenge.reward_achievement {
            let badge = achievement::ActiveModel {
                id: Set(Uuid::new_v4()),
                user_id: Set(user_id),
                name: Set(name.clone()),
                description: Set(Some(format!("Completed challenge: {}", challenge.title))),
                earned_at: Set(now),
            };
            if let Err(e) = badge.insert(&self.db).await {
                // Reward coins still land; the badge is cosmetic.
                log::error!("Failed to store achievement '{}': {}", name, e);
            }
        }

        self.apply(
            user_id,
            StatEvent::ChallengeCompleted {
                coins: challenge.reward_coins,
                tokens: challenge.reward_tokens,
            },
        )
        .await
    }

    /// Fold a recorded energy event into the city aggregate. This write is
    /// independent of the user-stats update in the same request; a failure
    /// between the two leaves partial credit (no transaction, by contract
    /// with the rest of the rewards system).
    pub async fn record_city_energy(
        &self,
        city: &str,
        kwh: f64,
        new_participant: bool,
    ) -> Result<(), LedgerError> {
        let city = city.trim();
        let participant_increment: i64 = if new_participant { 1 } else { 0 };

        let result = city_data::Entity::update_many()
            .col_expr(
                city_data::Column::TotalEnergyKwh,
                Expr::col(city_data::Column::TotalEnergyKwh).add(kwh),
            )
            .col_expr(
                city_data::Column::TotalCo2Kg,
                Expr::col(city_data::Column::TotalCo2Kg).add(kwh * CO2_KG_PER_KWH_RECORDED),
            )
            .col_expr(
                city_data::Column::Participants,
                Expr::col(city_data::Column::Participants).add(participant_increment),
            )
            .col_expr(city_data::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(city_data::Column::City.eq(city))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            let now = Utc::now();
            let row = city_data::ActiveModel {
                id: Set(Uuid::new_v4()),
                city: Set(city.to_string()),
                province: Set(province_for(city).to_string()),
                avg_sunlight_hours: Set(recommendation::sunlight_for_city(city)),
                total_energy_kwh: Set(kwh),
                total_co2_kg: Set(kwh * CO2_KG_PER_KWH_RECORDED),
                participants: Set(participant_increment.max(1)),
                adoption_rate: Set(0.0),
                created_at: Set(now),
                updated_at: Set(now),
            };
            row.insert(&self.db).await?;
        }

        self.refresh_adoption_rate(city).await
    }

    async fn refresh_adoption_rate(&self, city: &str) -> Result<(), LedgerError> {
        let row = city_data::Entity::find()
            .filter(city_data::Column::City.eq(city))
            .one(&self.db)
            .await?;

        if let Some(row) = row {
            let rate = adoption_rate_for(row.participants);
            if (rate - row.adoption_rate).abs() > f64::EPSILON {
                let mut active: city_data::ActiveModel = row.into();
                active.adoption_rate = Set(rate);
                active.update(&self.db).await?;
            }
        }

        Ok(())
    }
}

fn province_for(city: &str) -> &'static str {
    recommendation::CITY_SUNLIGHT
        .iter()
        .find(|(name, _, _)| name.eq_ignore_ascii_case(city))
        .map(|(_, province, _)| *province)
        .unwrap_or("Unknown")
}

/// Share of the engagement target a city has reached, percent.
pub fn adoption_rate_for(participants: i64) -> f64 {
    let rate = participants.max(0) as f64 / ADOPTION_TARGET_PARTICIPANTS * 100.0;
    (rate.min(100.0) * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_energy_recorded_delta() {
        let delta = delta_for(&StatEvent::EnergyRecorded { kwh: 7.9 });
        assert_eq!(delta.energy_saved, 7.9);
        assert!((delta.co2_reduced - 3.95).abs() < 1e-9);
        assert_eq!(delta.energy_tokens, 7.9);
        // coins floor, never round up
        assert_eq!(delta.green_coins, 15);
    }

    #[test]
    fn test_flat_reward_deltas() {
        assert_eq!(delta_for(&StatEvent::CalculatorUsed).green_coins, 10);
        assert_eq!(delta_for(&StatEvent::ReportSubmitted).green_coins, 10);

        let calc = delta_for(&StatEvent::CalculatorUsed);
        assert_eq!(calc.energy_saved, 0.0);
        assert_eq!(calc.energy_tokens, 0.0);
    }

    #[test]
    fn test_challenge_delta_uses_configured_reward() {
        let delta = delta_for(&StatEvent::ChallengeCompleted {
            coins: 250,
            tokens: 12.5,
        });
        assert_eq!(delta.green_coins, 250);
        assert_eq!(delta.energy_tokens, 12.5);
        assert_eq!(delta.co2_reduced, 0.0);
    }

    #[test]
    fn test_streak_checked_delta_pays_milestones_only() {
        assert_eq!(
            delta_for(&StatEvent::StreakChecked { new_streak: 6 }).green_coins,
            0
        );
        assert_eq!(
            delta_for(&StatEvent::StreakChecked { new_streak: 7 }).green_coins,
            100
        );
        assert_eq!(
            delta_for(&StatEvent::StreakChecked { new_streak: 30 }).green_coins,
            500
        );
    }

    #[test]
    fn test_adoption_rate() {
        assert_eq!(adoption_rate_for(0), 0.0);
        assert_eq!(adoption_rate_for(250), 5.0);
        assert_eq!(adoption_rate_for(5_000), 100.0);
        // saturates rather than exceeding 100%
        assert_eq!(adoption_rate_for(12_000), 100.0);
        assert_eq!(adoption_rate_for(-3), 0.0);
    }

    #[test]
    fn test_province_lookup() {
        assert_eq!(province_for("Lahore"), "Punjab");
        assert_eq!(province_for("karachi"), "Sindh");
        assert_eq!(province_for("Gotham"), "Unknown");
    }
}
