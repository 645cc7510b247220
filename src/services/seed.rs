use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, Set};
use uuid::Uuid;

use crate::models::{challenge, city_data};
use crate::services::recommendation::CITY_SUNLIGHT;

/// Starter challenges: title, description, coins, tokens, achievement.
const STARTER_CHALLENGES: &[(&str, &str, i64, f64, Option<&str>)] = &[
    (
        "First Calculation",
        "Run the solar calculator for your home",
        25,
        0.0,
        Some("Solar Curious"),
    ),
    (
        "Power Logger",
        "Record 100 kWh of solar production",
        100,
        10.0,
        Some("Power Logger"),
    ),
    (
        "Week of Sun",
        "Keep a 7-day check-in streak",
        150,
        0.0,
        None,
    ),
    (
        "Community Voice",
        "Submit your first community report",
        50,
        0.0,
        Some("Community Voice"),
    ),
    (
        "Carbon Cutter",
        "Avoid 500 kg of CO2 with your system",
        300,
        25.0,
        Some("Carbon Cutter"),
    ),
];

/// Populate reference tables on first boot. Idempotent: tables that already
/// have rows are left alone.
pub async fn seed_reference_data(db: &DatabaseConnection) -> Result<(), DbErr> {
    seed_cities(db).await?;
    seed_challenges(db).await?;
    Ok(())
}

async fn seed_cities(db: &DatabaseConnection) -> Result<(), DbErr> {
    if city_data::Entity::find().count(db).await? > 0 {
        return Ok(());
    }

    let now = Utc::now();
    for (city, province, sunlight) in CITY_SUNLIGHT {
        let row = city_data::ActiveModel {
            id: Set(Uuid::new_v4()),
            city: Set(city.to_string()),
            province: Set(province.to_string()),
            avg_sunlight_hours: Set(*sunlight),
            total_energy_kwh: Set(0.0),
            total_co2_kg: Set(0.0),
            participants: Set(0),
            adoption_rate: Set(0.0),
            created_at: Set(now),
            updated_at: Set(now),
        };
        row.insert(db).await?;
    }

    log::info!("Seeded {} cities", CITY_SUNLIGHT.len());
    Ok(())
}

async fn seed_challenges(db: &DatabaseConnection) -> Result<(), DbErr> {
    if challenge::Entity::find().count(db).await? > 0 {
        return Ok(());
    }

    let now = Utc::now();
    for (title, description, coins, tokens, badge) in STARTER_CHALLENGES {
        let row = challenge::ActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(title.to_string()),
            description: Set(description.to_string()),
            reward_coins: Set(*coins),
            reward_tokens: Set(*tokens),
            reward_achievement: Set(badge.map(str::to_string)),
            is_active: Set(true),
            created_at: Set(now),
        };
        row.insert(db).await?;
    }

    log::info!("Seeded {} starter challenges", STARTER_CHALLENGES.len());
    Ok(())
}
