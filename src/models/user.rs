use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub username: String,
    #[sea_orm(unique)]
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub city: Option<String>,
    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::user_stats::Entity")]
    UserStats,
    #[sea_orm(has_many = "super::solar_calculation::Entity")]
    SolarCalculations,
    #[sea_orm(has_many = "super::energy_event::Entity")]
    EnergyEvents,
    #[sea_orm(has_many = "super::user_challenge::Entity")]
    UserChallenges,
    #[sea_orm(has_many = "super::report::Entity")]
    Reports,
    #[sea_orm(has_many = "super::achievement::Entity")]
    Achievements,
}

impl Related<super::user_stats::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserStats.def()
    }
}

impl Related<super::solar_calculation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SolarCalculations.def()
    }
}

impl Related<super::energy_event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EnergyEvents.def()
    }
}

impl Related<super::user_challenge::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserChallenges.def()
    }
}

impl Related<super::report::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reports.def()
    }
}

impl Related<super::achievement::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Achievements.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
