use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Per-user gamification aggregate. Created at signup, mutated for the
/// lifetime of the account through the ledger service only.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_stats")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub user_id: Uuid,
    /// Lifetime energy saved/produced, kWh.
    pub energy_saved: f64,
    /// Lifetime CO2 avoided, kg.
    pub co2_reduced: f64,
    pub green_coins: i64,
    /// kWh-denominated marketplace balance.
    pub energy_tokens: f64,
    pub streak: i32,
    /// Composite 0-100 eco-performance score.
    pub sustainability_score: i32,
    pub last_streak_update: ChronoDateTimeUtc,
    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
