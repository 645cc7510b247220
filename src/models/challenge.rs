use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "challenges")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub reward_coins: i64,
    pub reward_tokens: f64,
    /// Achievement name granted on completion, if any.
    pub reward_achievement: Option<String>,
    pub is_active: bool,
    pub created_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::user_challenge::Entity")]
    UserChallenges,
}

impl Related<super::user_challenge::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserChallenges.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
