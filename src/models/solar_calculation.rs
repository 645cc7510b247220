use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum SystemType {
    #[sea_orm(string_value = "grid-tied")]
    GridTied,
    #[sea_orm(string_value = "off-grid")]
    OffGrid,
    #[sea_orm(string_value = "hybrid")]
    Hybrid,
}

/// One calculator submission: the immutable input profile plus the derived
/// yield snapshot. Rows are append-only; a new calculation never edits a
/// past one.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "solar_calculations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub city: String,
    pub system_type: SystemType,
    pub panel_capacity_kw: f64,
    pub sunlight_hours: f64,
    pub efficiency: f64,
    pub electricity_rate: f64,
    pub carbon_intensity: f64,
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
    pub created_at: ChronoDateTimeUtc,
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
