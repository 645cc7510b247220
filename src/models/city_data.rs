use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Per-city adoption aggregate shown on the community dashboard. Updated as
/// a side effect of energy recording; see the ledger service.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "city_data")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub city: String,
    pub province: String,
    /// Climatological average peak-sun hours per day.
    pub avg_sunlight_hours: f64,
    pub total_energy_kwh: f64,
    pub total_co2_kg: f64,
    pub participants: i64,
    /// Share of estimated households with solar, percent.
    pub adoption_rate: f64,
    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
