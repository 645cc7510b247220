use std::time::Duration;

use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, Schema};

use crate::models::{
    achievement, challenge, city_data, energy_event, report, solar_calculation, user,
    user_challenge, user_stats,
};

pub async fn establish_connection(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut opts = ConnectOptions::new(database_url.to_string());
    opts.max_connections(20)
        .min_connections(2)
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);

    Database::connect(opts).await
}

/// Create any missing tables from the entity definitions. Existing tables
/// are left untouched, so this is safe to run on every startup.
pub async fn ensure_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    let mut statements = vec![
        schema.create_table_from_entity(user::Entity),
        schema.create_table_from_entity(user_stats::Entity),
        schema.create_table_from_entity(solar_calculation::Entity),
        schema.create_table_from_entity(energy_event::Entity),
        schema.create_table_from_entity(challenge::Entity),
        schema.create_table_from_entity(user_challenge::Entity),
        schema.create_table_from_entity(report::Entity),
        schema.create_table_from_entity(city_data::Entity),
        schema.create_table_from_entity(achievement::Entity),
    ];

    for stmt in &mut statements {
        stmt.if_not_exists();
        db.execute(backend.build(&*stmt)).await?;
    }

    Ok(())
}
