mod handlers;
mod middleware;
mod models;
mod services;
mod utils;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use utils::{config::Config, db};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file FIRST before anything else
    dotenv::dotenv().ok();

    // Initialize logger with default level if RUST_LOG not set
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("=================================================");
    println!("☀️  Rayvolution Backend Server");
    println!("=================================================");

    // Load configuration
    let config = Config::from_env().expect("Failed to load configuration");
    let host = config.host.clone();
    let port = config.port;

    println!("📝 Configuration loaded:");
    println!(
        "   - Database: {}",
        config.database_url.split('@').last().unwrap_or("***")
    );
    println!("   - Host: {}", host);
    println!("   - Port: {}", port);
    println!("   - Tariff: {} PKR/kWh", config.electricity_rate);
    println!(
        "   - Weather: {}",
        if config.openweather_api_key.is_some() {
            "OpenWeatherMap"
        } else {
            "simulated"
        }
    );
    println!(
        "   - Registration: {}",
        if config.allow_registration {
            "ENABLED"
        } else {
            "DISABLED"
        }
    );

    // Establish database connection
    print!("🔌 Connecting to database... ");
    let db = db::establish_connection(&config.database_url)
        .await
        .expect("Failed to connect to database");
    println!("✅ Connected!");

    log::info!("Database connection established");

    db::ensure_schema(&db).await.expect("Failed to create schema");
    services::seed::seed_reference_data(&db)
        .await
        .expect("Failed to seed reference data");

    // Start HTTP server
    println!("🌐 Starting HTTP server at http://{}:{}", host, port);
    println!("📍 Available endpoints:");
    println!("   - POST http://{}:{}/auth/register", host, port);
    println!("   - POST http://{}:{}/auth/login", host, port);
    println!(
        "   - POST http://{}:{}/api/calculate (JWT required)",
        host, port
    );
    println!(
        "   - POST http://{}:{}/api/energy (JWT required)",
        host, port
    );
    println!(
        "   - GET  http://{}:{}/api/challenges (JWT required)",
        host, port
    );
    println!("   - GET  http://{}:{}/api/cities", host, port);
    println!("   - GET  http://{}:{}/api/weather/sunlight", host, port);
    println!("=================================================");

    log::info!("Server started at http://{}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin("http://localhost:3000")
            .allowed_origin(&config.frontend_url)
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::AUTHORIZATION,
                actix_web::http::header::ACCEPT,
                actix_web::http::header::CONTENT_TYPE,
            ])
            .max_age(3600);

        App::new()
            .app_data(web::Data::new(db.clone()))
            .app_data(web::Data::new(config.clone()))
            .wrap(Logger::default())
            .wrap(cors)
            // Public endpoints (no authentication required)
            .service(
                web::scope("/auth")
                    .route("/register", web::post().to(handlers::auth::register))
                    .route("/login", web::post().to(handlers::auth::login)),
            )
            // Calculator endpoints (JWT required)
            .service(
                web::scope("/api/calculate")
                    .wrap(crate::middleware::auth::JwtMiddleware)
                    .route("", web::post().to(handlers::calculations::calculate))
                    .route("/history", web::get().to(handlers::calculations::history))
                    .route(
                        "/recommend",
                        web::post().to(handlers::calculations::recommend),
                    )
                    .route("/compare", web::post().to(handlers::calculations::compare)),
            )
            // Energy recording (JWT required)
            .service(
                web::scope("/api/energy")
                    .wrap(crate::middleware::auth::JwtMiddleware)
                    .route("", web::post().to(handlers::energy::record))
                    .route("", web::get().to(handlers::energy::list)),
            )
            // Per-user stats, streaks, achievements (JWT required, owner-only)
            .service(
                web::scope("/api/users")
                    .wrap(crate::middleware::auth::JwtMiddleware)
                    .route("/{id}/stats", web::get().to(handlers::users::get_stats))
                    .route("/{id}/stats", web::put().to(handlers::users::update_stats))
                    .route("/{id}/streak", web::post().to(handlers::users::check_streak))
                    .route(
                        "/{id}/achievements",
                        web::get().to(handlers::users::list_achievements),
                    )
                    .route(
                        "/{id}/achievements",
                        web::post().to(handlers::users::add_achievement),
                    ),
            )
            // Challenges (JWT required)
            .service(
                web::scope("/api/challenges")
                    .wrap(crate::middleware::auth::JwtMiddleware)
                    .route("", web::get().to(handlers::challenges::list))
                    .route(
                        "/{id}/complete",
                        web::post().to(handlers::challenges::complete),
                    ),
            )
            // Community reports (JWT required)
            .service(
                web::scope("/api/reports")
                    .wrap(crate::middleware::auth::JwtMiddleware)
                    .route("", web::post().to(handlers::reports::submit))
                    .route("", web::get().to(handlers::reports::list)),
            )
            // Public city adoption stats
            .service(
                web::scope("/api/cities")
                    .route("", web::get().to(handlers::cities::list))
                    .route("/{name}", web::get().to(handlers::cities::get)),
            )
            // Public sunlight data with simulated fallback
            .service(
                web::scope("/api/weather")
                    .route("/sunlight", web::get().to(handlers::weather::sunlight)),
            )
    })
    .bind((host, port))?
    .run()
    .await
}
