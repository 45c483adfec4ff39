use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use kindred::config::{LoggingSettings, Settings, StorageBackend};
use kindred::core::Matcher;
use kindred::routes::{self, handle_json_payload_error, handle_query_payload_error, AppState};
use kindred::services::{InMemoryStore, PostgresStore, UserStore};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Initialize logging; RUST_LOG takes precedence over the configured level
fn init_logging(logging: &LoggingSettings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    match logging.format.as_str() {
        "pretty" => subscriber.pretty().init(),
        "json" => subscriber.json().init(),
        _ => subscriber.compact().init(),
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = Settings::load().unwrap_or_else(|e| {
        eprintln!("Failed to load configuration: {}", e);
        panic!("Configuration error: {}", e);
    });

    init_logging(&settings.logging);

    info!("Starting Kindred matching service...");

    let store: Arc<dyn UserStore> = match settings.database.backend {
        StorageBackend::Postgres => {
            let db_max_conn = settings.database.max_connections.unwrap_or(10);
            let postgres = PostgresStore::from_settings(&settings.database)
                .await
                .unwrap_or_else(|e| {
                    error!("Failed to connect to PostgreSQL: {}", e);
                    panic!("PostgreSQL connection error: {}", e);
                });
            info!("PostgreSQL store initialized (max: {} connections)", db_max_conn);
            Arc::new(postgres)
        }
        StorageBackend::Memory => {
            info!("Using in-memory store; data will not survive a restart");
            Arc::new(InMemoryStore::new())
        }
    };

    let matcher = Matcher::new(settings.matching.default_limit, settings.matching.max_limit);
    let default_weights = settings.default_weights();

    info!(
        "Matcher initialized (default limit: {}, max limit: {}), default weights: {:?}",
        settings.matching.default_limit, settings.matching.max_limit, default_weights
    );

    let app_state = AppState {
        store,
        matcher,
        default_weights,
        default_max_distance_km: settings.matching.default_max_distance_km,
    };

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
