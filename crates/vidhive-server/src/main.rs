use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::http::HeaderValue;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use vidhive_api::router::build_router;
use vidhive_api::state::AppStateInner;

/// Recognized environment configuration, collected once at startup.
struct Config {
    db_path: PathBuf,
    host: String,
    port: u16,
    cors_origin: Option<String>,
    access_secret: String,
    refresh_secret: String,
    media_root: PathBuf,
}

impl Config {
    fn from_env() -> anyhow::Result<Self> {
        let db_path = std::env::var("VIDHIVE_DB_PATH").unwrap_or_else(|_| "vidhive.db".into());
        let host = std::env::var("VIDHIVE_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port: u16 = std::env::var("VIDHIVE_PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()?;
        let cors_origin = std::env::var("VIDHIVE_CORS_ORIGIN").ok();
        let access_secret = std::env::var("VIDHIVE_ACCESS_TOKEN_SECRET")
            .unwrap_or_else(|_| "dev-access-secret-change-me".into());
        let refresh_secret = std::env::var("VIDHIVE_REFRESH_TOKEN_SECRET")
            .unwrap_or_else(|_| "dev-refresh-secret-change-me".into());
        let media_root = std::env::var("VIDHIVE_MEDIA_ROOT").unwrap_or_else(|_| "media".into());

        Ok(Self {
            db_path: PathBuf::from(db_path),
            host,
            port,
            cors_origin,
            access_secret,
            refresh_secret,
            media_root: PathBuf::from(media_root),
        })
    }
}

fn cors_layer(origin: Option<&str>) -> anyhow::Result<CorsLayer> {
    match origin {
        Some(origin) if origin != "*" => {
            let origin: HeaderValue = origin.parse()?;
            Ok(CorsLayer::new()
                .allow_origin(AllowOrigin::exact(origin))
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any))
        }
        _ => Ok(CorsLayer::permissive()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vidhive=debug,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env()?;

    // Init database; a connect failure here is fatal.
    let db = vidhive_db::Database::open(&config.db_path)?;

    let state = Arc::new(AppStateInner {
        db,
        access_secret: config.access_secret,
        refresh_secret: config.refresh_secret,
        media_root: config.media_root,
    });

    let app = build_router(state)
        .layer(cors_layer(config.cors_origin.as_deref())?)
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("vidhive server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
