//! Pantry API server binary.
//!
//! Connects to PostgreSQL, applies migrations, seeds default tags and the
//! optional bootstrap admin, then serves the REST API until Ctrl-C.

use clap::Parser;
use pantry_core::auth::token::MAX_TOKEN_TTL_SECS;
use pantry_core::models::recipe::UnknownTags;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Log filter used when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "info,pantry_api=debug,pantry_core=debug";

/// CLI arguments for the API server.
#[derive(Parser, Debug)]
#[command(name = "pantry_server", about = "Pantry recipe API server")]
struct Args {
    /// Address to listen on.
    #[arg(long, env = "BIND_ADDR", default_value = "127.0.0.1:8080")]
    bind: String,

    /// PostgreSQL connection URL.
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "postgres://localhost:5432/pantry"
    )]
    database_url: String,

    /// Maximum number of database connections in the pool.
    #[arg(long, default_value_t = 5)]
    max_connections: u32,

    /// Create the database named in the URL when it does not exist.
    #[arg(long, default_value_t = false)]
    create_database: bool,

    /// Access token lifetime in seconds.
    #[arg(long, env = "TOKEN_TTL_SECS", default_value_t = pantry_core::auth::token::DEFAULT_TOKEN_TTL_SECS)]
    token_ttl_secs: i64,

    /// Comma-separated CORS origins; empty allows any origin.
    #[arg(long, env = "ALLOWED_ORIGINS", default_value = "")]
    allowed_origins: String,

    /// What to do with unknown tag names on recipe writes (drop or create).
    #[arg(long, env = "UNKNOWN_TAGS", default_value = "drop")]
    unknown_tags: UnknownTags,

    /// Username of the bootstrap admin account.
    #[arg(long, env = "ADMIN_USERNAME")]
    admin_username: Option<String>,

    /// Password of the bootstrap admin account.
    #[arg(long, env = "ADMIN_PASSWORD", hide_env_values = true)]
    admin_password: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let args = Args::parse();

    if !(1..=MAX_TOKEN_TTL_SECS).contains(&args.token_ttl_secs) {
        return Err(
            format!("token lifetime must be between 1 and {MAX_TOKEN_TTL_SECS} seconds").into(),
        );
    }

    info!(bind = %args.bind, "starting pantry_server");

    if args.create_database {
        pantry_core::db::create_database_if_missing(&args.database_url).await?;
    }

    info!(max_connections = args.max_connections, "configuring connection pool");
    let pool = pantry_core::db::connect(&args.database_url, args.max_connections).await?;

    info!("running database migrations");
    pantry_api::migrate(&pool).await?;
    pantry_core::tags::seed_default_tags(&pool).await?;

    let config = pantry_api::config::ApiConfig {
        bind_addr: args.bind,
        pg_connection_url: args.database_url,
        jwt_secret: pantry_core::auth::token::resolve_token_secret(),
        token_ttl_secs: args.token_ttl_secs,
        allowed_origins: pantry_api::config::parse_origins(&args.allowed_origins),
        unknown_tags: args.unknown_tags,
    };

    let state = pantry_api::AppState::new(pool, config.clone());

    match (args.admin_username, args.admin_password) {
        (Some(username), Some(password)) => {
            pantry_core::seed::ensure_admin(state.accounts.as_ref(), &username, &password).await?;
        }
        (Some(_), None) | (None, Some(_)) => {
            warn!("ADMIN_USERNAME and ADMIN_PASSWORD must both be set; skipping admin bootstrap");
        }
        (None, None) => {}
    }

    let app = pantry_api::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(addr = %listener.local_addr()?, "REST API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
