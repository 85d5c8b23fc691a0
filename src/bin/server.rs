use std::{error::Error, net::SocketAddr, path::PathBuf};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware,
};
use axum_server::Handle;
use clap::Parser;
use rusqlite::Connection;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use spendon::{
    AppState, PaginationConfig, build_router, config::Settings, graceful_shutdown,
    logging_middleware,
};

/// The REST API server for spendon.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: Option<String>,

    /// The port to serve the API from.
    #[arg(short, long)]
    port: Option<u16>,

    /// File path to a JSON settings file. Defaults to `settings.json` if it exists,
    /// otherwise settings are read from the environment.
    #[arg(long)]
    settings: Option<PathBuf>,
}

const DEFAULT_PORT: u16 = 3000;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    setup_logging();

    let args = Args::parse();
    let settings = Settings::load(args.settings.as_deref())?;

    let Some(db_path) = args.db_path.or(settings.database_path) else {
        return Err("a database path must be given with --db-path or DATABASE_PATH".into());
    };
    let port = args.port.or(settings.port).unwrap_or(DEFAULT_PORT);

    let signing_secret = settings.signing_secret.filter(|secret| !secret.is_empty());
    if signing_secret.is_none() {
        tracing::error!(
            "No signing secret configured, log-in and all authenticated routes will be unavailable"
        );
    }

    let conn = Connection::open(&db_path)?;
    let state = AppState::new(conn, signing_secret.as_deref(), PaginationConfig::default())?;

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = add_tracing_layer(
        build_router(state).layer(middleware::from_fn(logging_middleware)),
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("HTTP server listening on {}", addr);
    axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await?;

    Ok(())
}

fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().pretty())
        .init();
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // Errors are logged where they are converted into responses.
        .on_failure(());

    router.layer(tracing_layer)
}
