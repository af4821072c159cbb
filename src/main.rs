use std::net::SocketAddr;

use tokio::net::TcpListener;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use baswap_api::common::AppState;
use baswap_api::config::Config;
use baswap_api::routes;
use baswap_api::table::{self, ColumnHints, ObservationTable};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,baswap_api=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting baswap-api...");

    // Load configuration (fail-fast)
    let config = Config::from_env()?;
    tracing::info!(
        deployment = ?config.deployment,
        host = %config.api_host,
        port = config.api_port,
        "Configuration loaded"
    );

    // Load dataset (fail-fast on the primary file)
    let dataset = load_dataset(&config)?;
    tracing::info!(
        rows = dataset.len(),
        stations = dataset.stations().len(),
        "Dataset ready"
    );

    let state = AppState::new(dataset, config.clone());
    let app = routes::build_router(state);

    // Start server with graceful shutdown
    let addr = config.bind_address();
    tracing::info!(address = %addr, "Starting server");
    let listener = TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server shut down gracefully");
    Ok(())
}

/// Load the buoy dataset and, if configured, merge the partner stations
/// file with its EC column mapped onto the buoy one. A broken partner file
/// is logged and skipped.
fn load_dataset(config: &Config) -> Result<ObservationTable, table::LoadError> {
    let mut dataset = table::load_csv(&config.data_path, &config.default_station)?;

    if let Some(path) = &config.stations_data_path {
        let ec_column = ColumnHints::default().value_column(dataset.columns());
        match table::load_stations_csv(path, ec_column.as_deref()) {
            Ok(stations) => dataset.merge(stations),
            Err(e) => tracing::warn!(path = %path, error = %e, "Skipping stations file"),
        }
    }

    Ok(dataset)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down...");
        },
        () = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        },
    }
}
