use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use attrition_api::config::{self, AppConfig};
use attrition_api::http::{AppState, HttpServer};
use attrition_api::lifecycle::Shutdown;
use attrition_api::model::{AttritionModel, RealModel, StubModel};
use attrition_api::observability::metrics;
use attrition_api::predict::PredictionService;
use attrition_api::store::{AuditLogger, Db};

#[derive(Parser)]
#[command(name = "attrition-api")]
#[command(about = "Employee attrition prediction API", long_about = None)]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the bind address from config.
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "attrition_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "attrition-api starting");

    let args = Args::parse();
    let mut config: AppConfig = config::load_config(args.config.as_deref())?;
    if let Some(bind) = args.bind {
        config.server.bind_address = bind;
    }

    tracing::info!(
        bind_address = %config.server.bind_address,
        environment = %config.environment,
        read_only = config.stores.read_only,
        stub_model = config.model.use_stub,
        "Configuration loaded"
    );

    // Metrics exporter (optional)
    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(error) => tracing::error!(
                %error,
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    // Feature store is mandatory; without it there is nothing to serve.
    let features = Db::connect(&config.stores.feature_db_url).await?;
    tracing::info!(backend = features.kind(), "Feature store connected");

    // Audit store degrades to a disabled logger on failure.
    let audit = AuditLogger::connect(&config.stores.audit_db_url, config.stores.read_only).await;

    let model: Arc<dyn AttritionModel> = if config.model.use_stub {
        tracing::warn!("Stub model active, predictions are placeholders");
        Arc::new(StubModel)
    } else {
        let model = RealModel::load(std::path::Path::new(&config.model.artifact_path))?;
        tracing::info!(model_version = model.version(), "Model artifact loaded");
        Arc::new(model)
    };

    let service = Arc::new(PredictionService::new(
        features.clone(),
        audit.clone(),
        model,
        config.stores.user_id.clone(),
    ));
    let state = AppState {
        service,
        features,
        audit,
        environment: config.environment.clone(),
    };

    let listener = TcpListener::bind(&config.server.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    HttpServer::new(&config, state)
        .run(listener, shutdown.subscribe())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
