//! API server setup and configuration.

use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
};

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{ConversionConfig, DocdownError, Result};

use super::{
    handlers::{health_handler, parse_file_handler},
    types::{ApiSizeLimits, ApiState, DEFAULT_MAX_UPLOAD_MB},
};

/// Read the upload limit from `DOCDOWN_MAX_UPLOAD_SIZE_MB`, falling back to the default.
pub fn size_limits_from_env() -> ApiSizeLimits {
    if let Ok(value) = std::env::var("DOCDOWN_MAX_UPLOAD_SIZE_MB") {
        match value.parse::<usize>() {
            Ok(mb) if mb > 0 => {
                tracing::info!("Upload size limit configured from environment: {} MB", mb);
                return ApiSizeLimits::from_mb(mb);
            }
            _ => tracing::warn!(
                "Invalid DOCDOWN_MAX_UPLOAD_SIZE_MB='{}', must be a positive integer",
                value
            ),
        }
    }

    tracing::info!("Upload size limit: {} MB (default)", DEFAULT_MAX_UPLOAD_MB);
    ApiSizeLimits::default()
}

/// Create the API router with the default upload limit.
///
/// Public so the router can be nested inside another application.
///
/// ```no_run
/// use docdown::{ConversionConfig, api::create_router};
/// use axum::Router;
///
/// let app: Router = Router::new().nest("/docs", create_router(ConversionConfig::default()));
/// ```
pub fn create_router(config: ConversionConfig) -> Router {
    create_router_with_limits(config, ApiSizeLimits::default())
}

/// Create the API router with an explicit upload limit.
pub fn create_router_with_limits(config: ConversionConfig, limits: ApiSizeLimits) -> Router {
    let state = ApiState {
        config: Arc::new(config),
    };

    Router::new()
        .route("/v1/parse-file", post(parse_file_handler))
        .route("/health", get(health_handler))
        .layer(DefaultBodyLimit::max(limits.max_request_body_bytes))
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the API server, discovering `docdown.toml`/`.yaml`/`.json` from the working directory.
pub async fn serve(host: impl AsRef<str>, port: u16) -> Result<()> {
    let config = match ConversionConfig::discover()? {
        Some(config) => {
            tracing::info!("Loaded conversion config from discovered file");
            config
        }
        None => {
            tracing::info!("No config file found, using default configuration");
            ConversionConfig::default()
        }
    };

    serve_with_config(host, port, config).await
}

/// Start the API server with an explicit config.
///
/// ```no_run
/// use docdown::{ConversionConfig, api::serve_with_config};
///
/// #[tokio::main]
/// async fn main() -> docdown::Result<()> {
///     let config = ConversionConfig::from_toml_file("docdown.toml")?;
///     serve_with_config("0.0.0.0", 8000, config).await
/// }
/// ```
pub async fn serve_with_config(host: impl AsRef<str>, port: u16, config: ConversionConfig) -> Result<()> {
    config.validate()?;

    let ip: IpAddr = host
        .as_ref()
        .parse()
        .map_err(|e| DocdownError::validation(format!("Invalid host address: {}", e)))?;

    let addr = SocketAddr::new(ip, port);
    let app = create_router_with_limits(config, size_limits_from_env());

    tracing::info!("Starting docdown API server on http://{}:{}", ip, port);

    let listener = tokio::net::TcpListener::bind(addr).await.map_err(DocdownError::Io)?;

    axum::serve(listener, app)
        .await
        .map_err(|e| DocdownError::Other(e.to_string()))?;

    Ok(())
}
