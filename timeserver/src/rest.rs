use crate::clock::{iso_now, unix_now};
use crate::config::ServerConfig;
use crate::errors::Result;
use crate::metrics::{gather_metrics, TIME_REQUESTS_TOTAL};
use crate::model::TimeResponse;
use crate::tls::SelfSignedCert;
use axum::{
    body::Bytes,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use tracing::{debug, error, info};

#[derive(Debug, Clone)]
struct AppState {
    offset_suffix: Arc<str>,
}

pub fn create_router(config: &ServerConfig) -> Router {
    let state = AppState {
        offset_suffix: Arc::from(config.offset_suffix.as_str()),
    };

    let router = Router::new()
        .route("/api/time/iso_8601", get(get_iso_time))
        .route("/api/time/timestamp", get(get_timestamp).post(get_timestamp))
        .route("/api/appdaemon/wm", get(appdaemon_time).post(appdaemon_time))
        .route("/metrics", get(metrics_handler))
        .with_state(state);

    if config.log_requests {
        router.layer(middleware::from_fn(log_request))
    } else {
        router
    }
}

/// Binds `config.bind_addr` and serves until the listener fails.
pub async fn run_http(config: ServerConfig) -> Result<()> {
    let app = create_router(&config);

    match &config.tls {
        Some(tls) => {
            let rustls = SelfSignedCert::generate(tls)?.rustls_config().await?;
            info!("HTTPS server listening on {}", config.bind_addr);
            axum_server::bind_rustls(config.bind_addr, rustls)
                .serve(app.into_make_service())
                .await?;
        }
        None => {
            let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
            info!("HTTP server listening on {}", config.bind_addr);
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}

async fn get_iso_time(State(state): State<AppState>) -> Json<TimeResponse<String>> {
    TIME_REQUESTS_TOTAL.inc();
    Json(TimeResponse {
        time: iso_now(&state.offset_suffix),
    })
}

async fn get_timestamp() -> Json<TimeResponse<i64>> {
    TIME_REQUESTS_TOTAL.inc();
    Json(TimeResponse { time: unix_now() })
}

/// Home Assistant AppDaemon flavour of the ISO endpoint. The station may
/// post a JSON body; it is logged when it parses and otherwise ignored.
async fn appdaemon_time(State(state): State<AppState>, body: Bytes) -> Json<TimeResponse<String>> {
    if !body.is_empty() {
        match serde_json::from_slice::<serde_json::Value>(&body) {
            Ok(payload) => debug!(%payload, "AppDaemon request body"),
            Err(e) => debug!("Ignoring non-JSON AppDaemon body: {}", e),
        }
    }

    get_iso_time(State(state)).await
}

async fn metrics_handler() -> std::result::Result<String, AppError> {
    gather_metrics().map_err(|e| AppError(anyhow::anyhow!("Metrics encoding failed: {}", e)))
}

async fn log_request(req: Request, next: Next) -> Response {
    debug!(
        method = %req.method(),
        uri = %req.uri(),
        version = ?req.version(),
        headers = ?req.headers(),
        "Incoming request"
    );
    next.run(req).await
}

struct AppError(anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!("API error: {}", self.0);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Internal server error: {}", self.0),
        )
            .into_response()
    }
}
