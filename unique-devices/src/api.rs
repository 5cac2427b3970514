use crate::errors::{DevicesError, UniqueDevicesError};
use crate::handler::{UniqueDevices, render};
use crate::metrics_defs::{REQUEST_DURATION, RESPONSES};
use crate::problem::Problem;
use crate::types::RouteParams;
use axum::{
    Router,
    extract::{Path, Request, State, rejection::PathRejection},
    http::{HeaderName, HeaderValue, Method, StatusCode, Uri, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Serialize;
use std::time::Instant;
use tokio::net::TcpListener;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

#[derive(Serialize)]
struct BuildInfo {
    version: &'static str,
    build_date: &'static str,
    build_host: &'static str,
    rust_version: &'static str,
}

const BUILD_INFO: BuildInfo = BuildInfo {
    version: env!("CARGO_PKG_VERSION"),
    build_date: match option_env!("BUILD_DATE") {
        Some(value) => value,
        None => "unknown",
    },
    build_host: match option_env!("BUILD_HOST") {
        Some(value) => value,
        None => "unknown",
    },
    rust_version: match option_env!("RUSTC_VERSION") {
        Some(value) => value,
        None => "unknown",
    },
};

/// Builds the public router. The data route lives under `prefix`, which is
/// either empty or starts with a slash.
pub fn router(prefix: &str, unique_devices: UniqueDevices) -> Router {
    let data_route = format!("{prefix}/{{project}}/{{access_site}}/{{granularity}}/{{start}}/{{end}}");

    Router::new()
        .route(&data_route, get(devices_handler).fallback(method_not_allowed))
        .route("/healthz", get(healthz).fallback(method_not_allowed))
        .fallback(not_found)
        .with_state(unique_devices)
        .layer(middleware::from_fn(record_metrics))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-xss-protection"),
            HeaderValue::from_static("1; mode-block"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("deny"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        ))
        .layer(TraceLayer::new_for_http())
}

pub async fn serve(host: &str, port: u16, app: Router) -> Result<(), UniqueDevicesError> {
    let listener = TcpListener::bind(format!("{host}:{port}")).await?;
    tracing::info!(address = %listener.local_addr()?, "serving unique devices");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn devices_handler(
    State(unique_devices): State<UniqueDevices>,
    method: Method,
    uri: Uri,
    params: Result<Path<RouteParams>, PathRejection>,
) -> Response {
    let result = match params {
        Ok(Path(params)) => unique_devices
            .handle(params)
            .await
            .and_then(|response| render(&response)),
        Err(rejection) => Err(DevicesError::InvalidPath(rejection.body_text())),
    };

    match result {
        Ok(body) => (StatusCode::OK, body).into_response(),
        Err(err) => failure(err, &method, &uri),
    }
}

async fn healthz(method: Method, uri: Uri) -> Response {
    match render(&BUILD_INFO) {
        Ok(body) => (StatusCode::OK, body).into_response(),
        Err(err) => failure(err, &method, &uri),
    }
}

async fn not_found(method: Method, uri: Uri) -> Response {
    failure(DevicesError::RouteNotFound, &method, &uri)
}

async fn method_not_allowed(method: Method, uri: Uri) -> Response {
    failure(DevicesError::MethodNotAllowed, &method, &uri)
}

fn failure(err: DevicesError, method: &Method, uri: &Uri) -> Response {
    let problem = Problem::from_error(&err, method, uri);
    if err.status().is_server_error() {
        tracing::error!(%method, uri = %problem.uri, status = problem.status, "request failed: {err}");
    }
    problem.into_response()
}

async fn record_metrics(request: Request, next: Next) -> Response {
    let started = Instant::now();
    let response = next.run(request).await;

    let status = response.status().as_u16().to_string();
    shared::counter!(RESPONSES, "status" => status.clone()).increment(1);
    shared::histogram!(REQUEST_DURATION, "status" => status).record(started.elapsed().as_secs_f64());

    response
}
