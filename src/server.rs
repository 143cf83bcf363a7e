//! HTTP endpoint.
//!
//! Routes:
//! - `GET /metrics?module=<m>`               scrape the local BMC
//! - `GET /ipmi?target=<host>&module=<m>`    scrape a remote BMC
//! - `POST /-/reload`                        re-read the config file
//! - `GET /`                                 landing page

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::collector::Scraper;
use crate::config::DEFAULT_MODULE;
use crate::metrics::{MetricSet, CONTENT_TYPE};

#[derive(Clone)]
pub struct AppState {
    pub scraper: Scraper,
    pub config_path: Option<Arc<PathBuf>>,
}

#[derive(Debug, Default, Deserialize)]
struct ScrapeParams {
    target: Option<String>,
    module: Option<String>,
}

impl ScrapeParams {
    fn module(&self) -> &str {
        self.module
            .as_deref()
            .filter(|m| !m.is_empty())
            .unwrap_or(DEFAULT_MODULE)
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(landing_page))
        .route("/metrics", get(local_metrics))
        .route("/ipmi", get(remote_metrics))
        .route("/-/reload", post(reload_config))
        .with_state(state)
}

/// Bind `addr` and serve until Ctrl+C.
pub async fn serve(addr: SocketAddr, state: AppState) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await
        .context("HTTP server failed")
}

/// Reload the configuration whenever the process receives SIGHUP.
#[cfg(unix)]
pub fn spawn_reload_on_sighup(state: AppState) -> Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let Some(path) = state.config_path.clone() else {
        return Ok(());
    };
    let mut hangup = signal(SignalKind::hangup()).context("Failed to install SIGHUP handler")?;

    tokio::spawn(async move {
        while hangup.recv().await.is_some() {
            match state.scraper.config().reload(&path) {
                Ok(()) => info!("Configuration reloaded after SIGHUP"),
                Err(e) => error!("Error reloading config: {}", e),
            }
        }
    });
    Ok(())
}

fn exposition(metrics: MetricSet) -> Response {
    ([(header::CONTENT_TYPE, CONTENT_TYPE)], metrics.render()).into_response()
}

// GET /metrics
async fn local_metrics(State(app): State<AppState>, Query(params): Query<ScrapeParams>) -> Response {
    exposition(app.scraper.scrape("", params.module()).await)
}

// GET /ipmi?target=...
async fn remote_metrics(State(app): State<AppState>, Query(params): Query<ScrapeParams>) -> Response {
    let Some(target) = params.target.as_deref().filter(|t| !t.is_empty()) else {
        return (StatusCode::BAD_REQUEST, "'target' parameter must be specified\n").into_response();
    };
    exposition(app.scraper.scrape(target, params.module()).await)
}

// POST /-/reload
async fn reload_config(State(app): State<AppState>) -> Response {
    let Some(path) = app.config_path.as_deref() else {
        return (StatusCode::BAD_REQUEST, "no config file was given at startup\n").into_response();
    };
    match app.scraper.config().reload(path) {
        Ok(()) => {
            info!("Configuration reloaded from {:?}", path);
            (StatusCode::OK, "ok\n").into_response()
        }
        Err(e) => {
            error!("Error reloading config: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, format!("failed to reload config: {}\n", e)).into_response()
        }
    }
}

// GET /
async fn landing_page(State(app): State<AppState>) -> Html<String> {
    let modules = app.scraper.config().module_names().join(", ");
    Html(format!(
        "<html>\n<head><title>Pankha IPMI Exporter</title></head>\n<body>\n\
         <h1>Pankha IPMI Exporter v{}</h1>\n\
         <p><a href=\"/metrics\">Local metrics</a></p>\n\
         <p>Remote metrics: <code>/ipmi?target=&lt;host&gt;&amp;module=&lt;module&gt;</code></p>\n\
         <p>Configured modules: {}</p>\n\
         </body>\n</html>\n",
        env!("CARGO_PKG_VERSION"),
        if modules.is_empty() { "(none)".to_string() } else { modules },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    use crate::config::SafeConfig;
    use crate::metrics::Descriptors;
    use crate::system::executor::{CommandRunner, ExecError, IpmiCommand, IpmiTarget};

    struct StaticRunner;

    #[async_trait]
    impl CommandRunner for StaticRunner {
        async fn run(&self, target: &IpmiTarget, command: IpmiCommand) -> Result<String, ExecError> {
            Ok(match command {
                IpmiCommand::Sensor => format!("{} Temp | 40.000 | degrees C | ok\n", target.display_name()),
                IpmiCommand::Power => "Chassis Power is on\n".to_string(),
                _ => String::new(),
            })
        }
    }

    fn app(config_path: Option<PathBuf>) -> Router {
        let scraper = Scraper::new(
            Arc::new(StaticRunner),
            Arc::new(SafeConfig::default()),
            Arc::new(Descriptors::new()),
        );
        build_router(AppState {
            scraper,
            config_path: config_path.map(Arc::new),
        })
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn local_scrape() {
        let response = app(None)
            .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], CONTENT_TYPE);
        let body = body_text(response).await;
        assert!(body.contains("ipmi_temperature_celsius{name=\"[local]Temp\"} 40\n"));
        assert!(body.contains("ipmi_power_state{name=\"PowerState\"} 1\n"));
    }

    #[tokio::test]
    async fn remote_scrape_uses_target() {
        let response = app(None)
            .oneshot(Request::get("/ipmi?target=bmc1&module=example").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("{name=\"bmc1Temp\"} 40\n"));
    }

    #[tokio::test]
    async fn remote_scrape_requires_target() {
        let response = app(None)
            .oneshot(Request::get("/ipmi").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn reload_reports_failures() {
        let response = app(Some(PathBuf::from("/nonexistent/ipmi.yml")))
            .oneshot(Request::post("/-/reload").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = app(None)
            .oneshot(Request::post("/-/reload").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
