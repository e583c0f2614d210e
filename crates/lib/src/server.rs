//! HTTP server: receives form posts on /submit and answers with outcome redirects.

use crate::config::{self, Config};
use crate::event::{InboundEvent, Outcome, Redirect};
use crate::form;
use crate::mailer::{Mailer, SmtpMailer};
use crate::submit;
use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

/// Shared state for the server (resolved settings and the mailer).
/// Settings are resolved once at startup and never mutated afterwards.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<config::FormSettings>,
    pub mailer: Arc<dyn Mailer>,
    /// Port the server binds to; reported by the health endpoint.
    pub port: u16,
}

/// Run the relay server; binds to config.server.bind:config.server.port.
/// Fails at startup when required form or SMTP settings are missing.
/// Blocks until shutdown (e.g. Ctrl+C).
pub async fn run_server(config: Config) -> Result<()> {
    let settings = config::resolve_form_settings(&config)?;
    let smtp = config::resolve_smtp_settings(&config)?;
    log::info!("smtp relay: {}", smtp.url);
    let mailer = SmtpMailer::new(&smtp)?;
    let state = AppState {
        settings: Arc::new(settings),
        mailer: Arc::new(mailer),
        port: config.server.port,
    };
    serve(state, &config.server.bind).await
}

/// Bind and serve until shutdown. Split from [`run_server`] so tests can
/// inject their own mailer.
pub async fn serve(state: AppState, bind: &str) -> Result<()> {
    let bind_addr = format!("{}:{}", bind, state.port);
    let app = Router::new()
        .route("/", get(health_http))
        .route("/submit", any(submit_http))
        .with_state(state);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding to {}", bind_addr))?;
    log::info!("formgate listening on {}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server exited")?;
    log::info!("formgate stopped");
    Ok(())
}

/// Future that completes when the process should shut down (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    log::info!("shutdown signal received, draining connections");
}

/// GET / returns a simple health JSON (for probes).
async fn health_http(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "runtime": "running",
        "port": state.port,
    }))
}

/// Any-method /submit — the submission endpoint. The method and content-type
/// checks live in the validator, so malformed transport is logged and
/// answered 500 here, never redirected.
async fn submit_http(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let headers: HashMap<String, String> = headers
        .iter()
        .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_string(), v.to_string())))
        .collect();
    let event = InboundEvent {
        method: method.as_str().to_string(),
        headers,
        body: String::from_utf8_lossy(&body).into_owned(),
    };

    let fields = match form::validate(&event) {
        Ok(fields) => fields,
        Err(e) => {
            log::error!("rejecting submission: {}", e);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    match submit::handle_submission(&state.settings, state.mailer.as_ref(), &fields).await {
        Outcome::Drop => StatusCode::NO_CONTENT.into_response(),
        Outcome::Redirect(redirect) => redirect_response(&redirect),
    }
}

/// 303 See Other with the outcome Location. The fragment is the only outcome
/// information the submitter receives.
fn redirect_response(redirect: &Redirect) -> Response {
    (
        StatusCode::SEE_OTHER,
        [(header::LOCATION, redirect.location.clone())],
    )
        .into_response()
}
