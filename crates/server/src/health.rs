use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use palmsure_mailer::Mailer;
use serde::Serialize;
use tracing::{error, info};

#[derive(Clone)]
pub struct HealthState {
    mailer: Arc<Mailer>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub templates: HealthCheck,
    pub transport_mode: &'static str,
    pub checked_at: String,
}

pub fn router(mailer: Arc<Mailer>) -> Router {
    Router::new().route("/health", get(health)).with_state(HealthState { mailer })
}

pub async fn spawn(bind_address: &str, port: u16, mailer: Arc<Mailer>) -> std::io::Result<()> {
    let address = format!("{bind_address}:{port}");
    let listener = tokio::net::TcpListener::bind(&address).await?;

    info!(
        event_name = "system.health.start",
        correlation_id = "bootstrap",
        bind_address = %address,
        "health endpoint started"
    );

    tokio::spawn(async move {
        if let Err(failure) = axum::serve(listener, router(mailer)).await {
            error!(
                event_name = "system.health.error",
                correlation_id = "bootstrap",
                error = %failure,
                "health endpoint server terminated unexpectedly"
            );
        }
    });

    Ok(())
}

pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let templates = template_check(&state.mailer);
    let ready = templates.status == "ready";

    let payload = HealthResponse {
        status: if ready { "ready" } else { "degraded" },
        service: HealthCheck {
            status: "ready",
            detail: "palmsure-server runtime initialized".to_string(),
        },
        templates,
        transport_mode: state.mailer.transport_mode(),
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}

fn template_check(mailer: &Mailer) -> HealthCheck {
    match mailer.probe() {
        Ok(()) => {
            HealthCheck { status: "ready", detail: "email template probe rendered".to_string() }
        }
        Err(failure) => HealthCheck {
            status: "degraded",
            detail: format!("email template probe failed: {failure}"),
        },
    }
}
