//! The notification endpoint.
//!
//! - `POST /api/send-email` - convert a form submission into an outbound
//!   email and return the provider receipt
//! - `OPTIONS /api/send-email` - answered `200` with no body before any
//!   method checking
//! - any other method - `405` with a fixed JSON message
//!
//! CORS mirrors the request origin with credentials allowed, matching the
//! permissive posture of the public website.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::post,
    Router,
};
use palmsure_core::errors::ApplicationError;
use palmsure_core::Submission;
use palmsure_mailer::Mailer;
use serde::Serialize;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use uuid::Uuid;

#[derive(Clone)]
pub struct AppState {
    mailer: Arc<Mailer>,
}

#[derive(Debug, Serialize)]
struct SendEmailError {
    error: String,
}

#[derive(Debug, Serialize)]
struct MethodError {
    message: &'static str,
}

pub fn router(mailer: Arc<Mailer>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::OPTIONS,
            Method::PATCH,
            Method::DELETE,
            Method::POST,
            Method::PUT,
        ])
        .allow_headers([
            HeaderName::from_static("x-csrf-token"),
            HeaderName::from_static("x-requested-with"),
            header::ACCEPT,
            HeaderName::from_static("accept-version"),
            header::CONTENT_LENGTH,
            HeaderName::from_static("content-md5"),
            header::CONTENT_TYPE,
            header::DATE,
            HeaderName::from_static("x-api-version"),
        ]);

    Router::new()
        .route(
            "/api/send-email",
            post(send_email).options(preflight).fallback(method_not_allowed),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { mailer })
}

async fn preflight() -> StatusCode {
    StatusCode::OK
}

async fn method_not_allowed() -> (StatusCode, Json<MethodError>) {
    (StatusCode::METHOD_NOT_ALLOWED, Json(MethodError { message: "Method not allowed" }))
}

async fn send_email(
    State(state): State<AppState>,
    Json(submission): Json<Submission>,
) -> Response {
    let correlation_id = Uuid::new_v4().to_string();
    info!(
        event_name = "system.send_email.received",
        correlation_id = %correlation_id,
        kind = submission.kind(),
        "form submission received"
    );

    match state.mailer.send_submission(&submission, &correlation_id).await {
        Ok(receipt) => (StatusCode::OK, Json(receipt)).into_response(),
        Err(failure) => {
            let detail = failure.to_string();
            let interface =
                ApplicationError::Delivery(detail.clone()).into_interface(correlation_id.clone());
            error!(
                event_name = "system.send_email.delivery_failed",
                correlation_id = %correlation_id,
                error = %detail,
                user_message = interface.user_message(),
                "submission email was not delivered"
            );
            (StatusCode::INTERNAL_SERVER_ERROR, Json(SendEmailError { error: detail }))
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use palmsure_core::config::AppConfig;
    use palmsure_mailer::{Mailer, RecordingMailTransport, TransportError};
    use serde_json::{json, Value};
    use tower::util::ServiceExt;

    use super::router;

    fn app_with_transport(
        transport: Arc<RecordingMailTransport>,
    ) -> axum::Router {
        let mailer = Arc::new(Mailer::with_transport(&AppConfig::default().email, transport));
        router(mailer)
    }

    fn contact_body() -> String {
        json!({
            "type": "contact",
            "data": {
                "fullName": "Jane Doe",
                "email": "jane@x.com",
                "contactNumber": "0821234567",
                "message": "Hello"
            }
        })
        .to_string()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body reads");
        serde_json::from_slice(&bytes).expect("body is JSON")
    }

    #[tokio::test]
    async fn get_is_rejected_with_405_and_no_delivery() {
        let transport = Arc::new(RecordingMailTransport::default());
        let app = app_with_transport(transport.clone());

        let response = app
            .oneshot(Request::builder().uri("/api/send-email").body(Body::empty()).expect("request"))
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Method not allowed");
        assert!(transport.sent().await.is_empty());
    }

    #[tokio::test]
    async fn options_is_answered_with_a_bare_200() {
        let transport = Arc::new(RecordingMailTransport::default());
        let app = app_with_transport(transport.clone());

        let response = app
            .oneshot(
                Request::builder()
                    .method("OPTIONS")
                    .uri("/api/send-email")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body reads");
        assert!(bytes.is_empty());
        assert!(transport.sent().await.is_empty());
    }

    #[tokio::test]
    async fn contact_post_delivers_one_email_and_returns_the_receipt() {
        let transport = Arc::new(RecordingMailTransport::default());
        let app = app_with_transport(transport.clone());

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/send-email")
                    .header("content-type", "application/json")
                    .body(Body::from(contact_body()))
                    .expect("request"),
            )
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["id"], "recorded-1");

        let sent = transport.sent().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].subject, "New Web Inquiry: Jane Doe");
    }

    #[tokio::test]
    async fn provider_failure_maps_to_500_with_the_error_message() {
        let transport = Arc::new(RecordingMailTransport::failing(TransportError::Rejected {
            status: 422,
            body: "invalid sender".to_string(),
        }));
        let app = app_with_transport(transport);

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/send-email")
                    .header("content-type", "application/json")
                    .body(Body::from(contact_body()))
                    .expect("request"),
            )
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert!(body["error"].as_str().expect("error string").contains("invalid sender"));
    }

    #[tokio::test]
    async fn unknown_quote_category_is_rejected_before_delivery() {
        let transport = Arc::new(RecordingMailTransport::default());
        let app = app_with_transport(transport.clone());

        let body = json!({
            "type": "quote",
            "data": {
                "type": "boat",
                "personal": {
                    "firstName": "Sam",
                    "lastName": "Nkosi",
                    "email": "sam@x.com",
                    "phone": "021 555 0000"
                },
                "details": { "hullLength": 12 }
            }
        })
        .to_string();

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/send-email")
                    .header("content-type", "application/json")
                    .body(Body::from(body))
                    .expect("request"),
            )
            .await
            .expect("router responds");

        assert!(response.status().is_client_error());
        assert!(transport.sent().await.is_empty());
    }
}
