//! Podium verification-code relay.
//!
//! The one server-side collaborator of the app: accepts `{ email, code }`
//! from the frontend and forwards the code to the email-delivery provider.
//! Stateless; holds only the provider credentials the browser must not see.

mod config;
mod error;

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use axum::{Router, body::Bytes, extract::State, response::Json, routing::post};
use serde::Deserialize;
use serde_json::{Value, json};
use signal_hook::flag as signal_flag;
use tracing_subscriber::EnvFilter;

use config::Config;
use error::RelayError;

struct RelayState {
    config: Config,
    client: reqwest::Client,
}

#[derive(Debug, Default, Deserialize)]
struct SendCodeRequest {
    #[serde(default)]
    email: String,
    #[serde(default)]
    code: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("podium_relay=info".parse().unwrap()),
        )
        .init();

    let config = Config::load();
    let port = config.port;
    let state = Arc::new(RelayState {
        client: reqwest::Client::new(),
        config,
    });

    // Build router
    let app = Router::new()
        .route("/api/send-code", post(handle_send_code))
        .with_state(state);

    // Set up graceful shutdown signal handling
    let term_signal = Arc::new(AtomicBool::new(false));
    for signal in signal_hook::consts::TERM_SIGNALS {
        let _ = signal_flag::register(*signal, Arc::clone(&term_signal));
    }

    // Bind server
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let local_addr = listener.local_addr()?;

    println!(
        "Podium relay starting on http://localhost:{}",
        local_addr.port()
    );
    println!();
    println!("Available endpoints:");
    println!("  POST /api/send-code - relay a verification code to the email provider");
    println!();
    println!("Press Ctrl+C to shutdown");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            while !term_signal.load(Ordering::Relaxed) {
                tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
            }
            tracing::info!("Shutdown signal received");
        })
        .await?;

    println!("Relay shut down");
    Ok(())
}

/// Handler for POST /api/send-code.
///
/// The body is parsed by hand so an unreadable payload maps to a 400 rather
/// than an extractor rejection; an empty body counts as missing fields.
async fn handle_send_code(
    State(state): State<Arc<RelayState>>,
    body: Bytes,
) -> Result<Json<Value>, RelayError> {
    let request: SendCodeRequest = if body.is_empty() {
        SendCodeRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|_| RelayError::MalformedPayload)?
    };
    if request.email.is_empty() || request.code.is_empty() {
        return Err(RelayError::MissingFields);
    }

    let response = state
        .client
        .post(&state.config.provider_url)
        .bearer_auth(&state.config.provider_api_key)
        .json(&json!({
            "from": state.config.from_address,
            "to": request.email,
            "subject": "Your verification code",
            "html": format!(
                "<p>Your verification code is <strong>{}</strong>.</p>",
                request.code
            ),
        }))
        .send()
        .await?;

    let status = response.status();
    let detail: Value = response.json().await.unwrap_or_else(|_| json!({}));
    if !status.is_success() {
        tracing::error!(
            status = status.as_u16(),
            %detail,
            "email provider rejected dispatch"
        );
        return Err(RelayError::Provider {
            status: status.as_u16(),
            detail,
        });
    }

    tracing::info!(email = %request.email, "verification code relayed");
    Ok(Json(json!({ "ok": true })))
}
