// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Prometheus metrics for function invocations.

use std::net::SocketAddr;
use std::time::Duration;

use axum::{http::StatusCode, response::IntoResponse, routing::get, Router};
use lazy_static::lazy_static;
use prometheus::{register_histogram_vec, register_int_counter_vec, HistogramVec, IntCounterVec};

lazy_static! {
    pub static ref FUNCTION_INVOCATIONS: IntCounterVec = register_int_counter_vec!(
        "function_invocations_total",
        "Total number of function invocations by outcome",
        &["function", "outcome"]
    )
    .unwrap();
    pub static ref INVOCATION_DURATION: HistogramVec = register_histogram_vec!(
        "function_invocation_duration_seconds",
        "Time spent inside the invocation pipeline",
        &["function"],
        vec![0.0005, 0.001, 0.005, 0.010, 0.050, 0.100, 0.500, 1.0, 5.0]
    )
    .unwrap();
}

/// How an invocation ended, as seen by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Rejected,
    Error,
}

impl Outcome {
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Rejected => "rejected",
            Self::Error => "error",
        }
    }

    /// Classify a final HTTP status.
    pub fn from_status(status: u16) -> Self {
        match status {
            500..=599 => Self::Error,
            400..=499 => Self::Rejected,
            _ => Self::Success,
        }
    }
}

/// Record one finished invocation.
pub fn record_invocation(function: &str, outcome: Outcome, elapsed: Duration) {
    FUNCTION_INVOCATIONS
        .with_label_values(&[function, outcome.label()])
        .inc();
    INVOCATION_DURATION
        .with_label_values(&[function])
        .observe(elapsed.as_secs_f64());
}

/// Start the metrics server in a background task.
pub fn start_metrics_server(port: u16) {
    // Force initialization of metrics
    lazy_static::initialize(&FUNCTION_INVOCATIONS);
    lazy_static::initialize(&INVOCATION_DURATION);

    tokio::spawn(async move {
        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        let app = Router::new().route("/metrics", get(metrics_handler));

        match tokio::net::TcpListener::bind(addr).await {
            Ok(listener) => {
                tracing::info!("Metrics server starting on {}", addr);
                if let Err(e) = axum::serve(listener, app).await {
                    tracing::error!("Metrics server stopped: {}", e);
                }
            }
            Err(e) => {
                tracing::error!("Failed to bind metrics server: {}", e);
            }
        }
    });
}

async fn metrics_handler() -> impl IntoResponse {
    use prometheus::Encoder;
    let encoder = prometheus::TextEncoder::new();

    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&prometheus::gather(), &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return (StatusCode::INTERNAL_SERVER_ERROR, String::new());
    }

    (
        StatusCode::OK,
        String::from_utf8(buffer).unwrap_or_else(|_| String::from("Encoding error")),
    )
}
