// SPDX-License-Identifier: MIT

//! Dry-run HTTP surface
//!
//! Evaluates a posted ruleset against a posted pull request on an
//! in-memory platform. Nothing reaches a hosting platform.

use axum::{routing::get, routing::post, Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::engine::pass::Engine;
use crate::engine::platforms::memory::MemoryPlatform;
use crate::engine::rules::types::RulesetDefinition;
use crate::engine::rules::Ruleset;
use crate::kit::snapshot::PullRequestSnapshot;

const DEFAULT_IDENTITY: &str = "prflow-bot";

pub fn router() -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/check", post(check_rules))
        .route("/api/evaluate", post(evaluate))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

pub async fn serve(port: u16) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    log::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router()).await?;

    Ok(())
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

#[derive(Debug, Deserialize)]
struct CheckRequest {
    rules: RulesetDefinition,
}

async fn check_rules(Json(payload): Json<CheckRequest>) -> Json<Value> {
    match Ruleset::compile(payload.rules) {
        Ok(ruleset) => {
            let engine = Engine::new(ruleset);
            Json(json!({
                "rules": engine.ruleset().len(),
                "errors": engine.validate(),
            }))
        }
        Err(e) => Json(json!({ "error": e.to_string() })),
    }
}

#[derive(Debug, Deserialize)]
struct EvaluateRequest {
    rules: RulesetDefinition,
    pull_request: PullRequestSnapshot,
    #[serde(default)]
    identity: Option<String>,
}

async fn evaluate(Json(payload): Json<EvaluateRequest>) -> Json<Value> {
    let ruleset = match Ruleset::compile(payload.rules) {
        Ok(ruleset) => ruleset,
        Err(e) => return Json(json!({ "error": e.to_string() })),
    };
    let engine = Engine::new(ruleset);
    let identity = payload
        .identity
        .unwrap_or_else(|| DEFAULT_IDENTITY.to_string());
    let platform = MemoryPlatform::new(identity, payload.pull_request.clone());

    let summary = engine.run_pass(&payload.pull_request, &platform).await;
    let after = platform.snapshot_now();
    Json(json!({
        "summary": summary,
        "pull_request": after,
    }))
}
