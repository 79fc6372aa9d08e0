/// REST API surface for batch money-muling analysis.
use actix_web::{middleware, web, App, HttpResponse, HttpServer};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use crate::analysis::AnalysisEngine;
use crate::core::config::Config;
use crate::core::errors::EngineError;
use crate::ingest;
use crate::metrics;

/// Shared server state.
pub struct ApiState {
    pub engine: Arc<AnalysisEngine>,
}

pub async fn start_server(config: Config) -> std::io::Result<()> {
    let engine = Arc::new(AnalysisEngine::new());
    let state = web::Data::new(ApiState { engine });
    let max_upload = config.max_upload_bytes;

    info!(
        "🌐 REST API listening on {}:{}",
        config.api_host, config.api_port
    );

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(web::PayloadConfig::new(max_upload))
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .route("/", web::get().to(index))
            .route("/health", web::get().to(health_check))
            .route("/metrics", web::get().to(metrics_handler))
            .route("/api/v1/analyze", web::post().to(analyze))
    })
    .bind((config.api_host.as_str(), config.api_port))?
    .run()
    .await
}

async fn index() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "service": "muleflow",
        "feature": "money-muling detection over transaction batches",
        "endpoints": {
            "health": "/health",
            "metrics": "/metrics",
            "analyze": "POST /api/v1/analyze (CSV body)"
        }
    }))
}

async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "healthy"
    }))
}

async fn metrics_handler() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(metrics::gather_metrics())
}

/// Analyze an uploaded CSV of transactions and return the full report.
async fn analyze(state: web::Data<ApiState>, body: web::Bytes) -> HttpResponse {
    let (table, stats) = match ingest::parse_csv(&body) {
        Ok(parsed) => parsed,
        Err(e) => {
            return HttpResponse::BadRequest().json(json!({
                "error": e.to_string()
            }));
        }
    };

    info!(
        "Upload accepted: {} rows kept, {} dropped",
        stats.rows_kept, stats.rows_dropped
    );

    match state.engine.analyze(table).await {
        Ok(report) => HttpResponse::Ok().json(report),
        Err(e @ EngineError::InvalidInput(_)) => HttpResponse::BadRequest().json(json!({
            "error": e.to_string()
        })),
        Err(e) => HttpResponse::InternalServerError().json(json!({
            "error": e.to_string()
        })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App};

    fn test_app_state() -> web::Data<ApiState> {
        web::Data::new(ApiState {
            engine: Arc::new(AnalysisEngine::new()),
        })
    }

    #[actix_rt::test]
    async fn health_returns_ok() {
        let app = test::init_service(
            App::new()
                .app_data(test_app_state())
                .route("/health", web::get().to(health_check)),
        )
        .await;

        let req = test::TestRequest::get().uri("/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
    }

    #[actix_rt::test]
    async fn analyze_round_trips_a_cycle() {
        let app = test::init_service(
            App::new()
                .app_data(test_app_state())
                .route("/api/v1/analyze", web::post().to(analyze)),
        )
        .await;

        let csv = "transaction_id,sender_id,receiver_id,amount,timestamp\n\
                   t1,A,B,100,2024-01-01T00:00:00Z\n\
                   t2,B,C,100,2024-01-01T00:01:00Z\n\
                   t3,C,A,100,2024-01-01T00:02:00Z\n";

        let req = test::TestRequest::post()
            .uri("/api/v1/analyze")
            .set_payload(csv)
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["summary"]["total_accounts_analyzed"], 3);
        assert_eq!(body["fraud_rings"][0]["ring_id"], "RING_001");
        assert_eq!(body["fraud_rings"][0]["pattern_type"], "cycle");
    }

    #[actix_rt::test]
    async fn analyze_rejects_missing_columns() {
        let app = test::init_service(
            App::new()
                .app_data(test_app_state())
                .route("/api/v1/analyze", web::post().to(analyze)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/analyze")
            .set_payload("foo,bar\n1,2\n")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);
    }
}
