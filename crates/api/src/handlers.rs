//! Route handlers

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Local;
use contracts::{KpiSummary, OrderRecord, QualityRecord};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};
use validator::Validate;

use crate::error::ApiError;
use crate::models::CreateOrderRequest;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
}

/// Default page size of the quality listing
const DEFAULT_QUALITY_LIMIT: usize = 20;

#[derive(Debug, Deserialize)]
pub struct QualityQuery {
    pub order_id: Option<String>,
    pub limit: Option<usize>,
}

pub async fn health() -> Json<Value> {
    Json(json!({
        "service": "MES API v1",
        "status": "operational",
        "timestamp": Local::now().naive_local().format("%Y-%m-%dT%H:%M:%S%.6f").to_string(),
    }))
}

pub async fn list_orders(
    State(store): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<OrderRecord>>, ApiError> {
    let status = query.status.as_deref().filter(|s| !s.is_empty());
    let orders = store.list(status)?;
    debug!(count = orders.len(), status = ?status, "listed work orders");
    Ok(Json(orders))
}

pub async fn get_order(
    State(store): State<AppState>,
    Path(order_id): Path<String>,
) -> Result<Json<OrderRecord>, ApiError> {
    Ok(Json(store.require(&order_id)?))
}

pub async fn create_order(
    State(store): State<AppState>,
    body: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<OrderRecord>), ApiError> {
    let Json(request) = body?;
    request.validate()?;

    let order = request.into_record();
    store.create(&order)?;
    info!(order_id = %order.order_id, "work order created");
    Ok((StatusCode::CREATED, Json(order)))
}

pub async fn kpis(State(store): State<AppState>) -> Result<Json<KpiSummary>, ApiError> {
    let orders = store.list(None)?;
    Ok(Json(processing::api_kpis(&orders)))
}

pub async fn quality(
    State(store): State<AppState>,
    Query(query): Query<QualityQuery>,
) -> Result<Json<Vec<QualityRecord>>, ApiError> {
    let order_id = query.order_id.as_deref().filter(|s| !s.is_empty());
    let limit = query.limit.unwrap_or(DEFAULT_QUALITY_LIMIT);
    let records = store.list_quality(order_id, limit)?;
    debug!(count = records.len(), order_id = ?order_id, "listed quality results");
    Ok(Json(records))
}

pub async fn production_stats(State(store): State<AppState>) -> Result<Json<KpiSummary>, ApiError> {
    let orders = store.list(None)?;
    let quality = store.list_quality(None, usize::MAX)?;
    Ok(Json(processing::production_stats(&orders, &quality)))
}

#[cfg(test)]
mod tests {
    use crate::{router, AppState};
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use contracts::{OrderRecord, QualityRecord};
    use order_store::{OrderStore, SqliteOrderStore};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app() -> Router {
        let store = SqliteOrderStore::in_memory().unwrap();
        store.initialize().unwrap();
        let mut done = OrderRecord::new("WO-1", "Widget", 100, "completed");
        done.quantity_produced = 100;
        store.create(&done).unwrap();
        store
            .create(&OrderRecord::new("WO-2", "Gear", 100, "pending"))
            .unwrap();
        for (id, order_id, result) in [("QM-1", "WO-1", "pass"), ("QM-2", "WO-1", "fail"), ("QM-3", "WO-2", "pass")] {
            let mut record = QualityRecord::new(result);
            record.metric_id = Some(id.into());
            record.order_id = Some(order_id.into());
            store.add_quality(&record).unwrap();
        }
        let state: AppState = Arc::new(store);
        router(state)
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let resp = app.clone().oneshot(request).await.unwrap();
        let status = resp.status();
        let body = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post(body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/v1/workorders")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(&app(), get("/")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "operational");
    }

    #[tokio::test]
    async fn test_list_with_filter() {
        let app = app();
        let (status, body) = send(&app, get("/api/v1/workorders")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 2);

        let (_, body) = send(&app, get("/api/v1/workorders?status=pending")).await;
        let orders = body.as_array().unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0]["order_id"], "WO-2");
    }

    #[tokio::test]
    async fn test_get_missing_is_404() {
        let (status, body) = send(&app(), get("/api/v1/workorders/NOPE")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], "Work order NOPE not found");
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let app = app();
        let (status, body) = send(
            &app,
            post(json!({
                "order_id": "B2001",
                "line_id": "L5",
                "item_name": "NewItem",
                "quantity": 10,
                "status": "pending"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["order_id"], "B2001");

        let (status, body) = send(&app, get("/api/v1/workorders/B2001")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["item_name"], "NewItem");
        assert_eq!(body["quantity_planned"], 10);
    }

    #[tokio::test]
    async fn test_create_duplicate_is_409() {
        let body = json!({"order_id": "WO-1", "item_name": "X", "quantity": 1, "status": "pending"});
        let (status, _) = send(&app(), post(body)).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_create_invalid_is_422() {
        let app = app();
        let (status, body) = send(
            &app,
            post(json!({"order_id": "", "item_name": "X", "quantity": 1, "status": "pending"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["detail"].as_str().unwrap().contains("order_id"));

        let (status, _) = send(&app, post(json!({"order_id": "X"}))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_kpis() {
        let (status, body) = send(&app(), get("/api/v1/kpis")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_orders"], 2);
        assert_eq!(body["completed_orders"], 1);
        assert_eq!(body["completion_rate"], 50.0);
        assert_eq!(body["efficiency"], 50.0);
    }

    #[tokio::test]
    async fn test_quality_filter_and_limit() {
        let app = app();
        let (status, body) = send(&app, get("/api/v1/quality")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 3);

        let (_, body) = send(&app, get("/api/v1/quality?order_id=WO-1")).await;
        let records = body.as_array().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1]["result"], "fail");

        let (_, body) = send(&app, get("/api/v1/quality?limit=1")).await;
        assert_eq!(body.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_production_stats() {
        let (status, body) = send(&app(), get("/api/v1/production/stats")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_orders"], 2);
        assert_eq!(body["completed_orders"], 1);
        assert_eq!(body["active_orders"], 0);
        assert_eq!(body["overall_efficiency"], 50.0);
        assert_eq!(body["defect_rate"], 33.33);
    }
}
