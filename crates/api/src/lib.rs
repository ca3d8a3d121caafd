//! # API
//!
//! REST surface over an [`OrderStore`].
//!
//! | route | 说明 |
//! |-------|------|
//! | `GET /` | health check |
//! | `GET /api/v1/workorders?status=` | 列表, 可按状态精确过滤 |
//! | `GET /api/v1/workorders/:order_id` | 单条, 缺失时 404 |
//! | `POST /api/v1/workorders` | 创建, 201 / 409 / 422 |
//! | `GET /api/v1/kpis` | 基于当前存储计算的 KPI |
//! | `GET /api/v1/quality?order_id=&limit=` | 质检结果, 默认最多 20 条 |
//! | `GET /api/v1/production/stats` | 全厂生产统计 (效率 / 不良率) |

mod error;
mod handlers;
mod models;

pub use error::ApiError;
pub use models::CreateOrderRequest;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use contracts::OrderStore;
use tower_http::cors::CorsLayer;
use tracing::info;

/// Shared handler state
pub type AppState = Arc<dyn OrderStore>;

/// Build the application router
pub fn router(store: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::health))
        .route(
            "/api/v1/workorders",
            get(handlers::list_orders).post(handlers::create_order),
        )
        .route("/api/v1/workorders/:order_id", get(handlers::get_order))
        .route("/api/v1/kpis", get(handlers::kpis))
        .route("/api/v1/quality", get(handlers::quality))
        .route("/api/v1/production/stats", get(handlers::production_stats))
        .layer(CorsLayer::permissive())
        .with_state(store)
}

/// Serve on a bound listener until `shutdown` resolves
pub async fn serve<F>(
    store: AppState,
    listener: tokio::net::TcpListener,
    shutdown: F,
) -> std::io::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    info!(addr = %listener.local_addr()?, "MES API listening");
    axum::serve(listener, router(store))
        .with_graceful_shutdown(shutdown)
        .await
}
