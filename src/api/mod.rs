// ==========================================
// 工厂管理系统 - API 层
// ==========================================
// 职责: HTTP 路由与处理器，委托工作单元完成读写
// ==========================================

pub mod error;
pub mod handlers;
pub mod resource;

use axum::routing::get;
use axum::Router;

use crate::app::state::SharedState;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use resource::{
    Categories, Customers, DatedResource, Materials, Orders, Productions, Products, Purchases,
    Resource, Suppliers,
};

/// 全部 API 路由
pub fn api_router() -> Router<SharedState> {
    Router::new()
        .merge(handlers::resource_routes::<Categories>())
        .merge(handlers::resource_routes::<Customers>())
        .merge(handlers::resource_routes::<Suppliers>())
        .merge(handlers::resource_routes::<Materials>())
        .merge(handlers::resource_routes::<Products>())
        .merge(handlers::dated_resource_routes::<Orders>())
        .merge(handlers::dated_resource_routes::<Purchases>())
        .merge(handlers::dated_resource_routes::<Productions>())
        .route("/health", get(health_check))
}

async fn health_check() -> &'static str {
    "ok"
}
