// ==========================================
// 工厂管理系统 - HTTP 服务启动
// ==========================================
// 职责:
// - 组装路由（API + CORS + 请求追踪）
// - 绑定监听地址并运行，收到 Ctrl-C / SIGTERM 后优雅退出
// ==========================================

use anyhow::{Context, Result};
use axum::http::{header, HeaderValue};
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api;
use crate::app::state::{AppState, SharedState};
use crate::config::ServerConfig;

/// 组装完整路由
pub fn build_router(state: SharedState) -> Router {
    let cors = cors_layer(&state.config.cors_origins);
    api::api_router()
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS: 配置的来源列表（"*" 表示任意），任意方法，允许 Content-Type
fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods(Any)
        .allow_headers([header::CONTENT_TYPE]);

    if origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let values: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!(origin = %origin, error = %e, "忽略无效的跨域来源");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(values))
}

/// 启动服务
pub async fn serve(config: ServerConfig) -> Result<()> {
    let bind_addr = config.bind_addr;
    let state = AppState::open(config).context("数据库初始化失败")?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("无法绑定地址 {}", bind_addr))?;
    let local_addr = listener.local_addr()?;
    tracing::info!(addr = %local_addr, "服务已启动");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("服务运行异常")?;

    tracing::info!("服务已停止");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "无法监听 Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "无法监听 SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("收到退出信号，正在关闭...");
}
