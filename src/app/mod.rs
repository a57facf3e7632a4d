// ==========================================
// 工厂管理系统 - 应用层
// ==========================================
// 职责: 共享状态、路由组装、服务启动与优雅退出
// ==========================================

pub mod server;
pub mod state;

// 重导出
pub use server::{build_router, serve};
pub use state::{AppState, SharedState};
