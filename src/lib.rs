// ==========================================
// 工厂管理系统 - 核心库
// ==========================================
// 技术栈: axum + Rust + SQLite
// 系统定位: 库存与生产管理后端（类别 / 物料 / 产品 / 客户 / 供应商 /
//           销售订单 / 采购单 / 生产记录）
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "en");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 传输结构与类型
pub mod domain;

// 数据仓储层 - 数据访问与库存记账
pub mod repository;

// 配置层 - 启动配置与运行期配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// 性能统计
pub mod perf;

// 国际化
pub mod i18n;

// API 层 - HTTP 路由与处理器
pub mod api;

// 应用层 - 共享状态与服务启动
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

pub use app::{build_router, serve, AppState, SharedState};
pub use config::ServerConfig;
pub use repository::{Database, RepositoryError, RepositoryResult, UnitOfWork};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "工厂管理系统";
