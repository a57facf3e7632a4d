// ==========================================
// 工厂管理系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态（数据库句柄 + 启动配置）
// ==========================================

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::repository::{Database, RepositoryResult};

/// 应用状态
///
/// 由所有请求共享，通过 axum `State` 注入
pub struct AppState {
    /// 数据库句柄
    pub db: Database,

    /// 启动配置
    pub config: ServerConfig,
}

/// 处理器中使用的共享状态
pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(db: Database, config: ServerConfig) -> Self {
        Self { db, config }
    }

    /// 按配置打开数据库并创建应用状态
    ///
    /// # 参数
    /// - config: 启动配置（db_path 指向的文件不存在时自动创建）
    pub fn open(config: ServerConfig) -> RepositoryResult<SharedState> {
        tracing::info!(db_path = %config.db_path, "初始化应用状态");
        let db = Database::open(&config.db_path)?;
        Ok(Arc::new(Self::new(db, config)))
    }
}
