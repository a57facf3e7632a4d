// ==========================================
// 工厂管理系统 - 运行期配置管理器
// ==========================================
// 职责: 运行期可调参数的读取与覆写
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use rusqlite::{params, Connection, OptionalExtension};

use crate::domain::pagination::{PaginationSettings, DEFAULT_MAX_PAGE_SIZE, DEFAULT_PAGE_SIZE};
use crate::repository::error::RepositoryResult;

/// 配置键
pub mod config_keys {
    // 分页
    pub const DEFAULT_PAGE_SIZE: &str = "pagination.default_page_size";
    pub const MAX_PAGE_SIZE: &str = "pagination.max_page_size";
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager<'c> {
    conn: &'c Connection,
}

impl<'c> ConfigManager<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_config_value(&self, key: &str) -> RepositoryResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 从 config_kv 表读取配置值，带默认值
    pub fn get_config_or_default(&self, key: &str, default: &str) -> RepositoryResult<String> {
        Ok(self
            .get_config_value(key)?
            .unwrap_or_else(|| default.to_string()))
    }

    /// 写入配置值（UPSERT）
    pub fn set_config_value(&self, key: &str, value: &str) -> RepositoryResult<()> {
        self.conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        tracing::info!(key, value, "配置已更新");
        Ok(())
    }

    /// 读取整数配置；缺失或无法解析时返回默认值
    fn get_positive_i64(&self, key: &str, default: i64) -> RepositoryResult<i64> {
        let raw = self.get_config_or_default(key, &default.to_string())?;
        match raw.trim().parse::<i64>() {
            Ok(v) if v > 0 => Ok(v),
            _ => {
                tracing::warn!(key, value = %raw, default, "配置值无效，使用默认值");
                Ok(default)
            }
        }
    }

    // ===== 分页配置 =====

    /// 获取分页配置
    pub fn pagination_settings(&self) -> RepositoryResult<PaginationSettings> {
        Ok(PaginationSettings {
            default_page_size: self.get_positive_i64(config_keys::DEFAULT_PAGE_SIZE, DEFAULT_PAGE_SIZE)?,
            max_page_size: self.get_positive_i64(config_keys::MAX_PAGE_SIZE, DEFAULT_MAX_PAGE_SIZE)?,
        })
    }
}
