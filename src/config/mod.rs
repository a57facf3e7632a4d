// ==========================================
// 工厂管理系统 - 配置层
// ==========================================
// 职责:
// - 启动配置: 环境变量（ServerConfig）
// - 运行期配置: config_kv 表（ConfigManager）
// ==========================================

pub mod config_manager;
pub mod server_config;

// 重导出
pub use config_manager::{config_keys, ConfigManager};
pub use server_config::{get_default_db_path, ConfigError, ServerConfig};
