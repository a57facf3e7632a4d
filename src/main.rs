// ==========================================
// 工厂管理系统 - 服务主入口
// ==========================================
// 启动顺序: 读取配置 → 初始化日志 → 设置语言 → 打开数据库 → 启动 HTTP 服务
// ==========================================

use anyhow::Context;

use factory_mgmt::config::ServerConfig;
use factory_mgmt::{i18n, logging};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::from_env().context("启动配置无效")?;

    // 初始化日志系统
    logging::init(config.log_format);

    tracing::info!("==================================================");
    tracing::info!("{}", factory_mgmt::APP_NAME);
    tracing::info!("系统版本: {}", factory_mgmt::VERSION);
    tracing::info!("==================================================");

    i18n::set_locale(&config.locale);
    tracing::info!(
        db_path = %config.db_path,
        bind_addr = %config.bind_addr,
        locale = %i18n::current_locale(),
        "配置加载完成"
    );

    factory_mgmt::serve(config).await
}
