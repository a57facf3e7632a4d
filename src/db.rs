// ==========================================
// 工厂管理系统 - SQLite 连接初始化与建库
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为（外键 + busy_timeout）
// - 注册 fold_case（Unicode 小写），名称比较与唯一索引都依赖它
// - 启动时幂等建表，并记录 schema_version
// ==========================================

use rusqlite::functions::FunctionFlags;
use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 建库脚本（全部使用 IF NOT EXISTS，可重复执行）
///
/// 说明：
/// - 日期以 ISO 文本存储（`YYYY-MM-DDTHH:MM:SS`）
/// - 价格以十进制文本存储，避免浮点误差
/// - 库存计数器带 CHECK 约束，作为最后一道防线
/// - 名称/编码/邮箱按 fold_case 建唯一索引，与仓储层校验规则一致
const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version     INTEGER NOT NULL,
    applied_at  TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS config_kv (
    scope_id    TEXT NOT NULL DEFAULT 'global',
    key         TEXT NOT NULL,
    value       TEXT NOT NULL,
    updated_at  TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (scope_id, key)
);

CREATE TABLE IF NOT EXISTS categories (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL,
    description TEXT
);

CREATE TABLE IF NOT EXISTS customers (
    id      INTEGER PRIMARY KEY AUTOINCREMENT,
    name    TEXT NOT NULL,
    contact TEXT NOT NULL,
    address TEXT NOT NULL,
    city    TEXT NOT NULL,
    postal  TEXT NOT NULL,
    phone   TEXT NOT NULL,
    email   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS suppliers (
    id      INTEGER PRIMARY KEY AUTOINCREMENT,
    name    TEXT NOT NULL,
    contact TEXT NOT NULL,
    address TEXT NOT NULL,
    city    TEXT NOT NULL,
    postal  TEXT NOT NULL,
    phone   TEXT NOT NULL,
    email   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS materials (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    category_id INTEGER NOT NULL REFERENCES categories(id),
    name        TEXT NOT NULL,
    quantity    INTEGER NOT NULL DEFAULT 0 CHECK (quantity >= 0),
    price       TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS products (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    category_id INTEGER NOT NULL REFERENCES categories(id),
    name        TEXT NOT NULL,
    quantity    INTEGER NOT NULL DEFAULT 0 CHECK (quantity >= 0),
    price       TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS product_details (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    product_id   INTEGER NOT NULL REFERENCES products(id) ON DELETE CASCADE,
    material_id  INTEGER NOT NULL REFERENCES materials(id),
    qty_material INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS orders (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    code        TEXT NOT NULL,
    order_date  TEXT NOT NULL,
    customer_id INTEGER NOT NULL REFERENCES customers(id)
);

CREATE TABLE IF NOT EXISTS order_details (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    order_id   INTEGER NOT NULL REFERENCES orders(id) ON DELETE CASCADE,
    product_id INTEGER NOT NULL REFERENCES products(id),
    qty        INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS purchases (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    code          TEXT NOT NULL,
    purchase_date TEXT NOT NULL,
    supplier_id   INTEGER NOT NULL REFERENCES suppliers(id)
);

CREATE TABLE IF NOT EXISTS purchase_details (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    purchase_id INTEGER NOT NULL REFERENCES purchases(id) ON DELETE CASCADE,
    material_id INTEGER NOT NULL REFERENCES materials(id),
    qty         INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS productions (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    code            TEXT NOT NULL,
    production_date TEXT NOT NULL,
    product_id      INTEGER NOT NULL REFERENCES products(id),
    qty             INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_materials_category ON materials(category_id);
CREATE INDEX IF NOT EXISTS idx_products_category ON products(category_id);
CREATE INDEX IF NOT EXISTS idx_product_details_product ON product_details(product_id);
CREATE INDEX IF NOT EXISTS idx_order_details_order ON order_details(order_id);
CREATE INDEX IF NOT EXISTS idx_purchase_details_purchase ON purchase_details(purchase_id);
CREATE INDEX IF NOT EXISTS idx_productions_product ON productions(product_id);

CREATE UNIQUE INDEX IF NOT EXISTS ux_categories_name ON categories(fold_case(name));
CREATE UNIQUE INDEX IF NOT EXISTS ux_customers_name ON customers(fold_case(name));
CREATE UNIQUE INDEX IF NOT EXISTS ux_customers_email ON customers(fold_case(email));
CREATE UNIQUE INDEX IF NOT EXISTS ux_suppliers_name ON suppliers(fold_case(name));
CREATE UNIQUE INDEX IF NOT EXISTS ux_suppliers_email ON suppliers(fold_case(email));
CREATE UNIQUE INDEX IF NOT EXISTS ux_materials_name ON materials(fold_case(name));
CREATE UNIQUE INDEX IF NOT EXISTS ux_products_name ON products(fold_case(name));
CREATE UNIQUE INDEX IF NOT EXISTS ux_orders_code ON orders(fold_case(code));
CREATE UNIQUE INDEX IF NOT EXISTS ux_purchases_code ON purchases(fold_case(code));
CREATE UNIQUE INDEX IF NOT EXISTS ux_productions_code ON productions(fold_case(code));
"#;

/// 大小写折叠函数名（SQL 中使用）
pub const FOLD_CASE_FN: &str = "fold_case";

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
/// - fold_case 同样按连接注册，未注册时写入带唯一索引的表会失败
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    register_fold_case(conn)?;
    Ok(())
}

/// 注册 fold_case(text)：按 Unicode 规则转小写，NULL 原样返回
///
/// SQLite 自带的 LOWER 只处理 ASCII
fn register_fold_case(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        FOLD_CASE_FN,
        1,
        FunctionFlags::SQLITE_UTF8
            | FunctionFlags::SQLITE_DETERMINISTIC
            | FunctionFlags::SQLITE_INNOCUOUS,
        |ctx| {
            let value: Option<String> = ctx.get(0)?;
            Ok(value.map(|v| v.to_lowercase()))
        },
    )
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 幂等建表，首次建库时写入 schema_version
pub fn ensure_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;

    if read_schema_version(conn)?.is_none() {
        conn.execute(
            "INSERT INTO schema_version (version) VALUES (?1)",
            [CURRENT_SCHEMA_VERSION],
        )?;
        tracing::info!(version = CURRENT_SCHEMA_VERSION, "数据库结构初始化完成");
    }

    Ok(())
}

/// 读取 schema_version（若表不存在或为空则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> = conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}
