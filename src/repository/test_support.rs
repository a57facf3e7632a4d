// ==========================================
// 仓储层单元测试辅助
// ==========================================

use rusqlite::{params, Connection};

use crate::db::{configure_sqlite_connection, ensure_schema};

/// 内存数据库（已建表）
pub(crate) fn setup_test_db() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    configure_sqlite_connection(&conn).unwrap();
    ensure_schema(&conn).unwrap();
    conn
}

/// 获取或创建类别
pub(crate) fn seed_category(conn: &Connection, name: &str) -> i64 {
    if let Ok(id) = conn.query_row(
        "SELECT id FROM categories WHERE name = ?1",
        params![name],
        |row| row.get(0),
    ) {
        return id;
    }
    conn.execute(
        "INSERT INTO categories (name, description) VALUES (?1, NULL)",
        params![name],
    )
    .unwrap();
    conn.last_insert_rowid()
}

/// 物料（类别 Parts）
pub(crate) fn seed_material(conn: &Connection, name: &str, quantity: i64) -> i64 {
    let category_id = seed_category(conn, "Parts");
    conn.execute(
        "INSERT INTO materials (category_id, name, quantity, price) VALUES (?1, ?2, ?3, '1.50')",
        params![category_id, name, quantity],
    )
    .unwrap();
    conn.last_insert_rowid()
}

/// 产品（类别 Goods）及其物料清单
pub(crate) fn seed_product(conn: &Connection, name: &str, quantity: i64, bom: &[(i64, i64)]) -> i64 {
    let category_id = seed_category(conn, "Goods");
    conn.execute(
        "INSERT INTO products (category_id, name, quantity, price) VALUES (?1, ?2, ?3, '10.00')",
        params![category_id, name, quantity],
    )
    .unwrap();
    let product_id = conn.last_insert_rowid();
    for (material_id, per_unit) in bom {
        conn.execute(
            "INSERT INTO product_details (product_id, material_id, qty_material) VALUES (?1, ?2, ?3)",
            params![product_id, material_id, per_unit],
        )
        .unwrap();
    }
    product_id
}

fn seed_partner(conn: &Connection, table: &str, name: &str, email: &str) -> i64 {
    conn.execute(
        &format!(
            "INSERT INTO {} (name, contact, address, city, postal, phone, email)
             VALUES (?1, 'John', 'Main St 1', 'Springfield', '12345', '555-0100', ?2)",
            table
        ),
        params![name, email],
    )
    .unwrap();
    conn.last_insert_rowid()
}

pub(crate) fn seed_customer(conn: &Connection, name: &str, email: &str) -> i64 {
    seed_partner(conn, "customers", name, email)
}

pub(crate) fn seed_supplier(conn: &Connection, name: &str, email: &str) -> i64 {
    seed_partner(conn, "suppliers", name, email)
}

/// 读取库存计数器
pub(crate) fn quantity_of(conn: &Connection, table: &str, id: i64) -> i64 {
    conn.query_row(
        &format!("SELECT quantity FROM {} WHERE id = ?1", table),
        params![id],
        |row| row.get(0),
    )
    .unwrap()
}

/// 测试用日期
pub(crate) fn date(y: i32, m: u32, d: u32) -> chrono::NaiveDateTime {
    chrono::NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}
