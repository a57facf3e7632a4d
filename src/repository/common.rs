// ==========================================
// 工厂管理系统 - 仓储层公共工具
// ==========================================
// 职责:
// - 动态 WHERE 条件构建（可选过滤项）
// - 分页查询（COUNT + LIMIT/OFFSET）
// - 名称查找与唯一性检查（大小写不敏感，fold_case 由 db 模块注册）
// - 金额列读写
// ==========================================

use chrono::NaiveDate;
use rusqlite::types::{Type, Value};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

use crate::domain::dates::DATE_FORMAT;
use crate::domain::pagination::{PageRequest, Pagination};
use crate::repository::error::RepositoryResult;

// ==========================================
// WHERE 条件构建
// ==========================================

/// 动态 WHERE 条件
///
/// 未提供的过滤项不产生条件；参数按 `?` 出现顺序绑定
#[derive(Debug, Default)]
pub struct WhereBuilder {
    clauses: Vec<String>,
    values: Vec<Value>,
}

impl WhereBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 任一列包含 needle（大小写不敏感）
    pub fn contains_any(&mut self, columns: &[&str], needle: Option<&str>) -> &mut Self {
        if let Some(needle) = needle {
            if columns.is_empty() {
                return self;
            }
            let parts: Vec<String> = columns
                .iter()
                .map(|c| format!("instr(fold_case({}), fold_case(?)) > 0", c))
                .collect();
            self.clauses.push(format!("({})", parts.join(" OR ")));
            for _ in columns {
                self.values.push(Value::Text(needle.to_string()));
            }
        }
        self
    }

    /// 名称精确匹配（大小写不敏感）
    pub fn equals_name(&mut self, column: &str, value: Option<&str>) -> &mut Self {
        if let Some(value) = value {
            self.clauses.push(format!("fold_case({}) = fold_case(?)", column));
            self.values.push(Value::Text(value.to_string()));
        }
        self
    }

    /// 同一天
    pub fn on_date(&mut self, column: &str, date: Option<NaiveDate>) -> &mut Self {
        if let Some(date) = date {
            self.clauses.push(format!("date({}) = ?", column));
            self.values.push(Value::Text(date.format(DATE_FORMAT).to_string()));
        }
        self
    }

    /// 生成 ` WHERE ...` 片段；无条件时为空串
    pub fn sql(&self) -> String {
        if self.clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.clauses.join(" AND "))
        }
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }
}

// ==========================================
// 分页查询
// ==========================================

/// 分页查询
///
/// # 参数
/// - `select`: SELECT 列表
/// - `from`: FROM 子句（含 JOIN）
/// - `order_by`: 排序列（保证分页稳定）
/// - `filter`: 过滤条件
/// - `page`: 规范化后的分页请求
/// - `map`: 行映射
pub fn fetch_page<T, F>(
    conn: &Connection,
    select: &str,
    from: &str,
    order_by: &str,
    filter: &WhereBuilder,
    page: &PageRequest,
    map: F,
) -> RepositoryResult<Pagination<T>>
where
    F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
{
    let where_sql = filter.sql();

    let total: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM {}{}", from, where_sql),
        params_from_iter(filter.values()),
        |row| row.get(0),
    )?;

    let sql = format!(
        "SELECT {} FROM {}{} ORDER BY {} LIMIT ? OFFSET ?",
        select, from, where_sql, order_by
    );
    let mut values = filter.values().to_vec();
    values.push(Value::Integer(page.size));
    values.push(Value::Integer(page.offset()));

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params_from_iter(values.iter()), map)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(page.into_page(rows, total))
}

/// 查询全部行
pub fn fetch_all<T, F>(conn: &Connection, sql: &str, map: F) -> RepositoryResult<Vec<T>>
where
    F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
{
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map([], map)?.collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ==========================================
// 名称查找 / 唯一性
// ==========================================

/// 按列值查找 id（大小写不敏感）
pub fn find_id_by(
    conn: &Connection,
    table: &str,
    column: &str,
    value: &str,
) -> RepositoryResult<Option<i64>> {
    let sql = format!(
        "SELECT id FROM {} WHERE fold_case({}) = fold_case(?1) ORDER BY id LIMIT 1",
        table, column
    );
    let id = conn
        .query_row(&sql, params![value.trim()], |row| row.get(0))
        .optional()?;
    Ok(id)
}

/// 其他记录是否已使用该值（大小写不敏感）
///
/// `exclude_id` 为当前记录 id；新增时传 0
pub fn value_taken(
    conn: &Connection,
    table: &str,
    column: &str,
    value: &str,
    exclude_id: i64,
) -> RepositoryResult<bool> {
    let sql = format!(
        "SELECT EXISTS(SELECT 1 FROM {} WHERE fold_case({}) = fold_case(?1) AND id <> ?2)",
        table, column
    );
    let taken: bool = conn.query_row(&sql, params![value.trim(), exclude_id], |row| row.get(0))?;
    Ok(taken)
}

/// 记录是否存在
pub fn row_exists(conn: &Connection, table: &str, id: i64) -> RepositoryResult<bool> {
    let sql = format!("SELECT EXISTS(SELECT 1 FROM {} WHERE id = ?1)", table);
    let exists: bool = conn.query_row(&sql, params![id], |row| row.get(0))?;
    Ok(exists)
}

/// 去重后的日期列表（YYYY-MM-DD，升序）
pub fn distinct_dates(conn: &Connection, table: &str, column: &str) -> RepositoryResult<Vec<String>> {
    let sql = format!(
        "SELECT DISTINCT date({col}) FROM {table} WHERE date({col}) IS NOT NULL ORDER BY 1",
        col = column,
        table = table
    );
    fetch_all(conn, &sql, |row| row.get(0))
}

// ==========================================
// 金额列
// ==========================================

/// 读取金额列（TEXT）
pub fn decimal_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Decimal> {
    let raw: String = row.get(idx)?;
    Decimal::from_str(raw.trim())
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// 金额写入格式：两位小数，四舍五入
pub fn decimal_to_sql(value: &Decimal) -> String {
    value
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::configure_sqlite_connection;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        conn.execute_batch(
            "CREATE TABLE items (id INTEGER PRIMARY KEY, name TEXT NOT NULL, made TEXT NOT NULL);
             INSERT INTO items (name, made) VALUES
               ('Bolt', '2024-05-01T08:00:00'),
               ('Big Bolt', '2024-05-01T17:30:00'),
               ('Nut', '2024-05-02T00:00:00'),
               ('Washer', '2024-05-03T00:00:00'),
               ('bolt cutter', '2024-05-03T00:00:00'),
               ('Äpfel', '2024-05-04T00:00:00');",
        )
        .unwrap();
        conn
    }

    fn page(index: i64, size: i64) -> PageRequest {
        PageRequest { index, size }
    }

    #[test]
    fn test_where_builder_空条件() {
        let w = WhereBuilder::new();
        assert_eq!(w.sql(), "");
        assert!(w.values().is_empty());
    }

    #[test]
    fn test_where_builder_组合条件() {
        let mut w = WhereBuilder::new();
        w.contains_any(&["a", "b"], Some("x"))
            .equals_name("c", None)
            .on_date("d", NaiveDate::from_ymd_opt(2024, 5, 1));
        assert_eq!(
            w.sql(),
            " WHERE (instr(fold_case(a), fold_case(?)) > 0 OR instr(fold_case(b), fold_case(?)) > 0) AND date(d) = ?"
        );
        assert_eq!(w.values().len(), 3);
    }

    #[test]
    fn test_fetch_page_过滤与分页() {
        let conn = setup();
        let mut w = WhereBuilder::new();
        w.contains_any(&["name"], Some("BOLT"));

        let p = fetch_page(&conn, "name", "items", "id", &w, &page(1, 2), |r| r.get::<_, String>(0))
            .unwrap();
        assert_eq!(p.data_list, vec!["Bolt", "Big Bolt"]);
        assert_eq!(p.total_pages, 2);

        let p = fetch_page(&conn, "name", "items", "id", &w, &page(2, 2), |r| r.get::<_, String>(0))
            .unwrap();
        assert_eq!(p.data_list, vec!["bolt cutter"]);

        let p = fetch_page(&conn, "name", "items", "id", &w, &page(5, 2), |r| r.get::<_, String>(0))
            .unwrap();
        assert!(p.data_list.is_empty());
        assert_eq!(p.total_pages, 2);
    }

    #[test]
    fn test_fetch_page_按日期过滤() {
        let conn = setup();
        let mut w = WhereBuilder::new();
        w.on_date("made", NaiveDate::from_ymd_opt(2024, 5, 1));
        let p = fetch_page(&conn, "name", "items", "id", &w, &page(1, 10), |r| r.get::<_, String>(0))
            .unwrap();
        assert_eq!(p.data_list.len(), 2);
    }

    #[test]
    fn test_find_and_taken_大小写不敏感() {
        let conn = setup();
        assert_eq!(find_id_by(&conn, "items", "name", "NUT").unwrap(), Some(3));
        assert_eq!(find_id_by(&conn, "items", "name", "screw").unwrap(), None);

        assert!(value_taken(&conn, "items", "name", "washer", 0).unwrap());
        assert!(!value_taken(&conn, "items", "name", "washer", 4).unwrap());
    }

    #[test]
    fn test_find_and_taken_非ascii() {
        let conn = setup();
        assert_eq!(find_id_by(&conn, "items", "name", "äPFEL").unwrap(), Some(6));
        assert!(value_taken(&conn, "items", "name", "ÄPFEL", 0).unwrap());

        let mut w = WhereBuilder::new();
        w.contains_any(&["name"], Some("PF"));
        let p = fetch_page(&conn, "name", "items", "id", &w, &page(1, 10), |r| r.get::<_, String>(0))
            .unwrap();
        assert_eq!(p.data_list, vec!["Äpfel"]);
    }

    #[test]
    fn test_distinct_dates() {
        let conn = setup();
        assert_eq!(
            distinct_dates(&conn, "items", "made").unwrap(),
            vec!["2024-05-01", "2024-05-02", "2024-05-03", "2024-05-04"]
        );
    }

    #[test]
    fn test_decimal_to_sql() {
        assert_eq!(decimal_to_sql(&Decimal::new(12345, 3)), "12.35");
        assert_eq!(decimal_to_sql(&Decimal::new(5, 0)), "5");
    }
}
