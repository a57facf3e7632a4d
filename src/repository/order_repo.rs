// ==========================================
// 工厂管理系统 - 销售订单仓储
// ==========================================
// 库存规则:
// - 新建: 每行 产品库存 -= qty
// - 删除: 每行 产品库存 += qty
// - 修改: 先撤销旧行，再应用新行（合并为净变动）
// 订单行随订单整体替换：先删后插
// ==========================================

use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::domain::dates::{format_datetime, parse_filter_date};
use crate::domain::filter::{non_empty, OrderFilter};
use crate::domain::order::{OrderDetailDto, OrderDto};
use crate::domain::pagination::{PageRequest, Pagination};
use crate::domain::types::StockKind;
use crate::domain::validation::FieldErrors;
use crate::i18n::{t, t_with_args};
use crate::repository::common::{
    distinct_dates, fetch_page, find_id_by, row_exists, value_taken, WhereBuilder,
};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::inventory::{Inventory, StockLedger};
use crate::repository::CrudRepository;

const ENTITY: &str = "Order";
const SELECT: &str = "o.id, o.code, o.order_date, c.name";
const FROM: &str = "orders o JOIN customers c ON c.id = o.customer_id";

/// 已解析的订单行（产品 id, 数量）
type ResolvedLine = (i64, i64);

pub struct OrderRepository<'c> {
    conn: &'c Connection,
}

impl<'c> OrderRepository<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<OrderDto> {
        Ok(OrderDto {
            id: row.get(0)?,
            code: row.get(1)?,
            order_date: row.get(2)?,
            customer_name: row.get(3)?,
            order_details_list: Vec::new(),
        })
    }

    /// 读取订单行
    pub fn load_details(&self, order_id: i64) -> RepositoryResult<Vec<OrderDetailDto>> {
        let mut stmt = self.conn.prepare(
            "SELECT od.id, o.code, p.name, od.qty
             FROM order_details od
             JOIN orders o ON o.id = od.order_id
             JOIN products p ON p.id = od.product_id
             WHERE od.order_id = ?1
             ORDER BY od.id",
        )?;
        let details = stmt
            .query_map(params![order_id], |row| {
                Ok(OrderDetailDto {
                    id: row.get(0)?,
                    order_code: row.get(1)?,
                    product_name: row.get(2)?,
                    qty: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(details)
    }

    fn with_details(&self, mut dto: OrderDto) -> RepositoryResult<OrderDto> {
        dto.order_details_list = self.load_details(dto.id)?;
        Ok(dto)
    }

    /// 已落库的订单行
    fn stored_lines(&self, order_id: i64) -> RepositoryResult<Vec<ResolvedLine>> {
        let mut stmt = self
            .conn
            .prepare("SELECT product_id, qty FROM order_details WHERE order_id = ?1 ORDER BY id")?;
        let lines = stmt
            .query_map(params![order_id], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(lines)
    }

    fn resolve_lines(&self, details: &[OrderDetailDto]) -> RepositoryResult<Vec<ResolvedLine>> {
        details
            .iter()
            .map(|d| {
                let product_id = find_id_by(self.conn, "products", "name", &d.product_name)?
                    .ok_or_else(|| {
                        RepositoryError::unknown_reference("OrderDetailsList", "Product", &d.product_name)
                    })?;
                Ok((product_id, d.qty))
            })
            .collect()
    }

    fn require_customer(&self, name: &str) -> RepositoryResult<i64> {
        find_id_by(self.conn, "customers", "name", name)?
            .ok_or_else(|| RepositoryError::unknown_reference("CustomerName", "Customer", name))
    }

    fn insert_lines(&self, order_id: i64, lines: &[ResolvedLine]) -> RepositoryResult<()> {
        let mut stmt = self
            .conn
            .prepare("INSERT INTO order_details (order_id, product_id, qty) VALUES (?1, ?2, ?3)")?;
        for (product_id, qty) in lines {
            stmt.execute(params![order_id, product_id, qty])?;
        }
        Ok(())
    }

    /// 库存净变动：撤销旧行 + 应用新行
    fn ledger_for(old: &[ResolvedLine], new: &[ResolvedLine]) -> StockLedger {
        let mut ledger = StockLedger::new();
        for (product_id, qty) in old {
            ledger.credit(StockKind::Product, *product_id, *qty);
        }
        for (product_id, qty) in new {
            ledger.debit(StockKind::Product, *product_id, *qty);
        }
        ledger
    }

    /// 去重后的下单日期
    pub fn distinct_dates(&self) -> RepositoryResult<Vec<String>> {
        distinct_dates(self.conn, "orders", "order_date")
    }
}

impl CrudRepository for OrderRepository<'_> {
    type Dto = OrderDto;
    type Filter = OrderFilter;

    fn entity_name(&self) -> &'static str {
        ENTITY
    }

    fn list_paginated(
        &self,
        filter: &OrderFilter,
        page: &PageRequest,
    ) -> RepositoryResult<Pagination<OrderDto>> {
        let date = match non_empty(&filter.string_date) {
            Some(raw) => Some(parse_filter_date(raw).ok_or_else(|| RepositoryError::FieldValueError {
                field: "StringDate".to_string(),
                message: t_with_args("validation.invalid_date", &[("value", raw)]),
            })?),
            None => None,
        };

        let mut w = WhereBuilder::new();
        w.contains_any(&["o.code"], non_empty(&filter.search_text))
            .on_date("o.order_date", date)
            .equals_name("c.name", non_empty(&filter.customer));
        let mut result = fetch_page(self.conn, SELECT, FROM, "o.id", &w, page, Self::map_row)?;
        for dto in result.data_list.iter_mut() {
            dto.order_details_list = self.load_details(dto.id)?;
        }
        Ok(result)
    }

    fn get_by_id(&self, id: i64) -> RepositoryResult<Option<OrderDto>> {
        let sql = format!("SELECT {} FROM {} WHERE o.id = ?1", SELECT, FROM);
        let dto = self
            .conn
            .query_row(&sql, params![id], Self::map_row)
            .optional()?;
        dto.map(|d| self.with_details(d)).transpose()
    }

    fn get_all(&self) -> RepositoryResult<Vec<OrderDto>> {
        let sql = format!("SELECT {} FROM {} ORDER BY o.id", SELECT, FROM);
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], Self::map_row)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(|d| self.with_details(d)).collect()
    }

    fn exists(&self, id: i64) -> RepositoryResult<bool> {
        row_exists(self.conn, "orders", id)
    }

    fn validate(&self, dto: &OrderDto) -> RepositoryResult<FieldErrors> {
        let mut errors = FieldErrors::new();

        if errors.require("Code", &dto.code)
            && value_taken(self.conn, "orders", "code", &dto.code, dto.id.max(0))?
        {
            errors.add_duplicate(ENTITY, "Code");
        }

        if errors.require("CustomerName", &dto.customer_name)
            && find_id_by(self.conn, "customers", "name", &dto.customer_name)?.is_none()
        {
            errors.add_unknown_reference("CustomerName", "Customer", dto.customer_name.trim());
        }

        if dto.order_details_list.is_empty() {
            errors.add(
                "OrderDetailsList",
                t_with_args("validation.details_empty", &[("entity", ENTITY)]),
            );
            return Ok(errors);
        }

        let mut new_lines = Vec::with_capacity(dto.order_details_list.len());
        for detail in &dto.order_details_list {
            match find_id_by(self.conn, "products", "name", &detail.product_name)? {
                None => errors.add_unknown_reference(
                    "OrderDetailsList",
                    "Product",
                    detail.product_name.trim(),
                ),
                Some(_) if detail.qty <= 0 => {
                    errors.add("OrderDetailsList", t("validation.quantity_positive"))
                }
                Some(product_id) => new_lines.push((product_id, detail.qty)),
            }
        }
        if errors.contains("OrderDetailsList") {
            return Ok(errors);
        }

        // 修改时旧订单占用的数量视为可用
        let old_lines = if dto.id > 0 {
            self.stored_lines(dto.id)?
        } else {
            Vec::new()
        };
        let ledger = Self::ledger_for(&old_lines, &new_lines);
        if !Inventory::new(self.conn).shortfalls(&ledger)?.is_empty() {
            errors.add("OrderDetailsList", t("validation.order_stock"));
        }

        Ok(errors)
    }

    fn create(&self, dto: &OrderDto) -> RepositoryResult<i64> {
        let customer_id = self.require_customer(&dto.customer_name)?;
        let lines = self.resolve_lines(&dto.order_details_list)?;
        Inventory::new(self.conn).apply(&Self::ledger_for(&[], &lines))?;

        self.conn.execute(
            "INSERT INTO orders (code, order_date, customer_id) VALUES (?1, ?2, ?3)",
            params![dto.code.trim(), format_datetime(&dto.order_date), customer_id],
        )?;
        let id = self.conn.last_insert_rowid();
        self.insert_lines(id, &lines)?;
        Ok(id)
    }

    fn edit(&self, dto: &OrderDto) -> RepositoryResult<()> {
        if !self.exists(dto.id)? {
            return Err(RepositoryError::not_found(ENTITY, dto.id));
        }
        let customer_id = self.require_customer(&dto.customer_name)?;
        let new_lines = self.resolve_lines(&dto.order_details_list)?;
        let old_lines = self.stored_lines(dto.id)?;
        Inventory::new(self.conn).apply(&Self::ledger_for(&old_lines, &new_lines))?;

        self.conn.execute(
            "UPDATE orders SET code = ?1, order_date = ?2, customer_id = ?3 WHERE id = ?4",
            params![
                dto.code.trim(),
                format_datetime(&dto.order_date),
                customer_id,
                dto.id
            ],
        )?;
        self.conn
            .execute("DELETE FROM order_details WHERE order_id = ?1", params![dto.id])?;
        self.insert_lines(dto.id, &new_lines)
    }

    fn delete(&self, id: i64) -> RepositoryResult<()> {
        if !self.exists(id)? {
            return Err(RepositoryError::not_found(ENTITY, id));
        }
        let old_lines = self.stored_lines(id)?;
        Inventory::new(self.conn).apply(&Self::ledger_for(&old_lines, &[]))?;

        self.conn
            .execute("DELETE FROM orders WHERE id = ?1", params![id])?;
        Ok(())
    }
}
