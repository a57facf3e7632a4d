// ==========================================
// 工厂管理系统 - 生产记录仓储
// ==========================================
// 库存规则（按产品当前物料清单计算）:
// - 新建: 产品 += qty，清单内每种物料 -= qty × 单耗
// - 删除: 上述变动反向（产品已售出时拒绝）
// - 修改: 撤销旧记录 + 应用新记录
// ==========================================

use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::domain::dates::{format_datetime, parse_filter_date};
use crate::domain::filter::{non_empty, ProductionFilter};
use crate::domain::pagination::{PageRequest, Pagination};
use crate::domain::production::ProductionDto;
use crate::domain::types::StockKind;
use crate::domain::validation::FieldErrors;
use crate::i18n::{t, t_with_args};
use crate::repository::common::{
    distinct_dates, fetch_all, fetch_page, find_id_by, row_exists, value_taken, WhereBuilder,
};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::inventory::{Inventory, Posting, StockLedger};
use crate::repository::CrudRepository;

const ENTITY: &str = "Production";
const SELECT: &str = "pr.id, pr.code, pr.production_date, p.name, pr.qty";
const FROM: &str = "productions pr JOIN products p ON p.id = pr.product_id";

pub struct ProductionRepository<'c> {
    conn: &'c Connection,
}

impl<'c> ProductionRepository<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<ProductionDto> {
        Ok(ProductionDto {
            id: row.get(0)?,
            code: row.get(1)?,
            production_date: row.get(2)?,
            product_name: row.get(3)?,
            qty: row.get(4)?,
        })
    }

    /// 已落库的（产品 id, 数量）
    fn stored_run(&self, id: i64) -> RepositoryResult<Option<(i64, i64)>> {
        Ok(self
            .conn
            .query_row(
                "SELECT product_id, qty FROM productions WHERE id = ?1",
                params![id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?)
    }

    fn require_product(&self, name: &str) -> RepositoryResult<i64> {
        find_id_by(self.conn, "products", "name", name)?
            .ok_or_else(|| RepositoryError::unknown_reference("ProductName", "Product", name))
    }

    /// 库存净变动：撤销旧记录 + 应用新记录
    fn ledger_for(
        &self,
        old: Option<(i64, i64)>,
        new: Option<(i64, i64)>,
    ) -> RepositoryResult<StockLedger> {
        let inventory = Inventory::new(self.conn);
        let mut ledger = StockLedger::new();
        if let Some((product_id, qty)) = old {
            inventory.post_production(&mut ledger, product_id, qty, Posting::Reverse)?;
        }
        if let Some((product_id, qty)) = new {
            inventory.post_production(&mut ledger, product_id, qty, Posting::Apply)?;
        }
        Ok(ledger)
    }

    pub fn distinct_dates(&self) -> RepositoryResult<Vec<String>> {
        distinct_dates(self.conn, "productions", "production_date")
    }
}

impl CrudRepository for ProductionRepository<'_> {
    type Dto = ProductionDto;
    type Filter = ProductionFilter;

    fn entity_name(&self) -> &'static str {
        ENTITY
    }

    fn list_paginated(
        &self,
        filter: &ProductionFilter,
        page: &PageRequest,
    ) -> RepositoryResult<Pagination<ProductionDto>> {
        let date = match non_empty(&filter.string_date) {
            Some(raw) => Some(parse_filter_date(raw).ok_or_else(|| RepositoryError::FieldValueError {
                field: "StringDate".to_string(),
                message: t_with_args("validation.invalid_date", &[("value", raw)]),
            })?),
            None => None,
        };

        let mut w = WhereBuilder::new();
        w.contains_any(&["pr.code"], non_empty(&filter.search_text))
            .on_date("pr.production_date", date)
            .equals_name("p.name", non_empty(&filter.product_name));
        fetch_page(self.conn, SELECT, FROM, "pr.id", &w, page, Self::map_row)
    }

    fn get_by_id(&self, id: i64) -> RepositoryResult<Option<ProductionDto>> {
        let sql = format!("SELECT {} FROM {} WHERE pr.id = ?1", SELECT, FROM);
        Ok(self
            .conn
            .query_row(&sql, params![id], Self::map_row)
            .optional()?)
    }

    fn get_all(&self) -> RepositoryResult<Vec<ProductionDto>> {
        let sql = format!("SELECT {} FROM {} ORDER BY pr.id", SELECT, FROM);
        fetch_all(self.conn, &sql, Self::map_row)
    }

    fn exists(&self, id: i64) -> RepositoryResult<bool> {
        row_exists(self.conn, "productions", id)
    }

    fn validate(&self, dto: &ProductionDto) -> RepositoryResult<FieldErrors> {
        let mut errors = FieldErrors::new();

        if errors.require("Code", &dto.code)
            && value_taken(self.conn, "productions", "code", &dto.code, dto.id.max(0))?
        {
            errors.add_duplicate(ENTITY, "Code");
        }

        let product_id = if errors.require("ProductName", &dto.product_name) {
            let found = find_id_by(self.conn, "products", "name", &dto.product_name)?;
            if found.is_none() {
                errors.add_unknown_reference("ProductName", "Product", dto.product_name.trim());
            }
            found
        } else {
            None
        };

        if dto.qty <= 0 {
            errors.add("Qty", t("validation.quantity_positive"));
            return Ok(errors);
        }
        let Some(product_id) = product_id else {
            return Ok(errors);
        };

        let old = if dto.id > 0 { self.stored_run(dto.id)? } else { None };
        let ledger = self.ledger_for(old, Some((product_id, dto.qty)))?;
        for s in Inventory::new(self.conn).shortfalls(&ledger)? {
            match s.kind {
                StockKind::Material => {
                    errors.add("ProductName", t("validation.production_materials"))
                }
                StockKind::Product => errors.add(
                    "Qty",
                    t_with_args(
                        "validation.insufficient_stock",
                        &[
                            ("name", s.name.as_str()),
                            ("available", &s.available.to_string()),
                            ("requested", &s.requested.to_string()),
                        ],
                    ),
                ),
            }
        }

        Ok(errors)
    }

    fn create(&self, dto: &ProductionDto) -> RepositoryResult<i64> {
        let product_id = self.require_product(&dto.product_name)?;
        let ledger = self.ledger_for(None, Some((product_id, dto.qty)))?;
        Inventory::new(self.conn).apply(&ledger)?;

        self.conn.execute(
            "INSERT INTO productions (code, production_date, product_id, qty) VALUES (?1, ?2, ?3, ?4)",
            params![
                dto.code.trim(),
                format_datetime(&dto.production_date),
                product_id,
                dto.qty
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn edit(&self, dto: &ProductionDto) -> RepositoryResult<()> {
        let old = self
            .stored_run(dto.id)?
            .ok_or_else(|| RepositoryError::not_found(ENTITY, dto.id))?;
        let product_id = self.require_product(&dto.product_name)?;
        let ledger = self.ledger_for(Some(old), Some((product_id, dto.qty)))?;
        Inventory::new(self.conn).apply(&ledger)?;

        self.conn.execute(
            "UPDATE productions SET code = ?1, production_date = ?2, product_id = ?3, qty = ?4
             WHERE id = ?5",
            params![
                dto.code.trim(),
                format_datetime(&dto.production_date),
                product_id,
                dto.qty,
                dto.id
            ],
        )?;
        Ok(())
    }

    fn delete(&self, id: i64) -> RepositoryResult<()> {
        let old = self
            .stored_run(id)?
            .ok_or_else(|| RepositoryError::not_found(ENTITY, id))?;
        let ledger = self.ledger_for(Some(old), None)?;
        Inventory::new(self.conn).apply(&ledger)?;

        self.conn
            .execute("DELETE FROM productions WHERE id = ?1", params![id])?;
        Ok(())
    }
}
