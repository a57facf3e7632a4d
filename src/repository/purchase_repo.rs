// ==========================================
// 工厂管理系统 - 采购单仓储
// ==========================================
// 库存规则:
// - 新建: 每行 物料库存 += qty
// - 删除: 每行 物料库存 -= qty（已被消耗时拒绝）
// - 修改: 撤销旧行 + 应用新行
// ==========================================

use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::domain::dates::{format_datetime, parse_filter_date};
use crate::domain::filter::{non_empty, PurchaseFilter};
use crate::domain::pagination::{PageRequest, Pagination};
use crate::domain::purchase::{PurchaseDetailDto, PurchaseDto};
use crate::domain::types::StockKind;
use crate::domain::validation::FieldErrors;
use crate::i18n::{t, t_with_args};
use crate::repository::common::{
    distinct_dates, fetch_all, fetch_page, find_id_by, row_exists, value_taken, WhereBuilder,
};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::inventory::{Inventory, StockLedger};
use crate::repository::CrudRepository;

const ENTITY: &str = "Purchase";
const SELECT: &str = "p.id, p.code, p.purchase_date, s.name";
const FROM: &str = "purchases p JOIN suppliers s ON s.id = p.supplier_id";

pub struct PurchaseRepository<'c> {
    conn: &'c Connection,
}

impl<'c> PurchaseRepository<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<PurchaseDto> {
        Ok(PurchaseDto {
            id: row.get(0)?,
            code: row.get(1)?,
            purchase_date: row.get(2)?,
            supplier_name: row.get(3)?,
            purchase_detail_list: Vec::new(),
        })
    }

    pub fn load_details(&self, purchase_id: i64) -> RepositoryResult<Vec<PurchaseDetailDto>> {
        let mut stmt = self.conn.prepare(
            "SELECT pd.id, p.code, m.name, pd.qty
             FROM purchase_details pd
             JOIN purchases p ON p.id = pd.purchase_id
             JOIN materials m ON m.id = pd.material_id
             WHERE pd.purchase_id = ?1
             ORDER BY pd.id",
        )?;
        let details = stmt
            .query_map(params![purchase_id], |row| {
                Ok(PurchaseDetailDto {
                    id: row.get(0)?,
                    purchase_code: row.get(1)?,
                    material_name: row.get(2)?,
                    qty: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(details)
    }

    fn with_details(&self, mut dto: PurchaseDto) -> RepositoryResult<PurchaseDto> {
        dto.purchase_detail_list = self.load_details(dto.id)?;
        Ok(dto)
    }

    fn stored_lines(&self, purchase_id: i64) -> RepositoryResult<Vec<(i64, i64)>> {
        let mut stmt = self.conn.prepare(
            "SELECT material_id, qty FROM purchase_details WHERE purchase_id = ?1 ORDER BY id",
        )?;
        let lines = stmt
            .query_map(params![purchase_id], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(lines)
    }

    fn resolve_lines(&self, details: &[PurchaseDetailDto]) -> RepositoryResult<Vec<(i64, i64)>> {
        details
            .iter()
            .map(|d| {
                let material_id = find_id_by(self.conn, "materials", "name", &d.material_name)?
                    .ok_or_else(|| {
                        RepositoryError::unknown_reference(
                            "PurchaseDetailsList",
                            "Material",
                            &d.material_name,
                        )
                    })?;
                Ok((material_id, d.qty))
            })
            .collect()
    }

    fn require_supplier(&self, name: &str) -> RepositoryResult<i64> {
        find_id_by(self.conn, "suppliers", "name", name)?
            .ok_or_else(|| RepositoryError::unknown_reference("SupplierName", "Supplier", name))
    }

    fn insert_lines(&self, purchase_id: i64, lines: &[(i64, i64)]) -> RepositoryResult<()> {
        let mut stmt = self.conn.prepare(
            "INSERT INTO purchase_details (purchase_id, material_id, qty) VALUES (?1, ?2, ?3)",
        )?;
        for (material_id, qty) in lines {
            stmt.execute(params![purchase_id, material_id, qty])?;
        }
        Ok(())
    }

    fn ledger_for(old: &[(i64, i64)], new: &[(i64, i64)]) -> StockLedger {
        let mut ledger = StockLedger::new();
        for (material_id, qty) in old {
            ledger.debit(StockKind::Material, *material_id, *qty);
        }
        for (material_id, qty) in new {
            ledger.credit(StockKind::Material, *material_id, *qty);
        }
        ledger
    }

    pub fn distinct_dates(&self) -> RepositoryResult<Vec<String>> {
        distinct_dates(self.conn, "purchases", "purchase_date")
    }
}

impl CrudRepository for PurchaseRepository<'_> {
    type Dto = PurchaseDto;
    type Filter = PurchaseFilter;

    fn entity_name(&self) -> &'static str {
        ENTITY
    }

    fn list_paginated(
        &self,
        filter: &PurchaseFilter,
        page: &PageRequest,
    ) -> RepositoryResult<Pagination<PurchaseDto>> {
        let date = match non_empty(&filter.string_date) {
            Some(raw) => Some(parse_filter_date(raw).ok_or_else(|| RepositoryError::FieldValueError {
                field: "StringDate".to_string(),
                message: t_with_args("validation.invalid_date", &[("value", raw)]),
            })?),
            None => None,
        };

        let mut w = WhereBuilder::new();
        w.contains_any(&["p.code"], non_empty(&filter.search_text))
            .on_date("p.purchase_date", date)
            .equals_name("s.name", non_empty(&filter.supplier));
        let mut result = fetch_page(self.conn, SELECT, FROM, "p.id", &w, page, Self::map_row)?;
        for dto in result.data_list.iter_mut() {
            dto.purchase_detail_list = self.load_details(dto.id)?;
        }
        Ok(result)
    }

    fn get_by_id(&self, id: i64) -> RepositoryResult<Option<PurchaseDto>> {
        let sql = format!("SELECT {} FROM {} WHERE p.id = ?1", SELECT, FROM);
        let dto = self
            .conn
            .query_row(&sql, params![id], Self::map_row)
            .optional()?;
        dto.map(|d| self.with_details(d)).transpose()
    }

    fn get_all(&self) -> RepositoryResult<Vec<PurchaseDto>> {
        let sql = format!("SELECT {} FROM {} ORDER BY p.id", SELECT, FROM);
        fetch_all(self.conn, &sql, Self::map_row)?
            .into_iter()
            .map(|d| self.with_details(d))
            .collect()
    }

    fn exists(&self, id: i64) -> RepositoryResult<bool> {
        row_exists(self.conn, "purchases", id)
    }

    fn validate(&self, dto: &PurchaseDto) -> RepositoryResult<FieldErrors> {
        let mut errors = FieldErrors::new();

        if errors.require("Code", &dto.code)
            && value_taken(self.conn, "purchases", "code", &dto.code, dto.id.max(0))?
        {
            errors.add_duplicate(ENTITY, "Code");
        }

        if errors.require("SupplierName", &dto.supplier_name)
            && find_id_by(self.conn, "suppliers", "name", &dto.supplier_name)?.is_none()
        {
            errors.add_unknown_reference("SupplierName", "Supplier", dto.supplier_name.trim());
        }

        if dto.purchase_detail_list.is_empty() {
            errors.add(
                "PurchaseDetailsList",
                t_with_args("validation.details_empty", &[("entity", ENTITY)]),
            );
            return Ok(errors);
        }

        let mut new_lines = Vec::with_capacity(dto.purchase_detail_list.len());
        for detail in &dto.purchase_detail_list {
            match find_id_by(self.conn, "materials", "name", &detail.material_name)? {
                None => errors.add_unknown_reference(
                    "PurchaseDetailsList",
                    "Material",
                    detail.material_name.trim(),
                ),
                Some(_) if detail.qty <= 0 => {
                    errors.add("PurchaseDetailsList", t("validation.quantity_positive"))
                }
                Some(material_id) => new_lines.push((material_id, detail.qty)),
            }
        }
        if errors.contains("PurchaseDetailsList") || dto.id <= 0 {
            return Ok(errors);
        }

        // 修改时减少的数量可能已被生产消耗
        let ledger = Self::ledger_for(&self.stored_lines(dto.id)?, &new_lines);
        if let Some(s) = Inventory::new(self.conn).shortfalls(&ledger)?.into_iter().next() {
            errors.add(
                "PurchaseDetailsList",
                t_with_args(
                    "validation.insufficient_stock",
                    &[
                        ("name", s.name.as_str()),
                        ("available", &s.available.to_string()),
                        ("requested", &s.requested.to_string()),
                    ],
                ),
            );
        }

        Ok(errors)
    }

    fn create(&self, dto: &PurchaseDto) -> RepositoryResult<i64> {
        let supplier_id = self.require_supplier(&dto.supplier_name)?;
        let lines = self.resolve_lines(&dto.purchase_detail_list)?;
        Inventory::new(self.conn).apply(&Self::ledger_for(&[], &lines))?;

        self.conn.execute(
            "INSERT INTO purchases (code, purchase_date, supplier_id) VALUES (?1, ?2, ?3)",
            params![dto.code.trim(), format_datetime(&dto.purchase_date), supplier_id],
        )?;
        let id = self.conn.last_insert_rowid();
        self.insert_lines(id, &lines)?;
        Ok(id)
    }

    fn edit(&self, dto: &PurchaseDto) -> RepositoryResult<()> {
        if !self.exists(dto.id)? {
            return Err(RepositoryError::not_found(ENTITY, dto.id));
        }
        let supplier_id = self.require_supplier(&dto.supplier_name)?;
        let new_lines = self.resolve_lines(&dto.purchase_detail_list)?;
        let old_lines = self.stored_lines(dto.id)?;
        Inventory::new(self.conn).apply(&Self::ledger_for(&old_lines, &new_lines))?;

        self.conn.execute(
            "UPDATE purchases SET code = ?1, purchase_date = ?2, supplier_id = ?3 WHERE id = ?4",
            params![
                dto.code.trim(),
                format_datetime(&dto.purchase_date),
                supplier_id,
                dto.id
            ],
        )?;
        self.conn.execute(
            "DELETE FROM purchase_details WHERE purchase_id = ?1",
            params![dto.id],
        )?;
        self.insert_lines(dto.id, &new_lines)
    }

    fn delete(&self, id: i64) -> RepositoryResult<()> {
        if !self.exists(id)? {
            return Err(RepositoryError::not_found(ENTITY, id));
        }
        let old_lines = self.stored_lines(id)?;
        Inventory::new(self.conn).apply(&Self::ledger_for(&old_lines, &[]))?;

        self.conn
            .execute("DELETE FROM purchases WHERE id = ?1", params![id])?;
        Ok(())
    }
}
