// ==========================================
// 工厂管理系统 - 库存记账
// ==========================================
// 订单 / 采购 / 生产单据对产品、物料库存的影响先记入 StockLedger，
// 撤销旧单据与应用新单据的增减量合并为净变动后一次性落库：
// - 校验阶段: shortfalls() 预演，找出会变为负数的计数器
// - 执行阶段: apply() 逐项更新，任何负数都会中止（由工作单元整体回滚）
// ==========================================

use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;

use crate::domain::types::StockKind;
use crate::repository::error::{RepositoryError, RepositoryResult};

/// 过账方向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Posting {
    /// 应用单据
    Apply,
    /// 撤销单据
    Reverse,
}

impl Posting {
    fn sign(self) -> i64 {
        match self {
            Posting::Apply => 1,
            Posting::Reverse => -1,
        }
    }
}

/// 库存净变动
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StockLedger {
    deltas: BTreeMap<(StockKind, i64), i64>,
}

impl StockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// 入库
    pub fn credit(&mut self, kind: StockKind, id: i64, qty: i64) {
        let entry = self.deltas.entry((kind, id)).or_insert(0);
        *entry = entry.saturating_add(qty);
    }

    /// 出库
    pub fn debit(&mut self, kind: StockKind, id: i64, qty: i64) {
        self.credit(kind, id, qty.saturating_neg());
    }

    /// 按方向过账：Apply 入库 / Reverse 出库
    pub fn post(&mut self, kind: StockKind, id: i64, qty: i64, posting: Posting) {
        self.credit(kind, id, qty.saturating_mul(posting.sign()));
    }

    pub fn delta(&self, kind: StockKind, id: i64) -> i64 {
        self.deltas.get(&(kind, id)).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.deltas.values().all(|d| *d == 0)
    }

    fn changes(&self) -> impl Iterator<Item = (StockKind, i64, i64)> + '_ {
        self.deltas
            .iter()
            .filter(|(_, delta)| **delta != 0)
            .map(|((kind, id), delta)| (*kind, *id, *delta))
    }
}

/// 库存缺口
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shortfall {
    pub kind: StockKind,
    pub id: i64,
    pub name: String,
    pub available: i64,
    pub requested: i64,
}

impl From<Shortfall> for RepositoryError {
    fn from(s: Shortfall) -> Self {
        RepositoryError::InsufficientStock {
            entity: s.kind.entity_name().to_string(),
            name: s.name,
            available: s.available,
            requested: s.requested,
        }
    }
}

/// 物料清单行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BomLine {
    pub material_id: i64,
    pub material_name: String,
    pub qty_per_unit: i64,
}

// ==========================================
// Inventory - 库存计数器读写
// ==========================================
pub struct Inventory<'c> {
    conn: &'c Connection,
}

impl<'c> Inventory<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    /// 读取库存（名称, 数量）；记录不存在时返回 NotFound
    pub fn stock_of(&self, kind: StockKind, id: i64) -> RepositoryResult<(String, i64)> {
        let sql = format!("SELECT name, quantity FROM {} WHERE id = ?1", kind.table());
        self.conn
            .query_row(&sql, params![id], |row| Ok((row.get(0)?, row.get(1)?)))
            .optional()?
            .ok_or_else(|| RepositoryError::not_found(kind.entity_name(), id))
    }

    /// 产品的物料清单
    pub fn bill_of_materials(&self, product_id: i64) -> RepositoryResult<Vec<BomLine>> {
        let mut stmt = self.conn.prepare(
            "SELECT pd.material_id, m.name, pd.qty_material
             FROM product_details pd
             JOIN materials m ON m.id = pd.material_id
             WHERE pd.product_id = ?1
             ORDER BY pd.id",
        )?;
        let lines = stmt
            .query_map(params![product_id], |row| {
                Ok(BomLine {
                    material_id: row.get(0)?,
                    material_name: row.get(1)?,
                    qty_per_unit: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(lines)
    }

    /// 生产过账：产品 +qty，清单内每种物料 -qty×单耗（Reverse 时相反）
    pub fn post_production(
        &self,
        ledger: &mut StockLedger,
        product_id: i64,
        qty: i64,
        posting: Posting,
    ) -> RepositoryResult<()> {
        ledger.post(StockKind::Product, product_id, qty, posting);
        for line in self.bill_of_materials(product_id)? {
            let consumed = qty.saturating_mul(line.qty_per_unit);
            ledger.post(StockKind::Material, line.material_id, consumed.saturating_neg(), posting);
        }
        Ok(())
    }

    /// 预演：列出应用后会变为负数的计数器
    pub fn shortfalls(&self, ledger: &StockLedger) -> RepositoryResult<Vec<Shortfall>> {
        let mut result = Vec::new();
        for (kind, id, delta) in ledger.changes() {
            if delta >= 0 {
                continue;
            }
            let (name, available) = self.stock_of(kind, id)?;
            let requested = delta.saturating_neg();
            if available < requested {
                result.push(Shortfall {
                    kind,
                    id,
                    name,
                    available,
                    requested,
                });
            }
        }
        Ok(result)
    }

    /// 落库：先整体预演，任一计数器不足时一项都不改
    pub fn apply(&self, ledger: &StockLedger) -> RepositoryResult<()> {
        if let Some(shortfall) = self.shortfalls(ledger)?.into_iter().next() {
            return Err(shortfall.into());
        }
        for (kind, id, delta) in ledger.changes() {
            self.adjust(kind, id, delta)?;
        }
        Ok(())
    }

    /// 单个计数器增减；结果为负时拒绝
    pub fn adjust(&self, kind: StockKind, id: i64, delta: i64) -> RepositoryResult<i64> {
        let (name, available) = self.stock_of(kind, id)?;
        let next = available.saturating_add(delta);
        if next < 0 {
            return Err(Shortfall {
                kind,
                id,
                name,
                available,
                requested: delta.saturating_neg(),
            }
            .into());
        }

        let sql = format!("UPDATE {} SET quantity = ?1 WHERE id = ?2", kind.table());
        self.conn.execute(&sql, params![next, id])?;

        tracing::debug!(entity = %kind, id, delta, quantity = next, "库存已调整");
        Ok(next)
    }
}
