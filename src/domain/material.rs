// ==========================================
// 工厂管理系统 - 物料
// ==========================================

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Identified;

/// 物料
///
/// quantity 为库存计数器，只由采购/生产单据维护；写入时忽略该字段
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MaterialDto {
    pub id: i64,
    pub name: String,
    pub category_name: String,
    pub quantity: i64,
    pub price: Decimal,
}

impl Identified for MaterialDto {
    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }
}
