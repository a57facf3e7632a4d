// ==========================================
// 工厂管理系统 - 生产记录
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::Identified;

/// 生产记录：产出 qty 个产品，按物料清单扣减物料
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionDto {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub code: String,
    #[serde(with = "crate::domain::dates::iso_datetime")]
    pub production_date: NaiveDateTime,
    #[serde(default)]
    pub product_name: String,
    #[serde(default)]
    pub qty: i64,
}

impl Identified for ProductionDto {
    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }
}
