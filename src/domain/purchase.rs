// ==========================================
// 工厂管理系统 - 采购单
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::Identified;

/// 采购单
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseDto {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub code: String,
    #[serde(with = "crate::domain::dates::iso_datetime")]
    pub purchase_date: NaiveDateTime,
    #[serde(default)]
    pub supplier_name: String,
    #[serde(default)]
    pub purchase_detail_list: Vec<PurchaseDetailDto>,
}

/// 采购行
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PurchaseDetailDto {
    pub id: i64,
    pub purchase_code: String,
    pub material_name: String,
    pub qty: i64,
}

impl Identified for PurchaseDto {
    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }
}
