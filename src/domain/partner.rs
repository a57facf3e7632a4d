// ==========================================
// 工厂管理系统 - 往来单位（客户 / 供应商）
// ==========================================
// 客户与供应商字段完全一致，共用一个结构，
// 通过 PartnerKind 区分落表与提示名称
// ==========================================

use serde::{Deserialize, Serialize};

use super::Identified;

/// 往来单位
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PartnerDto {
    pub id: i64,
    pub name: String,
    pub contact: String,
    pub address: String,
    pub city: String,
    pub postal: String,
    pub phone: String,
    pub email: String,
}

pub type CustomerDto = PartnerDto;
pub type SupplierDto = PartnerDto;

/// 往来单位类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartnerKind {
    Customer,
    Supplier,
}

impl PartnerKind {
    pub fn table(self) -> &'static str {
        match self {
            PartnerKind::Customer => "customers",
            PartnerKind::Supplier => "suppliers",
        }
    }

    pub fn entity_name(self) -> &'static str {
        match self {
            PartnerKind::Customer => "Customer",
            PartnerKind::Supplier => "Supplier",
        }
    }
}

impl Identified for PartnerDto {
    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }
}
