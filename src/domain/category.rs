// ==========================================
// 工厂管理系统 - 类别
// ==========================================

use serde::{Deserialize, Serialize};

use super::Identified;

/// 类别（物料与产品共用）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CategoryDto {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

impl Identified for CategoryDto {
    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }
}
