// ==========================================
// 工厂管理系统 - 分页
// ==========================================
// 规则:
// - pageIndex 从 1 开始，< 1 时按 1 处理
// - pageSize < 1 时取配置默认值，超过上限时截断
// - totalPages = ceil(total / pageSize)
// ==========================================

use serde::{Deserialize, Serialize};

/// 默认每页条数（config_kv 未配置时）
pub const DEFAULT_PAGE_SIZE: i64 = 4;

/// 每页条数上限（config_kv 未配置时）
pub const DEFAULT_MAX_PAGE_SIZE: i64 = 100;

/// 分页返回信封
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination<T> {
    pub data_list: Vec<T>,
    pub page_index: i64,
    pub page_size: i64,
    pub total_pages: i64,
}

/// 查询串中的原始分页参数
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageQuery {
    pub page_index: Option<i64>,
    pub page_size: Option<i64>,
}

/// 分页配置（来自 config_kv）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationSettings {
    pub default_page_size: i64,
    pub max_page_size: i64,
}

impl Default for PaginationSettings {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
        }
    }
}

/// 规范化后的分页请求
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub index: i64,
    pub size: i64,
}

impl PageRequest {
    /// 按配置规范化查询参数
    pub fn normalize(query: PageQuery, settings: &PaginationSettings) -> Self {
        let index = query.page_index.filter(|i| *i >= 1).unwrap_or(1);
        let max = settings.max_page_size.max(1);
        let size = query
            .page_size
            .filter(|s| *s >= 1)
            .unwrap_or(settings.default_page_size)
            .clamp(1, max);
        Self { index, size }
    }

    /// SQL OFFSET
    pub fn offset(&self) -> i64 {
        (self.index - 1).saturating_mul(self.size)
    }

    /// ceil(total / size)
    pub fn total_pages(&self, total: i64) -> i64 {
        if total <= 0 {
            return 0;
        }
        (total + self.size - 1) / self.size
    }

    /// 组装分页信封
    pub fn into_page<T>(self, data_list: Vec<T>, total: i64) -> Pagination<T> {
        Pagination {
            data_list,
            page_index: self.index,
            page_size: self.size,
            total_pages: self.total_pages(total),
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::normalize(PageQuery::default(), &PaginationSettings::default())
    }
}
