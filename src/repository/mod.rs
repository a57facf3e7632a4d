// ==========================================
// 工厂管理系统 - 数据仓储层
// ==========================================
// 职责: 每个实体一个仓储，提供分页查询 / 增删改 / 校验
// 约束:
// - 所有查询使用参数化，防止 SQL 注入
// - 仓储只持有连接引用，事务边界由 UnitOfWork 统一管理
// ==========================================

pub mod category_repo;
pub mod common;
pub mod error;
pub mod inventory;
pub mod material_repo;
pub mod order_repo;
pub mod partner_repo;
pub mod product_repo;
pub mod production_repo;
pub mod purchase_repo;
pub mod unit_of_work;

#[cfg(test)]
pub(crate) mod test_support;

use crate::domain::pagination::{PageRequest, Pagination};
use crate::domain::validation::FieldErrors;

// 重导出核心仓储
pub use category_repo::CategoryRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use inventory::{Inventory, Posting, StockLedger};
pub use material_repo::MaterialRepository;
pub use order_repo::OrderRepository;
pub use partner_repo::PartnerRepository;
pub use product_repo::ProductRepository;
pub use production_repo::ProductionRepository;
pub use purchase_repo::PurchaseRepository;
pub use unit_of_work::{Database, UnitOfWork};

/// 实体仓储的统一接口
///
/// `validate` 只做检查不落库；`create` / `edit` / `delete` 假定调用方已完成校验，
/// 但引用缺失、库存不足等情况仍以错误返回，由工作单元回滚。
pub trait CrudRepository {
    type Dto;
    type Filter;

    /// 实体名称（用于提示与日志）
    fn entity_name(&self) -> &'static str;

    fn list_paginated(
        &self,
        filter: &Self::Filter,
        page: &PageRequest,
    ) -> RepositoryResult<Pagination<Self::Dto>>;

    fn get_by_id(&self, id: i64) -> RepositoryResult<Option<Self::Dto>>;

    fn get_all(&self) -> RepositoryResult<Vec<Self::Dto>>;

    fn exists(&self, id: i64) -> RepositoryResult<bool>;

    /// 校验；id > 0 视为修改
    fn validate(&self, dto: &Self::Dto) -> RepositoryResult<FieldErrors>;

    /// 新增，返回新 id
    fn create(&self, dto: &Self::Dto) -> RepositoryResult<i64>;

    fn edit(&self, dto: &Self::Dto) -> RepositoryResult<()>;

    fn delete(&self, id: i64) -> RepositoryResult<()>;
}
