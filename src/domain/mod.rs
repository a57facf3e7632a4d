// ==========================================
// 工厂管理系统 - 领域层
// ==========================================
// 对外传输结构（DTO）、过滤条件、分页与校验结果
// ==========================================

pub mod category;
pub mod dates;
pub mod filter;
pub mod material;
pub mod order;
pub mod pagination;
pub mod partner;
pub mod product;
pub mod production;
pub mod purchase;
pub mod types;
pub mod validation;

pub use category::CategoryDto;
pub use filter::{CatalogFilter, OrderFilter, ProductionFilter, PurchaseFilter, TextFilter};
pub use material::MaterialDto;
pub use order::{OrderDetailDto, OrderDto};
pub use pagination::{PageQuery, PageRequest, Pagination, PaginationSettings};
pub use partner::{CustomerDto, PartnerDto, PartnerKind, SupplierDto};
pub use product::{ProductDetailDto, ProductDto};
pub use production::ProductionDto;
pub use purchase::{PurchaseDetailDto, PurchaseDto};
pub use types::StockKind;
pub use validation::FieldErrors;

/// 带主键的传输结构
pub trait Identified {
    fn id(&self) -> i64;

    /// 新增时清零，修改时由路径或请求体给定
    fn set_id(&mut self, id: i64);
}
