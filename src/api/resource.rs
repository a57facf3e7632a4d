// ==========================================
// 工厂管理系统 - HTTP 资源定义
// ==========================================
// 每个实体一个零大小标记类型，绑定:
// - 路径段（/api/{PATH}）
// - 传输结构与过滤条件
// - 从工作单元取得对应仓储
// ==========================================

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::domain::{
    CatalogFilter, CategoryDto, Identified, MaterialDto, OrderDto, OrderFilter, PartnerDto,
    ProductDto, ProductionDto, ProductionFilter, PurchaseDto, PurchaseFilter, TextFilter,
};
use crate::repository::{
    CategoryRepository, CrudRepository, MaterialRepository, OrderRepository, PartnerRepository,
    ProductRepository, ProductionRepository, PurchaseRepository, RepositoryResult, UnitOfWork,
};

/// 可通过 HTTP 增删改查的实体
pub trait Resource: Send + Sync + 'static {
    type Dto: Serialize + DeserializeOwned + Identified + Send + 'static;
    type Filter: DeserializeOwned + Send + 'static;
    type Repo<'a>: CrudRepository<Dto = Self::Dto, Filter = Self::Filter>;

    /// 路径段
    const PATH: &'static str;

    fn repository<'a>(uow: &'a UnitOfWork<'_>) -> Self::Repo<'a>;
}

/// 带日期的单据（订单 / 采购 / 生产），额外提供 /dates
pub trait DatedResource: Resource {
    fn distinct_dates(uow: &UnitOfWork<'_>) -> RepositoryResult<Vec<String>>;
}

pub struct Categories;
pub struct Customers;
pub struct Suppliers;
pub struct Materials;
pub struct Products;
pub struct Orders;
pub struct Purchases;
pub struct Productions;

impl Resource for Categories {
    type Dto = CategoryDto;
    type Filter = TextFilter;
    type Repo<'a> = CategoryRepository<'a>;
    const PATH: &'static str = "categories";

    fn repository<'a>(uow: &'a UnitOfWork<'_>) -> CategoryRepository<'a> {
        uow.categories()
    }
}

impl Resource for Customers {
    type Dto = PartnerDto;
    type Filter = TextFilter;
    type Repo<'a> = PartnerRepository<'a>;
    const PATH: &'static str = "customers";

    fn repository<'a>(uow: &'a UnitOfWork<'_>) -> PartnerRepository<'a> {
        uow.customers()
    }
}

impl Resource for Suppliers {
    type Dto = PartnerDto;
    type Filter = TextFilter;
    type Repo<'a> = PartnerRepository<'a>;
    const PATH: &'static str = "suppliers";

    fn repository<'a>(uow: &'a UnitOfWork<'_>) -> PartnerRepository<'a> {
        uow.suppliers()
    }
}

impl Resource for Materials {
    type Dto = MaterialDto;
    type Filter = CatalogFilter;
    type Repo<'a> = MaterialRepository<'a>;
    const PATH: &'static str = "materials";

    fn repository<'a>(uow: &'a UnitOfWork<'_>) -> MaterialRepository<'a> {
        uow.materials()
    }
}

impl Resource for Products {
    type Dto = ProductDto;
    type Filter = CatalogFilter;
    type Repo<'a> = ProductRepository<'a>;
    const PATH: &'static str = "products";

    fn repository<'a>(uow: &'a UnitOfWork<'_>) -> ProductRepository<'a> {
        uow.products()
    }
}

impl Resource for Orders {
    type Dto = OrderDto;
    type Filter = OrderFilter;
    type Repo<'a> = OrderRepository<'a>;
    const PATH: &'static str = "orders";

    fn repository<'a>(uow: &'a UnitOfWork<'_>) -> OrderRepository<'a> {
        uow.orders()
    }
}

impl DatedResource for Orders {
    fn distinct_dates(uow: &UnitOfWork<'_>) -> RepositoryResult<Vec<String>> {
        uow.orders().distinct_dates()
    }
}

impl Resource for Purchases {
    type Dto = PurchaseDto;
    type Filter = PurchaseFilter;
    type Repo<'a> = PurchaseRepository<'a>;
    const PATH: &'static str = "purchases";

    fn repository<'a>(uow: &'a UnitOfWork<'_>) -> PurchaseRepository<'a> {
        uow.purchases()
    }
}

impl DatedResource for Purchases {
    fn distinct_dates(uow: &UnitOfWork<'_>) -> RepositoryResult<Vec<String>> {
        uow.purchases().distinct_dates()
    }
}

impl Resource for Productions {
    type Dto = ProductionDto;
    type Filter = ProductionFilter;
    type Repo<'a> = ProductionRepository<'a>;
    const PATH: &'static str = "productions";

    fn repository<'a>(uow: &'a UnitOfWork<'_>) -> ProductionRepository<'a> {
        uow.productions()
    }
}

impl DatedResource for Productions {
    fn distinct_dates(uow: &UnitOfWork<'_>) -> RepositoryResult<Vec<String>> {
        uow.productions().distinct_dates()
    }
}
