// ==========================================
// 工厂管理系统 - 产品仓储
// ==========================================
// - 新建产品库存为 0；修改不触碰库存
// - 物料清单（product_details）随产品整体替换：先删后插
// ==========================================

use rusqlite::{params, Connection, OptionalExtension, Row};
use rust_decimal::Decimal;

use crate::domain::filter::{non_empty, CatalogFilter};
use crate::domain::pagination::{PageRequest, Pagination};
use crate::domain::product::{ProductDetailDto, ProductDto};
use crate::domain::validation::FieldErrors;
use crate::i18n::{t, t_with_args};
use crate::repository::common::{
    decimal_column, decimal_to_sql, fetch_page, find_id_by, row_exists, value_taken, WhereBuilder,
};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::CrudRepository;

const ENTITY: &str = "Product";
const SELECT: &str = "p.id, p.name, c.name, p.quantity, p.price";
const FROM: &str = "products p JOIN categories c ON c.id = p.category_id";

pub struct ProductRepository<'c> {
    conn: &'c Connection,
}

impl<'c> ProductRepository<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<ProductDto> {
        Ok(ProductDto {
            id: row.get(0)?,
            name: row.get(1)?,
            category_name: row.get(2)?,
            quantity: row.get(3)?,
            price: decimal_column(row, 4)?,
            product_details_list: Vec::new(),
        })
    }

    /// 读取物料清单
    pub fn load_details(&self, product_id: i64) -> RepositoryResult<Vec<ProductDetailDto>> {
        let mut stmt = self.conn.prepare(
            "SELECT pd.id, p.name, m.name, pd.qty_material
             FROM product_details pd
             JOIN products p ON p.id = pd.product_id
             JOIN materials m ON m.id = pd.material_id
             WHERE pd.product_id = ?1
             ORDER BY pd.id",
        )?;
        let details = stmt
            .query_map(params![product_id], |row| {
                Ok(ProductDetailDto {
                    id: row.get(0)?,
                    product_name: row.get(1)?,
                    material_name: row.get(2)?,
                    quantity: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(details)
    }

    fn with_details(&self, mut dto: ProductDto) -> RepositoryResult<ProductDto> {
        dto.product_details_list = self.load_details(dto.id)?;
        Ok(dto)
    }

    fn require_category(&self, name: &str) -> RepositoryResult<i64> {
        find_id_by(self.conn, "categories", "name", name)?
            .ok_or_else(|| RepositoryError::unknown_reference("CategoryName", "Category", name))
    }

    /// 替换物料清单
    fn replace_details(&self, product_id: i64, details: &[ProductDetailDto]) -> RepositoryResult<()> {
        self.conn.execute(
            "DELETE FROM product_details WHERE product_id = ?1",
            params![product_id],
        )?;

        let mut stmt = self.conn.prepare(
            "INSERT INTO product_details (product_id, material_id, qty_material) VALUES (?1, ?2, ?3)",
        )?;
        for detail in details {
            let material_id = find_id_by(self.conn, "materials", "name", &detail.material_name)?
                .ok_or_else(|| {
                    RepositoryError::unknown_reference(
                        "ProductDetailsList",
                        "Material",
                        &detail.material_name,
                    )
                })?;
            stmt.execute(params![product_id, material_id, detail.quantity])?;
        }
        Ok(())
    }
}

impl CrudRepository for ProductRepository<'_> {
    type Dto = ProductDto;
    type Filter = CatalogFilter;

    fn entity_name(&self) -> &'static str {
        ENTITY
    }

    fn list_paginated(
        &self,
        filter: &CatalogFilter,
        page: &PageRequest,
    ) -> RepositoryResult<Pagination<ProductDto>> {
        let mut w = WhereBuilder::new();
        w.contains_any(&["p.name"], non_empty(&filter.search_text))
            .equals_name("c.name", non_empty(&filter.category));
        let mut result = fetch_page(self.conn, SELECT, FROM, "p.id", &w, page, Self::map_row)?;
        for dto in result.data_list.iter_mut() {
            dto.product_details_list = self.load_details(dto.id)?;
        }
        Ok(result)
    }

    fn get_by_id(&self, id: i64) -> RepositoryResult<Option<ProductDto>> {
        let sql = format!("SELECT {} FROM {} WHERE p.id = ?1", SELECT, FROM);
        let dto = self
            .conn
            .query_row(&sql, params![id], Self::map_row)
            .optional()?;
        dto.map(|d| self.with_details(d)).transpose()
    }

    fn get_all(&self) -> RepositoryResult<Vec<ProductDto>> {
        let sql = format!("SELECT {} FROM {} ORDER BY p.id", SELECT, FROM);
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], Self::map_row)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(|d| self.with_details(d)).collect()
    }

    fn exists(&self, id: i64) -> RepositoryResult<bool> {
        row_exists(self.conn, "products", id)
    }

    fn validate(&self, dto: &ProductDto) -> RepositoryResult<FieldErrors> {
        let mut errors = FieldErrors::new();

        if errors.require("Name", &dto.name)
            && value_taken(self.conn, "products", "name", &dto.name, dto.id.max(0))?
        {
            errors.add_duplicate(ENTITY, "Name");
        }

        if dto.price <= Decimal::ZERO {
            errors.add("Price", t("validation.price_positive"));
        }

        if errors.require("CategoryName", &dto.category_name)
            && find_id_by(self.conn, "categories", "name", &dto.category_name)?.is_none()
        {
            errors.add_unknown_reference("CategoryName", "Category", dto.category_name.trim());
        }

        if dto.product_details_list.is_empty() {
            errors.add(
                "ProductDetailsList",
                t_with_args("validation.details_empty", &[("entity", ENTITY)]),
            );
        }
        for detail in &dto.product_details_list {
            if find_id_by(self.conn, "materials", "name", &detail.material_name)?.is_none() {
                errors.add_unknown_reference(
                    "ProductDetailsList",
                    "Material",
                    detail.material_name.trim(),
                );
            } else if detail.quantity <= 0 {
                errors.add("ProductDetailsList", t("validation.quantity_positive"));
            }
        }

        Ok(errors)
    }

    fn create(&self, dto: &ProductDto) -> RepositoryResult<i64> {
        let category_id = self.require_category(&dto.category_name)?;
        self.conn.execute(
            "INSERT INTO products (category_id, name, quantity, price) VALUES (?1, ?2, 0, ?3)",
            params![category_id, dto.name.trim(), decimal_to_sql(&dto.price)],
        )?;
        let id = self.conn.last_insert_rowid();
        self.replace_details(id, &dto.product_details_list)?;
        Ok(id)
    }

    fn edit(&self, dto: &ProductDto) -> RepositoryResult<()> {
        let category_id = self.require_category(&dto.category_name)?;
        let affected = self.conn.execute(
            "UPDATE products SET category_id = ?1, name = ?2, price = ?3 WHERE id = ?4",
            params![category_id, dto.name.trim(), decimal_to_sql(&dto.price), dto.id],
        )?;
        if affected == 0 {
            return Err(RepositoryError::not_found(ENTITY, dto.id));
        }
        self.replace_details(dto.id, &dto.product_details_list)
    }

    fn delete(&self, id: i64) -> RepositoryResult<()> {
        let affected = self
            .conn
            .execute("DELETE FROM products WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(RepositoryError::not_found(ENTITY, id));
        }
        Ok(())
    }
}
