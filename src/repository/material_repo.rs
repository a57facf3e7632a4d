// ==========================================
// 工厂管理系统 - 物料仓储
// ==========================================
// 新建物料库存为 0；修改不触碰库存（库存只由采购/生产维护）
// ==========================================

use rusqlite::{params, Connection, OptionalExtension, Row};
use rust_decimal::Decimal;

use crate::domain::filter::{non_empty, CatalogFilter};
use crate::domain::material::MaterialDto;
use crate::domain::pagination::{PageRequest, Pagination};
use crate::domain::validation::FieldErrors;
use crate::i18n::t;
use crate::repository::common::{
    decimal_column, decimal_to_sql, fetch_all, fetch_page, find_id_by, row_exists, value_taken,
    WhereBuilder,
};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::CrudRepository;

const ENTITY: &str = "Material";
const SELECT: &str = "m.id, m.name, c.name, m.quantity, m.price";
const FROM: &str = "materials m JOIN categories c ON c.id = m.category_id";

pub struct MaterialRepository<'c> {
    conn: &'c Connection,
}

impl<'c> MaterialRepository<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<MaterialDto> {
        Ok(MaterialDto {
            id: row.get(0)?,
            name: row.get(1)?,
            category_name: row.get(2)?,
            quantity: row.get(3)?,
            price: decimal_column(row, 4)?,
        })
    }

    fn require_category(&self, name: &str) -> RepositoryResult<i64> {
        find_id_by(self.conn, "categories", "name", name)?
            .ok_or_else(|| RepositoryError::unknown_reference("CategoryName", "Category", name))
    }
}

impl CrudRepository for MaterialRepository<'_> {
    type Dto = MaterialDto;
    type Filter = CatalogFilter;

    fn entity_name(&self) -> &'static str {
        ENTITY
    }

    fn list_paginated(
        &self,
        filter: &CatalogFilter,
        page: &PageRequest,
    ) -> RepositoryResult<Pagination<MaterialDto>> {
        let mut w = WhereBuilder::new();
        w.contains_any(&["m.name"], non_empty(&filter.search_text))
            .equals_name("c.name", non_empty(&filter.category));
        fetch_page(self.conn, SELECT, FROM, "m.id", &w, page, Self::map_row)
    }

    fn get_by_id(&self, id: i64) -> RepositoryResult<Option<MaterialDto>> {
        let sql = format!("SELECT {} FROM {} WHERE m.id = ?1", SELECT, FROM);
        Ok(self
            .conn
            .query_row(&sql, params![id], Self::map_row)
            .optional()?)
    }

    fn get_all(&self) -> RepositoryResult<Vec<MaterialDto>> {
        let sql = format!("SELECT {} FROM {} ORDER BY m.id", SELECT, FROM);
        fetch_all(self.conn, &sql, Self::map_row)
    }

    fn exists(&self, id: i64) -> RepositoryResult<bool> {
        row_exists(self.conn, "materials", id)
    }

    fn validate(&self, dto: &MaterialDto) -> RepositoryResult<FieldErrors> {
        let mut errors = FieldErrors::new();

        if errors.require("Name", &dto.name)
            && value_taken(self.conn, "materials", "name", &dto.name, dto.id.max(0))?
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

        Ok(errors)
    }

    fn create(&self, dto: &MaterialDto) -> RepositoryResult<i64> {
        let category_id = self.require_category(&dto.category_name)?;
        self.conn.execute(
            "INSERT INTO materials (category_id, name, quantity, price) VALUES (?1, ?2, 0, ?3)",
            params![category_id, dto.name.trim(), decimal_to_sql(&dto.price)],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn edit(&self, dto: &MaterialDto) -> RepositoryResult<()> {
        let category_id = self.require_category(&dto.category_name)?;
        let affected = self.conn.execute(
            "UPDATE materials SET category_id = ?1, name = ?2, price = ?3 WHERE id = ?4",
            params![category_id, dto.name.trim(), decimal_to_sql(&dto.price), dto.id],
        )?;
        if affected == 0 {
            return Err(RepositoryError::not_found(ENTITY, dto.id));
        }
        Ok(())
    }

    fn delete(&self, id: i64) -> RepositoryResult<()> {
        let affected = self
            .conn
            .execute("DELETE FROM materials WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(RepositoryError::not_found(ENTITY, id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{quantity_of, seed_category, setup_test_db};

    fn material(id: i64, name: &str, category: &str, price: Decimal) -> MaterialDto {
        MaterialDto {
            id,
            name: name.to_string(),
            category_name: category.to_string(),
            quantity: 999,
            price,
        }
    }

    #[test]
    fn test_create_库存为零且价格两位小数() {
        let conn = setup_test_db();
        seed_category(&conn, "Parts");
        let repo = MaterialRepository::new(&conn);

        let id = repo
            .create(&material(0, "Bolt", "parts", Decimal::new(12345, 3)))
            .unwrap();
        let loaded = repo.get_by_id(id).unwrap().unwrap();
        assert_eq!(loaded.quantity, 0);
        assert_eq!(loaded.price, Decimal::new(1235, 2));
        assert_eq!(loaded.category_name, "Parts");
    }

    #[test]
    fn test_edit_不修改库存() {
        let conn = setup_test_db();
        seed_category(&conn, "Parts");
        seed_category(&conn, "Metal");
        let repo = MaterialRepository::new(&conn);
        let id = repo
            .create(&material(0, "Bolt", "Parts", Decimal::ONE))
            .unwrap();
        conn.execute("UPDATE materials SET quantity = 7 WHERE id = ?1", params![id])
            .unwrap();

        repo.edit(&material(id, "Steel bolt", "Metal", Decimal::TWO))
            .unwrap();
        let loaded = repo.get_by_id(id).unwrap().unwrap();
        assert_eq!(loaded.name, "Steel bolt");
        assert_eq!(loaded.category_name, "Metal");
        assert_eq!(quantity_of(&conn, "materials", id), 7);
    }

    #[test]
    fn test_validate() {
        let conn = setup_test_db();
        seed_category(&conn, "Parts");
        let repo = MaterialRepository::new(&conn);
        let id = repo
            .create(&material(0, "Bolt", "Parts", Decimal::ONE))
            .unwrap();

        let errors = repo
            .validate(&material(0, "BOLT", "Nowhere", Decimal::ZERO))
            .unwrap();
        assert!(errors.contains("Name"));
        assert!(errors.contains("Price"));
        assert!(errors.contains("CategoryName"));

        let errors = repo
            .validate(&material(id, "Bolt", "Parts", Decimal::ONE))
            .unwrap();
        assert!(errors.is_empty());
    }

    #[test]
    fn test_list_paginated_按类别过滤() {
        let conn = setup_test_db();
        seed_category(&conn, "Parts");
        seed_category(&conn, "Metal");
        let repo = MaterialRepository::new(&conn);
        repo.create(&material(0, "Bolt", "Parts", Decimal::ONE)).unwrap();
        repo.create(&material(0, "Nut", "Parts", Decimal::ONE)).unwrap();
        repo.create(&material(0, "Steel sheet", "Metal", Decimal::ONE)).unwrap();

        let page = repo
            .list_paginated(
                &CatalogFilter {
                    search_text: None,
                    category: Some("PARTS".to_string()),
                },
                &PageRequest::default(),
            )
            .unwrap();
        assert_eq!(page.data_list.len(), 2);
        assert_eq!(page.total_pages, 1);

        let page = repo
            .list_paginated(
                &CatalogFilter {
                    search_text: Some("t".to_string()),
                    category: Some("Parts".to_string()),
                },
                &PageRequest::default(),
            )
            .unwrap();
        let names: Vec<_> = page.data_list.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Bolt", "Nut"]);
    }

    #[test]
    fn test_create_类别不存在() {
        let conn = setup_test_db();
        let repo = MaterialRepository::new(&conn);
        let err = repo
            .create(&material(0, "Bolt", "Ghost", Decimal::ONE))
            .unwrap_err();
        assert!(matches!(err, RepositoryError::FieldValueError { .. }));
    }
}
