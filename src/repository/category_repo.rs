// ==========================================
// 工厂管理系统 - 类别仓储
// ==========================================

use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::domain::category::CategoryDto;
use crate::domain::filter::{non_empty, TextFilter};
use crate::domain::pagination::{PageRequest, Pagination};
use crate::domain::validation::FieldErrors;
use crate::repository::common::{fetch_all, fetch_page, row_exists, value_taken, WhereBuilder};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::CrudRepository;

const ENTITY: &str = "Category";
const SELECT: &str = "c.id, c.name, c.description";
const FROM: &str = "categories c";

pub struct CategoryRepository<'c> {
    conn: &'c Connection,
}

impl<'c> CategoryRepository<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<CategoryDto> {
        Ok(CategoryDto {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
        })
    }
}

fn clean_description(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl CrudRepository for CategoryRepository<'_> {
    type Dto = CategoryDto;
    type Filter = TextFilter;

    fn entity_name(&self) -> &'static str {
        ENTITY
    }

    fn list_paginated(
        &self,
        filter: &TextFilter,
        page: &PageRequest,
    ) -> RepositoryResult<Pagination<CategoryDto>> {
        let mut w = WhereBuilder::new();
        w.contains_any(&["c.name"], non_empty(&filter.search_text));
        fetch_page(self.conn, SELECT, FROM, "c.id", &w, page, Self::map_row)
    }

    fn get_by_id(&self, id: i64) -> RepositoryResult<Option<CategoryDto>> {
        let sql = format!("SELECT {} FROM {} WHERE c.id = ?1", SELECT, FROM);
        Ok(self
            .conn
            .query_row(&sql, params![id], Self::map_row)
            .optional()?)
    }

    fn get_all(&self) -> RepositoryResult<Vec<CategoryDto>> {
        let sql = format!("SELECT {} FROM {} ORDER BY c.id", SELECT, FROM);
        fetch_all(self.conn, &sql, Self::map_row)
    }

    fn exists(&self, id: i64) -> RepositoryResult<bool> {
        row_exists(self.conn, "categories", id)
    }

    fn validate(&self, dto: &CategoryDto) -> RepositoryResult<FieldErrors> {
        let mut errors = FieldErrors::new();
        if errors.require("Name", &dto.name)
            && value_taken(self.conn, "categories", "name", &dto.name, dto.id.max(0))?
        {
            errors.add_duplicate(ENTITY, "Name");
        }
        Ok(errors)
    }

    fn create(&self, dto: &CategoryDto) -> RepositoryResult<i64> {
        self.conn.execute(
            "INSERT INTO categories (name, description) VALUES (?1, ?2)",
            params![dto.name.trim(), clean_description(&dto.description)],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn edit(&self, dto: &CategoryDto) -> RepositoryResult<()> {
        let affected = self.conn.execute(
            "UPDATE categories SET name = ?1, description = ?2 WHERE id = ?3",
            params![dto.name.trim(), clean_description(&dto.description), dto.id],
        )?;
        if affected == 0 {
            return Err(RepositoryError::not_found(ENTITY, dto.id));
        }
        Ok(())
    }

    fn delete(&self, id: i64) -> RepositoryResult<()> {
        let affected = self
            .conn
            .execute("DELETE FROM categories WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(RepositoryError::not_found(ENTITY, id));
        }
        Ok(())
    }
}
