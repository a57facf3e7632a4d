// ==========================================
// 工厂管理系统 - 往来单位仓储（客户 / 供应商）
// ==========================================
// 两张表结构一致，按 PartnerKind 选择落表
// ==========================================

use email_address::EmailAddress;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::domain::filter::{non_empty, TextFilter};
use crate::domain::pagination::{PageRequest, Pagination};
use crate::domain::partner::{PartnerDto, PartnerKind};
use crate::domain::validation::FieldErrors;
use crate::i18n::t;
use crate::repository::common::{fetch_all, fetch_page, row_exists, value_taken, WhereBuilder};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::CrudRepository;

const SELECT: &str = "p.id, p.name, p.contact, p.address, p.city, p.postal, p.phone, p.email";

pub struct PartnerRepository<'c> {
    conn: &'c Connection,
    kind: PartnerKind,
}

impl<'c> PartnerRepository<'c> {
    pub fn new(conn: &'c Connection, kind: PartnerKind) -> Self {
        Self { conn, kind }
    }

    pub fn kind(&self) -> PartnerKind {
        self.kind
    }

    fn table(&self) -> &'static str {
        self.kind.table()
    }

    fn from_clause(&self) -> String {
        format!("{} p", self.table())
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<PartnerDto> {
        Ok(PartnerDto {
            id: row.get(0)?,
            name: row.get(1)?,
            contact: row.get(2)?,
            address: row.get(3)?,
            city: row.get(4)?,
            postal: row.get(5)?,
            phone: row.get(6)?,
            email: row.get(7)?,
        })
    }
}

impl CrudRepository for PartnerRepository<'_> {
    type Dto = PartnerDto;
    type Filter = TextFilter;

    fn entity_name(&self) -> &'static str {
        self.kind.entity_name()
    }

    fn list_paginated(
        &self,
        filter: &TextFilter,
        page: &PageRequest,
    ) -> RepositoryResult<Pagination<PartnerDto>> {
        let mut w = WhereBuilder::new();
        w.contains_any(
            &["p.name", "p.contact", "p.email"],
            non_empty(&filter.search_text),
        );
        fetch_page(self.conn, SELECT, &self.from_clause(), "p.id", &w, page, Self::map_row)
    }

    fn get_by_id(&self, id: i64) -> RepositoryResult<Option<PartnerDto>> {
        let sql = format!("SELECT {} FROM {} WHERE p.id = ?1", SELECT, self.from_clause());
        Ok(self
            .conn
            .query_row(&sql, params![id], Self::map_row)
            .optional()?)
    }

    fn get_all(&self) -> RepositoryResult<Vec<PartnerDto>> {
        let sql = format!("SELECT {} FROM {} ORDER BY p.id", SELECT, self.from_clause());
        fetch_all(self.conn, &sql, Self::map_row)
    }

    fn exists(&self, id: i64) -> RepositoryResult<bool> {
        row_exists(self.conn, self.table(), id)
    }

    fn validate(&self, dto: &PartnerDto) -> RepositoryResult<FieldErrors> {
        let mut errors = FieldErrors::new();
        let entity = self.entity_name();
        let exclude = dto.id.max(0);

        if errors.require("Name", &dto.name)
            && value_taken(self.conn, self.table(), "name", &dto.name, exclude)?
        {
            errors.add_duplicate(entity, "Name");
        }

        errors.require("Contact", &dto.contact);
        errors.require("Address", &dto.address);
        errors.require("City", &dto.city);
        errors.require("Postal", &dto.postal);
        errors.require("Phone", &dto.phone);

        if errors.require("Email", &dto.email) {
            if !EmailAddress::is_valid(dto.email.trim()) {
                errors.add("Email", t("validation.email_invalid"));
            } else if value_taken(self.conn, self.table(), "email", &dto.email, exclude)? {
                errors.add_duplicate(entity, "Email");
            }
        }

        Ok(errors)
    }

    fn create(&self, dto: &PartnerDto) -> RepositoryResult<i64> {
        let sql = format!(
            "INSERT INTO {} (name, contact, address, city, postal, phone, email)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            self.table()
        );
        self.conn.execute(
            &sql,
            params![
                dto.name.trim(),
                dto.contact.trim(),
                dto.address.trim(),
                dto.city.trim(),
                dto.postal.trim(),
                dto.phone.trim(),
                dto.email.trim(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn edit(&self, dto: &PartnerDto) -> RepositoryResult<()> {
        let sql = format!(
            "UPDATE {} SET name = ?1, contact = ?2, address = ?3, city = ?4,
                 postal = ?5, phone = ?6, email = ?7
             WHERE id = ?8",
            self.table()
        );
        let affected = self.conn.execute(
            &sql,
            params![
                dto.name.trim(),
                dto.contact.trim(),
                dto.address.trim(),
                dto.city.trim(),
                dto.postal.trim(),
                dto.phone.trim(),
                dto.email.trim(),
                dto.id,
            ],
        )?;
        if affected == 0 {
            return Err(RepositoryError::not_found(self.entity_name(), dto.id));
        }
        Ok(())
    }

    fn delete(&self, id: i64) -> RepositoryResult<()> {
        let sql = format!("DELETE FROM {} WHERE id = ?1", self.table());
        let affected = self.conn.execute(&sql, params![id])?;
        if affected == 0 {
            return Err(RepositoryError::not_found(self.entity_name(), id));
        }
        Ok(())
    }
}
