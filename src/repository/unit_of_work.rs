// ==========================================
// 工厂管理系统 - 工作单元与数据库句柄
// ==========================================
// 每个请求在一个事务内完成:
// - 写操作: BEGIN IMMEDIATE，校验与落库之间不会被其他写入插队
// - 读操作: BEGIN DEFERRED
// 闭包返回 Ok 时提交，返回 Err 时整体回滚
// 同步 SQLite 调用放在 tokio 阻塞线程池中执行
// ==========================================

use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::config::ConfigManager;
use crate::db::{configure_sqlite_connection, ensure_schema, open_sqlite_connection, read_schema_version};
use crate::domain::partner::PartnerKind;
use crate::perf::{install_sqlite_tracing, PerfGuard, PerfSettings};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::{
    CategoryRepository, Inventory, MaterialRepository, OrderRepository, PartnerRepository,
    ProductRepository, ProductionRepository, PurchaseRepository,
};

// ==========================================
// UnitOfWork - 单个事务内的仓储集合
// ==========================================
pub struct UnitOfWork<'c> {
    tx: Transaction<'c>,
}

impl<'c> UnitOfWork<'c> {
    /// 开启写事务（IMMEDIATE）
    pub fn begin(conn: &'c mut Connection) -> RepositoryResult<Self> {
        Self::begin_with(conn, TransactionBehavior::Immediate)
    }

    /// 开启只读事务（DEFERRED）
    pub fn begin_read(conn: &'c mut Connection) -> RepositoryResult<Self> {
        Self::begin_with(conn, TransactionBehavior::Deferred)
    }

    fn begin_with(conn: &'c mut Connection, behavior: TransactionBehavior) -> RepositoryResult<Self> {
        let tx = conn
            .transaction_with_behavior(behavior)
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(Self { tx })
    }

    pub fn connection(&self) -> &Connection {
        &self.tx
    }

    pub fn categories(&self) -> CategoryRepository<'_> {
        CategoryRepository::new(&self.tx)
    }

    pub fn customers(&self) -> PartnerRepository<'_> {
        PartnerRepository::new(&self.tx, PartnerKind::Customer)
    }

    pub fn suppliers(&self) -> PartnerRepository<'_> {
        PartnerRepository::new(&self.tx, PartnerKind::Supplier)
    }

    pub fn materials(&self) -> MaterialRepository<'_> {
        MaterialRepository::new(&self.tx)
    }

    pub fn products(&self) -> ProductRepository<'_> {
        ProductRepository::new(&self.tx)
    }

    pub fn orders(&self) -> OrderRepository<'_> {
        OrderRepository::new(&self.tx)
    }

    pub fn purchases(&self) -> PurchaseRepository<'_> {
        PurchaseRepository::new(&self.tx)
    }

    pub fn productions(&self) -> ProductionRepository<'_> {
        ProductionRepository::new(&self.tx)
    }

    pub fn inventory(&self) -> Inventory<'_> {
        Inventory::new(&self.tx)
    }

    pub fn config(&self) -> ConfigManager<'_> {
        ConfigManager::new(&self.tx)
    }

    /// 提交
    pub fn confirm_changes(self) -> RepositoryResult<()> {
        self.tx
            .commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))
    }

    /// 回滚
    pub fn roll_back_changes(self) -> RepositoryResult<()> {
        self.tx
            .rollback()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))
    }
}

// ==========================================
// Database - 跨线程共享的连接句柄
// ==========================================

/// 数据库句柄
///
/// 单连接 + Mutex，同一时刻只有一个工作单元在执行。
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// 打开（或创建）数据库文件
    pub fn open(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        tracing::info!(db_path, "数据库已打开");
        Self::from_connection(conn)
    }

    /// 内存数据库（测试用）
    pub fn open_in_memory() -> RepositoryResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    /// 应用 PRAGMA、建表并安装 SQL 追踪
    pub fn from_connection(mut conn: Connection) -> RepositoryResult<Self> {
        configure_sqlite_connection(&conn)?;
        ensure_schema(&conn)?;
        install_sqlite_tracing(&mut conn, PerfSettings::from_env());
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 当前 schema_version
    pub fn schema_version(&self) -> RepositoryResult<Option<i64>> {
        let conn = self.get_conn()?;
        Ok(read_schema_version(&conn)?)
    }

    /// 在写事务中执行（同步）
    ///
    /// # 参数
    /// - `op`: 操作名，用于性能日志
    /// - `f`: 事务体；返回 Err 时回滚
    pub fn transact_blocking<T, F>(&self, op: &str, f: F) -> RepositoryResult<T>
    where
        F: FnOnce(&UnitOfWork<'_>) -> RepositoryResult<T>,
    {
        self.run(op, true, f)
    }

    /// 在只读事务中执行（同步）
    pub fn query_blocking<T, F>(&self, op: &str, f: F) -> RepositoryResult<T>
    where
        F: FnOnce(&UnitOfWork<'_>) -> RepositoryResult<T>,
    {
        self.run(op, false, f)
    }

    fn run<T, F>(&self, op: &str, write: bool, f: F) -> RepositoryResult<T>
    where
        F: FnOnce(&UnitOfWork<'_>) -> RepositoryResult<T>,
    {
        let _perf = PerfGuard::new(op);
        let mut conn = self.get_conn()?;
        let uow = if write {
            UnitOfWork::begin(&mut *conn)?
        } else {
            UnitOfWork::begin_read(&mut *conn)?
        };

        match f(&uow) {
            Ok(value) => {
                if write {
                    uow.confirm_changes()?;
                } else {
                    // 只读事务无需提交
                    uow.roll_back_changes()?;
                }
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = uow.roll_back_changes() {
                    tracing::warn!(op, error = %rollback_err, "事务回滚失败");
                }
                if err.is_refusal() {
                    tracing::debug!(op, error = %err, "事务已回滚");
                } else {
                    tracing::warn!(op, error = %err, "存储错误，事务已回滚");
                }
                Err(err)
            }
        }
    }

    /// 在写事务中执行（阻塞线程池）
    pub async fn transact<T, F>(&self, op: impl Into<String>, f: F) -> RepositoryResult<T>
    where
        F: FnOnce(&UnitOfWork<'_>) -> RepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.clone();
        let op = op.into();
        tokio::task::spawn_blocking(move || db.transact_blocking(&op, f))
            .await
            .map_err(|e| RepositoryError::InternalError(format!("数据库任务异常: {}", e)))?
    }

    /// 在只读事务中执行（阻塞线程池）
    pub async fn query<T, F>(&self, op: impl Into<String>, f: F) -> RepositoryResult<T>
    where
        F: FnOnce(&UnitOfWork<'_>) -> RepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.clone();
        let op = op.into();
        tokio::task::spawn_blocking(move || db.query_blocking(&op, f))
            .await
            .map_err(|e| RepositoryError::InternalError(format!("数据库任务异常: {}", e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::CURRENT_SCHEMA_VERSION;
    use crate::domain::category::CategoryDto;
    use crate::repository::CrudRepository;

    fn category(name: &str) -> CategoryDto {
        CategoryDto {
            id: 0,
            name: name.to_string(),
            description: None,
        }
    }

    #[test]
    fn test_open_in_memory_建表() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.schema_version().unwrap(), Some(CURRENT_SCHEMA_VERSION));
    }

    #[test]
    fn test_transact_成功提交() {
        let db = Database::open_in_memory().unwrap();
        let id = db
            .transact_blocking("test.create", |uow| uow.categories().create(&category("Parts")))
            .unwrap();

        let loaded = db
            .query_blocking("test.get", move |uow| uow.categories().get_by_id(id))
            .unwrap();
        assert_eq!(loaded.unwrap().name, "Parts");
    }

    #[test]
    fn test_transact_失败回滚() {
        let db = Database::open_in_memory().unwrap();
        let result: RepositoryResult<()> = db.transact_blocking("test.rollback", |uow| {
            uow.categories().create(&category("Parts"))?;
            Err(RepositoryError::InternalError("boom".to_string()))
        });
        assert!(result.is_err());

        let all = db
            .query_blocking("test.all", |uow| uow.categories().get_all())
            .unwrap();
        assert!(all.is_empty());
    }

    #[test]
    fn test_file_database_重新打开() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("factory.db");
        let path = path.to_string_lossy().to_string();

        {
            let db = Database::open(&path).unwrap();
            db.transact_blocking("test.create", |uow| uow.categories().create(&category("Parts")))
                .unwrap();
        }

        let db = Database::open(&path).unwrap();
        let all = db
            .query_blocking("test.all", |uow| uow.categories().get_all())
            .unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(db.schema_version().unwrap(), Some(CURRENT_SCHEMA_VERSION));
    }

    #[tokio::test]
    async fn test_async_transact_与_query() {
        let db = Database::open_in_memory().unwrap();
        let id = db
            .transact("test.create", |uow| uow.categories().create(&category("Parts")))
            .await
            .unwrap();
        let exists = db
            .query("test.exists", move |uow| uow.categories().exists(id))
            .await
            .unwrap();
        assert!(exists);
    }
}
