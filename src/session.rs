// ==========================================
// 工具包发布跟踪系统 - 数据库会话
// ==========================================
// 职责: 持有共享连接与当前操作人，按需创建各仓储
// 约束: 所有仓储共享同一 Arc<Mutex<Connection>>
// ==========================================

use crate::config::DbConfig;
use crate::db::{self, open_sqlite_connection};
use crate::perf::configure_sql_stats;
use crate::repository::{
    ChangeRequestRepository, CodeUpdateRepository, ComponentTkVersionRepository,
    ComponentUpdateRepository, ComponentVersionRepository, DeliverableRepository,
    DeliverableUpdateRepository, Entity, FileVersionRepository, HistoryDef, JoinDef,
    JoinRepository, LocationRepository, RepositoryError, RepositoryResult,
    StatusHistoryRepository, TableRepository, ToolKitRepository,
};
use crate::schema::initialize_schema;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

// ==========================================
// DbSession - 数据库会话
// ==========================================
#[derive(Clone)]
pub struct DbSession {
    conn: Arc<Mutex<Connection>>,
    actor: String,
}

impl DbSession {
    /// 按配置打开数据库
    ///
    /// # 说明
    /// - 数据库文件所在目录不存在时创建
    /// - 应用统一 PRAGMA 与 busy_timeout
    /// - 按配置设置慢 SQL 日志
    /// - 建表（幂等）并检查 schema_version
    pub fn open(config: &DbConfig) -> RepositoryResult<Self> {
        tracing::info!(db_path = %config.db_path, "打开数据库");

        db::ensure_db_parent_dir(&config.db_path).map_err(|e| {
            RepositoryError::InternalError(format!("创建数据库目录失败 {}: {}", config.db_path, e))
        })?;
        let conn = open_sqlite_connection(&config.db_path, config.busy_timeout_ms)?;
        configure_sql_stats(config);
        initialize_schema(&conn)?;
        db::warn_on_schema_mismatch(&conn)?;

        Ok(Self::from_connection(
            Arc::new(Mutex::new(conn)),
            config.default_actor.clone(),
        ))
    }

    /// 内存库会话（已建表）
    pub fn open_in_memory(actor: impl Into<String>) -> RepositoryResult<Self> {
        let conn = db::open_in_memory_connection()?;
        initialize_schema(&conn)?;
        Ok(Self::from_connection(Arc::new(Mutex::new(conn)), actor))
    }

    /// 从已有连接创建会话（不建表）
    pub fn from_connection(conn: Arc<Mutex<Connection>>, actor: impl Into<String>) -> Self {
        Self {
            conn,
            actor: actor.into(),
        }
    }

    pub fn connection(&self) -> Arc<Mutex<Connection>> {
        self.conn.clone()
    }

    /// 当前操作人（写入审计列）
    pub fn actor(&self) -> &str {
        &self.actor
    }

    /// 以另一操作人派生会话（共享连接）
    pub fn with_actor(&self, actor: impl Into<String>) -> Self {
        Self::from_connection(self.conn.clone(), actor)
    }

    /// 在锁内直接使用连接（命令行按表名访问等）
    pub fn with_connection<T, F>(&self, f: F) -> RepositoryResult<T>
    where
        F: FnOnce(&Connection) -> RepositoryResult<T>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        f(&conn)
    }

    // ==========================================
    // 通用仓储
    // ==========================================

    pub fn table<E: Entity>(&self) -> TableRepository<E> {
        TableRepository::new(self.conn.clone())
    }

    pub fn join(&self, def: &'static JoinDef) -> JoinRepository {
        JoinRepository::new(def, self.conn.clone())
    }

    pub fn history(&self, def: &'static HistoryDef) -> StatusHistoryRepository {
        StatusHistoryRepository::new(def, self.conn.clone())
    }

    // ==========================================
    // 专用仓储
    // ==========================================

    pub fn component_versions(&self) -> ComponentVersionRepository {
        ComponentVersionRepository::new(self.conn.clone())
    }

    pub fn tool_kits(&self) -> ToolKitRepository {
        ToolKitRepository::new(self.conn.clone())
    }

    pub fn component_tk_versions(&self) -> ComponentTkVersionRepository {
        ComponentTkVersionRepository::new(self.conn.clone())
    }

    pub fn change_requests(&self) -> ChangeRequestRepository {
        ChangeRequestRepository::new(self.conn.clone())
    }

    pub fn code_updates(&self) -> CodeUpdateRepository {
        CodeUpdateRepository::new(self.conn.clone())
    }

    pub fn file_versions(&self) -> FileVersionRepository {
        FileVersionRepository::new(self.conn.clone())
    }

    pub fn deliverables(&self) -> DeliverableRepository {
        DeliverableRepository::new(self.conn.clone())
    }

    pub fn deliverable_updates(&self) -> DeliverableUpdateRepository {
        DeliverableUpdateRepository::new(self.conn.clone())
    }

    pub fn component_updates(&self) -> ComponentUpdateRepository {
        ComponentUpdateRepository::new(self.conn.clone())
    }

    pub fn locations(&self) -> LocationRepository {
        LocationRepository::new(self.conn.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::{Component, Release};
    use crate::repository::tables::CODE_UPDATE_STATUS;

    #[test]
    fn test_session_shares_connection_across_repositories() {
        let session = DbSession::open_in_memory("alice").unwrap();
        let components = session.table::<Component>();
        let release = session
            .table::<Release>()
            .add_row(&Release::new("14.1", None), session.actor())
            .unwrap();
        components
            .add_row(&Component::new("einstimer", None), session.actor())
            .unwrap();

        let other = session.with_actor("bob");
        assert_eq!(other.actor(), "bob");
        assert_eq!(other.table::<Component>().count_active().unwrap(), 1);
        assert_eq!(
            other.table::<Release>().lookup_by_id(release.id).unwrap().name,
            "14.1"
        );
    }

    #[test]
    fn test_open_creates_missing_parent_dir() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("nested").join("data").join("tk.db");
        let config = DbConfig {
            db_path: db_path.to_string_lossy().to_string(),
            busy_timeout_ms: 1000,
            trace_sql: Some(false),
            slow_sql_ms: None,
            default_actor: "alice".to_string(),
        };

        let session = DbSession::open(&config).unwrap();
        assert_eq!(session.actor(), "alice");
        assert!(db_path.exists());
    }

    #[test]
    fn test_with_connection_and_history_accessor() {
        let session = DbSession::open_in_memory("alice").unwrap();
        let version = session
            .with_connection(|conn| Ok(db::read_schema_version(conn)?))
            .unwrap();
        assert_eq!(version, Some(db::CURRENT_SCHEMA_VERSION));

        let names = session.history(&CODE_UPDATE_STATUS).status_names().unwrap();
        assert_eq!(names.len(), 4);
    }
}
