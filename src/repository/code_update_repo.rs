// ==========================================
// 工具包发布跟踪系统 - 代码更新仓储
// ==========================================
// 职责: code_update 表 + 文件版本 + 状态历史
// ==========================================

use crate::domain::change::{ChangeRequest, CodeUpdate, FileVersion};
use crate::domain::link::StatusEvent;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::history_repo::StatusHistoryRepository;
use crate::repository::join_repo::JoinRepository;
use crate::repository::table_repo::TableRepository;
use crate::repository::tables::{CHANGE_REQUEST_CODE_UPDATE, CODE_UPDATE, CODE_UPDATE_STATUS};
use rusqlite::types::Value;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

// ==========================================
// CodeUpdateRepository - 代码更新仓储
// ==========================================
pub struct CodeUpdateRepository {
    table: TableRepository<CodeUpdate>,
    files: TableRepository<FileVersion>,
    change_requests: JoinRepository,
    history: StatusHistoryRepository,
}

impl CodeUpdateRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            table: TableRepository::new(conn.clone()),
            files: TableRepository::new(conn.clone()),
            change_requests: JoinRepository::new(&CHANGE_REQUEST_CODE_UPDATE, conn.clone()),
            history: StatusHistoryRepository::new(&CODE_UPDATE_STATUS, conn),
        }
    }

    pub fn table(&self) -> &TableRepository<CodeUpdate> {
        &self.table
    }

    pub fn history(&self) -> &StatusHistoryRepository {
        &self.history
    }

    pub fn list_for_component_version(
        &self,
        component_version_id: i64,
    ) -> RepositoryResult<Vec<CodeUpdate>> {
        self.table.find_where(
            "list_for_component_version",
            &["component_version_id"],
            &[Value::Integer(component_version_id)],
            true,
        )
    }

    /// 按 (组件版本, 修订号) 查询，必须存在
    pub fn lookup_by_revision(
        &self,
        component_version_id: i64,
        revision: &str,
    ) -> RepositoryResult<CodeUpdate> {
        self.table
            .find_one_where(
                "lookup_by_revision",
                &["component_version_id", "revision"],
                &[
                    Value::Integer(component_version_id),
                    Value::Text(revision.to_string()),
                ],
            )?
            .ok_or_else(|| {
                RepositoryError::not_found(
                    CODE_UPDATE.entity,
                    "lookup_by_revision",
                    format!("version={} revision={}", component_version_id, revision),
                )
            })
    }

    /// 代码更新包含的文件版本
    pub fn file_versions(&self, code_update_id: i64) -> RepositoryResult<Vec<FileVersion>> {
        self.files.find_where(
            "file_versions",
            &["code_update_id"],
            &[Value::Integer(code_update_id)],
            true,
        )
    }

    /// 引用该代码更新的变更请求
    pub fn change_requests(&self, code_update_id: i64) -> RepositoryResult<Vec<ChangeRequest>> {
        self.change_requests.related_left(code_update_id)
    }

    // ==========================================
    // 状态历史
    // ==========================================

    pub fn record_status(
        &self,
        code_update_id: i64,
        status_name: &str,
        actor: &str,
    ) -> RepositoryResult<StatusEvent> {
        self.history.record(code_update_id, status_name, actor)
    }

    pub fn current_status(&self, code_update_id: i64) -> RepositoryResult<Option<StatusEvent>> {
        self.history.latest(code_update_id)
    }

    pub fn status_history(&self, code_update_id: i64) -> RepositoryResult<Vec<StatusEvent>> {
        self.history.history(code_update_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::{Component, Release};
    use crate::domain::tool_kit::ComponentVersion;
    use crate::schema::initialize_schema;

    fn setup_test_db() -> Arc<Mutex<Connection>> {
        let conn = crate::db::open_in_memory_connection().unwrap();
        initialize_schema(&conn).unwrap();
        Arc::new(Mutex::new(conn))
    }

    fn seed_code_update(conn: &Arc<Mutex<Connection>>) -> CodeUpdate {
        let release = TableRepository::<Release>::new(conn.clone())
            .add_row(&Release::new("14.1", None), "alice")
            .unwrap();
        let component = TableRepository::<Component>::new(conn.clone())
            .add_row(&Component::new("einstimer", None), "alice")
            .unwrap();
        let cv = TableRepository::<ComponentVersion>::new(conn.clone())
            .add_row(&ComponentVersion::new(component.id, release.id, None), "alice")
            .unwrap();
        TableRepository::<CodeUpdate>::new(conn.clone())
            .add_row(&CodeUpdate::new(cv.id, "r1001", Some("fix slack".to_string())), "alice")
            .unwrap()
    }

    #[test]
    fn test_status_history_appends_in_order() {
        let conn = setup_test_db();
        let cu = seed_code_update(&conn);
        let repo = CodeUpdateRepository::new(conn);

        assert!(repo.current_status(cu.id).unwrap().is_none());

        let first = repo.record_status(cu.id, "COMMITTED", "alice").unwrap();
        let second = repo.record_status(cu.id, "BUILT", "bob").unwrap();
        assert_eq!(first.status_name, "COMMITTED");
        assert_eq!(second.user_id, "bob");
        assert_ne!(first.id, second.id);

        let history = repo.status_history(cu.id).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].status_name, "COMMITTED");
        assert_eq!(history[1].status_name, "BUILT");

        let current = repo.current_status(cu.id).unwrap().unwrap();
        assert_eq!(current.status_name, "BUILT");
        assert_eq!(current.parent_id, cu.id);
    }

    #[test]
    fn test_current_status_follows_append_order_not_clock() {
        let conn = setup_test_db();
        let cu = seed_code_update(&conn);
        let repo = CodeUpdateRepository::new(conn.clone());

        let first = repo.record_status(cu.id, "COMMITTED", "alice").unwrap();
        // 模拟时钟回拨: 先记录的一行时间戳反而更晚
        conn.lock()
            .unwrap()
            .execute(
                "UPDATE code_update_status SET recorded_on = datetime(recorded_on, '+1 hour') \
                 WHERE code_update_status_id = ?1",
                [first.id],
            )
            .unwrap();
        repo.record_status(cu.id, "BUILT", "bob").unwrap();

        let current = repo.current_status(cu.id).unwrap().unwrap();
        assert_eq!(current.status_name, "BUILT");

        let names: Vec<String> = repo
            .status_history(cu.id)
            .unwrap()
            .into_iter()
            .map(|e| e.status_name)
            .collect();
        assert_eq!(names, vec!["COMMITTED", "BUILT"]);
    }

    #[test]
    fn test_unknown_status_name_is_not_found() {
        let conn = setup_test_db();
        let cu = seed_code_update(&conn);
        let repo = CodeUpdateRepository::new(conn);

        let err = repo.record_status(cu.id, "SHIPPED_TO_MARS", "alice").unwrap_err();
        assert!(err.is_not_found());
        assert!(repo.status_history(cu.id).unwrap().is_empty());
    }

    #[test]
    fn test_status_names_seeded() {
        let conn = setup_test_db();
        let repo = CodeUpdateRepository::new(conn);

        let names = repo.history().status_names().unwrap();
        assert_eq!(names.len(), 4);
        assert_eq!(names[0].name, "COMMITTED");
    }

    #[test]
    fn test_lookup_by_revision_and_files() {
        let conn = setup_test_db();
        let cu = seed_code_update(&conn);
        let files = TableRepository::<FileVersion>::new(conn.clone());
        files
            .add_row(&FileVersion::new(cu.id, "src/timer.c", "1.7"), "alice")
            .unwrap();
        files
            .add_row(&FileVersion::new(cu.id, "src/timer.h", "1.3"), "alice")
            .unwrap();
        let repo = CodeUpdateRepository::new(conn);

        let found = repo.lookup_by_revision(cu.component_version_id, "r1001").unwrap();
        assert_eq!(found.id, cu.id);
        assert!(repo
            .lookup_by_revision(cu.component_version_id, "r9999")
            .unwrap_err()
            .is_not_found());

        assert_eq!(repo.file_versions(cu.id).unwrap().len(), 2);
        assert_eq!(
            repo.list_for_component_version(cu.component_version_id)
                .unwrap()
                .len(),
            1
        );
    }
}
