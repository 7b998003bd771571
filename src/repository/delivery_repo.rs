// ==========================================
// 工具包发布跟踪系统 - 交付物仓储
// ==========================================
// 职责: deliverable / deliverable_update / component_update 三张表
//       + deliverable_update_code_update 关联 + 交付更新状态历史
// ==========================================

use crate::domain::change::CodeUpdate;
use crate::domain::delivery::{ComponentUpdate, Deliverable, DeliverableUpdate};
use crate::domain::link::{Link, StatusEvent};
use crate::repository::error::RepositoryResult;
use crate::repository::history_repo::StatusHistoryRepository;
use crate::repository::join_repo::JoinRepository;
use crate::repository::table_repo::TableRepository;
use crate::repository::tables::{DELIVERABLE_UPDATE_CODE_UPDATE, DELIVERABLE_UPDATE_STATUS};
use rusqlite::types::Value;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

// ==========================================
// DeliverableRepository - 交付物
// ==========================================
pub struct DeliverableRepository {
    table: TableRepository<Deliverable>,
    updates: TableRepository<DeliverableUpdate>,
}

impl DeliverableRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            table: TableRepository::new(conn.clone()),
            updates: TableRepository::new(conn),
        }
    }

    pub fn table(&self) -> &TableRepository<Deliverable> {
        &self.table
    }

    pub fn list_for_tk_version(
        &self,
        component_tk_version_id: i64,
    ) -> RepositoryResult<Vec<Deliverable>> {
        self.table.find_where(
            "list_for_tk_version",
            &["component_tk_version_id"],
            &[Value::Integer(component_tk_version_id)],
            true,
        )
    }

    /// 交付物的全部更新
    pub fn updates(&self, deliverable_id: i64) -> RepositoryResult<Vec<DeliverableUpdate>> {
        self.updates.find_where(
            "updates",
            &["deliverable_id"],
            &[Value::Integer(deliverable_id)],
            true,
        )
    }
}

// ==========================================
// DeliverableUpdateRepository - 交付更新
// ==========================================
pub struct DeliverableUpdateRepository {
    table: TableRepository<DeliverableUpdate>,
    code_updates: JoinRepository,
    history: StatusHistoryRepository,
}

impl DeliverableUpdateRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            table: TableRepository::new(conn.clone()),
            code_updates: JoinRepository::new(&DELIVERABLE_UPDATE_CODE_UPDATE, conn.clone()),
            history: StatusHistoryRepository::new(&DELIVERABLE_UPDATE_STATUS, conn),
        }
    }

    pub fn table(&self) -> &TableRepository<DeliverableUpdate> {
        &self.table
    }

    pub fn history(&self) -> &StatusHistoryRepository {
        &self.history
    }

    /// 交付更新带出的代码更新
    pub fn code_updates(&self, deliverable_update_id: i64) -> RepositoryResult<Vec<CodeUpdate>> {
        self.code_updates.related_right(deliverable_update_id)
    }

    /// 关联代码更新（关联表带代理主键 link_id）
    pub fn link_code_update(
        &self,
        deliverable_update_id: i64,
        code_update_id: i64,
        actor: &str,
    ) -> RepositoryResult<Link> {
        self.code_updates
            .add_link(deliverable_update_id, code_update_id, actor)
    }

    pub fn unlink_code_update(
        &self,
        deliverable_update_id: i64,
        code_update_id: i64,
        actor: &str,
    ) -> RepositoryResult<()> {
        self.code_updates
            .remove_link(deliverable_update_id, code_update_id, actor)
    }

    pub fn record_status(
        &self,
        deliverable_update_id: i64,
        status_name: &str,
        actor: &str,
    ) -> RepositoryResult<StatusEvent> {
        self.history.record(deliverable_update_id, status_name, actor)
    }

    pub fn current_status(&self, deliverable_update_id: i64) -> RepositoryResult<Option<StatusEvent>> {
        self.history.latest(deliverable_update_id)
    }

    pub fn status_history(&self, deliverable_update_id: i64) -> RepositoryResult<Vec<StatusEvent>> {
        self.history.history(deliverable_update_id)
    }
}

// ==========================================
// ComponentUpdateRepository - 组件更新
// ==========================================
pub struct ComponentUpdateRepository {
    table: TableRepository<ComponentUpdate>,
}

impl ComponentUpdateRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            table: TableRepository::new(conn),
        }
    }

    pub fn table(&self) -> &TableRepository<ComponentUpdate> {
        &self.table
    }

    pub fn list_for_tk_version(
        &self,
        component_tk_version_id: i64,
    ) -> RepositoryResult<Vec<ComponentUpdate>> {
        self.table.find_where(
            "list_for_tk_version",
            &["component_tk_version_id"],
            &[Value::Integer(component_tk_version_id)],
            true,
        )
    }
}
