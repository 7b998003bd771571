// ==========================================
// 工具包发布跟踪系统 - 变更请求仓储
// ==========================================
// 职责: change_request 表 + 与组件版本/代码更新的关联
// 红线: 状态流转不做合法性校验
// ==========================================

use crate::domain::catalog::ChangeRequestStatus;
use crate::domain::change::{ChangeRequest, CodeUpdate};
use crate::domain::link::Link;
use crate::domain::tool_kit::ComponentVersion;
use crate::repository::error::RepositoryResult;
use crate::repository::join_repo::JoinRepository;
use crate::repository::table_repo::TableRepository;
use crate::repository::tables::{CHANGE_REQUEST_CODE_UPDATE, COMP_VERSION_CHANGE_REQUEST};
use rusqlite::types::Value;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

// ==========================================
// ChangeRequestRepository - 变更请求仓储
// ==========================================
pub struct ChangeRequestRepository {
    table: TableRepository<ChangeRequest>,
    statuses: TableRepository<ChangeRequestStatus>,
    component_versions: JoinRepository,
    code_updates: JoinRepository,
}

impl ChangeRequestRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            table: TableRepository::new(conn.clone()),
            statuses: TableRepository::new(conn.clone()),
            component_versions: JoinRepository::new(&COMP_VERSION_CHANGE_REQUEST, conn.clone()),
            code_updates: JoinRepository::new(&CHANGE_REQUEST_CODE_UPDATE, conn),
        }
    }

    pub fn table(&self) -> &TableRepository<ChangeRequest> {
        &self.table
    }

    /// 状态字典
    pub fn statuses(&self) -> &TableRepository<ChangeRequestStatus> {
        &self.statuses
    }

    pub fn list_by_status(&self, status_id: i64) -> RepositoryResult<Vec<ChangeRequest>> {
        self.table
            .find_where("list_by_status", &["status_id"], &[Value::Integer(status_id)], true)
    }

    /// 按状态名列出（状态名不存在返回 NotFound）
    pub fn list_by_status_name(&self, status_name: &str) -> RepositoryResult<Vec<ChangeRequest>> {
        let status = self.statuses.lookup_by_name(status_name)?;
        self.list_by_status(status.id)
    }

    /// 变更状态
    ///
    /// # 参数
    /// - id: 变更请求主键
    /// - status_name: 目标状态名（如 APPROVED）
    /// - actor: 操作人
    pub fn update_status(
        &self,
        id: i64,
        status_name: &str,
        actor: &str,
    ) -> RepositoryResult<ChangeRequest> {
        let status = self.statuses.lookup_by_name(status_name)?;
        let updated = self
            .table
            .update_columns(id, &[("status_id", Value::Integer(status.id))], actor)?;
        tracing::info!(change_request = id, status = status_name, actor, "变更请求状态更新");
        Ok(updated)
    }

    // ==========================================
    // 关联查询
    // ==========================================

    pub fn component_versions(&self, change_request_id: i64) -> RepositoryResult<Vec<ComponentVersion>> {
        self.component_versions.related_left(change_request_id)
    }

    pub fn code_updates(&self, change_request_id: i64) -> RepositoryResult<Vec<CodeUpdate>> {
        self.code_updates.related_right(change_request_id)
    }

    pub fn add_code_update(
        &self,
        change_request_id: i64,
        code_update_id: i64,
        actor: &str,
    ) -> RepositoryResult<Link> {
        self.code_updates
            .add_link(change_request_id, code_update_id, actor)
    }

    pub fn remove_code_update(
        &self,
        change_request_id: i64,
        code_update_id: i64,
        actor: &str,
    ) -> RepositoryResult<()> {
        self.code_updates
            .remove_link(change_request_id, code_update_id, actor)
    }
}
