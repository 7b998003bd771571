// ==========================================
// 工具包发布跟踪系统 - 组件版本仓储
// ==========================================
// 职责: component_version 表 + comp_version_change_request 关联
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::domain::change::ChangeRequest;
use crate::domain::link::Link;
use crate::domain::tool_kit::ComponentVersion;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::join_repo::JoinRepository;
use crate::repository::sql::qualified_select_list;
use crate::repository::table_repo::TableRepository;
use crate::repository::tables::{COMPONENT_VERSION, COMP_VERSION_CHANGE_REQUEST};
use rusqlite::types::Value;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

// ==========================================
// ComponentVersionRepository - 组件版本仓储
// ==========================================
pub struct ComponentVersionRepository {
    table: TableRepository<ComponentVersion>,
    change_requests: JoinRepository,
}

impl ComponentVersionRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            table: TableRepository::new(conn.clone()),
            change_requests: JoinRepository::new(&COMP_VERSION_CHANGE_REQUEST, conn),
        }
    }

    /// 通用 CRUD
    pub fn table(&self) -> &TableRepository<ComponentVersion> {
        &self.table
    }

    /// 按 (组件, 发布) 查询
    pub fn find_by_component_release(
        &self,
        component_id: i64,
        release_id: i64,
    ) -> RepositoryResult<Option<ComponentVersion>> {
        self.table.find_one_where(
            "find_by_component_release",
            &["component_id", "release_id"],
            &[Value::Integer(component_id), Value::Integer(release_id)],
        )
    }

    /// 按 (组件, 发布) 查询，必须存在
    pub fn lookup_by_component_release(
        &self,
        component_id: i64,
        release_id: i64,
    ) -> RepositoryResult<ComponentVersion> {
        self.find_by_component_release(component_id, release_id)?
            .ok_or_else(|| {
                RepositoryError::not_found(
                    COMPONENT_VERSION.entity,
                    "lookup_by_component_release",
                    format!("component={} release={}", component_id, release_id),
                )
            })
    }

    /// 按 (组件名, 发布名) 查询，必须存在
    pub fn lookup_by_names(
        &self,
        component_name: &str,
        release_name: &str,
    ) -> RepositoryResult<ComponentVersion> {
        let query = format!(
            "SELECT {} FROM component_version t \
             JOIN component c ON c.component_id = t.component_id \
             JOIN tk_release r ON r.release_id = t.release_id \
             WHERE c.name = ?1 AND r.name = ?2 AND t.deleted_on IS NULL",
            qualified_select_list(&COMPONENT_VERSION.select_columns(), "t")
        );
        self.table
            .query_custom(
                "lookup_by_names",
                &query,
                &[
                    Value::Text(component_name.to_string()),
                    Value::Text(release_name.to_string()),
                ],
            )?
            .into_iter()
            .next()
            .ok_or_else(|| {
                RepositoryError::not_found(
                    COMPONENT_VERSION.entity,
                    "lookup_by_names",
                    format!("{}/{}", component_name, release_name),
                )
            })
    }

    /// 发布下的全部有效组件版本
    pub fn list_for_release(&self, release_id: i64) -> RepositoryResult<Vec<ComponentVersion>> {
        self.table
            .find_where("list_for_release", &["release_id"], &[Value::Integer(release_id)], true)
    }

    /// 组件在各发布中的有效版本
    pub fn list_for_component(&self, component_id: i64) -> RepositoryResult<Vec<ComponentVersion>> {
        self.table.find_where(
            "list_for_component",
            &["component_id"],
            &[Value::Integer(component_id)],
            true,
        )
    }

    // ==========================================
    // 变更请求关联
    // ==========================================

    /// 组件版本关联的有效变更请求
    pub fn change_requests(&self, component_version_id: i64) -> RepositoryResult<Vec<ChangeRequest>> {
        self.change_requests.related_right(component_version_id)
    }

    pub fn change_request_ids(&self, component_version_id: i64) -> RepositoryResult<Vec<i64>> {
        self.change_requests.right_ids_for(component_version_id)
    }

    pub fn add_change_request(
        &self,
        component_version_id: i64,
        change_request_id: i64,
        actor: &str,
    ) -> RepositoryResult<Link> {
        self.change_requests
            .add_link(component_version_id, change_request_id, actor)
    }

    pub fn remove_change_request(
        &self,
        component_version_id: i64,
        change_request_id: i64,
        actor: &str,
    ) -> RepositoryResult<()> {
        self.change_requests
            .remove_link(component_version_id, change_request_id, actor)
    }
}
