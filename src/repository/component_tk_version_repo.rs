// ==========================================
// 工具包发布跟踪系统 - 组件工具包版本仓储
// ==========================================
// 职责: component_tk_version 表 + component_package_tk_version 关联
// ==========================================

use crate::domain::link::Link;
use crate::domain::tool_kit::{ComponentPackage, ComponentTkVersion};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::join_repo::JoinRepository;
use crate::repository::table_repo::TableRepository;
use crate::repository::tables::{COMPONENT_PACKAGE_TK_VERSION, COMPONENT_TK_VERSION};
use rusqlite::types::Value;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

// ==========================================
// ComponentTkVersionRepository
// ==========================================
pub struct ComponentTkVersionRepository {
    table: TableRepository<ComponentTkVersion>,
    packages: JoinRepository,
}

impl ComponentTkVersionRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            table: TableRepository::new(conn.clone()),
            packages: JoinRepository::new(&COMPONENT_PACKAGE_TK_VERSION, conn),
        }
    }

    pub fn table(&self) -> &TableRepository<ComponentTkVersion> {
        &self.table
    }

    /// 按 (组件版本, 工具包) 查询，必须存在
    pub fn lookup_by_version_tool_kit(
        &self,
        component_version_id: i64,
        tool_kit_id: i64,
    ) -> RepositoryResult<ComponentTkVersion> {
        self.table
            .find_one_where(
                "lookup_by_version_tool_kit",
                &["component_version_id", "tool_kit_id"],
                &[
                    Value::Integer(component_version_id),
                    Value::Integer(tool_kit_id),
                ],
            )?
            .ok_or_else(|| {
                RepositoryError::not_found(
                    COMPONENT_TK_VERSION.entity,
                    "lookup_by_version_tool_kit",
                    format!("version={} tool_kit={}", component_version_id, tool_kit_id),
                )
            })
    }

    pub fn list_for_tool_kit(&self, tool_kit_id: i64) -> RepositoryResult<Vec<ComponentTkVersion>> {
        self.table.find_where(
            "list_for_tool_kit",
            &["tool_kit_id"],
            &[Value::Integer(tool_kit_id)],
            true,
        )
    }

    /// 工具包中已可发布的组件
    pub fn list_ready_for_tool_kit(
        &self,
        tool_kit_id: i64,
    ) -> RepositoryResult<Vec<ComponentTkVersion>> {
        self.table.find_where(
            "list_ready_for_tool_kit",
            &["tool_kit_id", "ready_for_release"],
            &[Value::Integer(tool_kit_id), Value::Integer(1)],
            true,
        )
    }

    /// 设置可发布标志（只改写 ready_for_release 列）
    pub fn set_ready_for_release(
        &self,
        id: i64,
        ready: bool,
        actor: &str,
    ) -> RepositoryResult<ComponentTkVersion> {
        self.table
            .update_columns(id, &[("ready_for_release", Value::Integer(ready as i64))], actor)
    }

    // ==========================================
    // 组件包关联
    // ==========================================

    pub fn packages(&self, component_tk_version_id: i64) -> RepositoryResult<Vec<ComponentPackage>> {
        self.packages.related_left(component_tk_version_id)
    }

    pub fn add_package(
        &self,
        component_package_id: i64,
        component_tk_version_id: i64,
        actor: &str,
    ) -> RepositoryResult<Link> {
        self.packages
            .add_link(component_package_id, component_tk_version_id, actor)
    }

    pub fn remove_package(
        &self,
        component_package_id: i64,
        component_tk_version_id: i64,
        actor: &str,
    ) -> RepositoryResult<()> {
        self.packages
            .remove_link(component_package_id, component_tk_version_id, actor)
    }
}
