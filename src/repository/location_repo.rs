// ==========================================
// 工具包发布跟踪系统 - 安装位置仓储
// ==========================================
// 职责: location 表 + location_component_update 关联（软删除）
// ==========================================

use crate::domain::catalog::Location;
use crate::domain::delivery::ComponentUpdate;
use crate::domain::link::Link;
use crate::repository::error::RepositoryResult;
use crate::repository::join_repo::JoinRepository;
use crate::repository::table_repo::TableRepository;
use crate::repository::tables::LOCATION_COMPONENT_UPDATE;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

pub struct LocationRepository {
    table: TableRepository<Location>,
    component_updates: JoinRepository,
}

impl LocationRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            table: TableRepository::new(conn.clone()),
            component_updates: JoinRepository::new(&LOCATION_COMPONENT_UPDATE, conn),
        }
    }

    pub fn table(&self) -> &TableRepository<Location> {
        &self.table
    }

    /// 位置上当前有效的组件更新
    pub fn component_updates(&self, location_id: i64) -> RepositoryResult<Vec<ComponentUpdate>> {
        self.component_updates.related_right(location_id)
    }

    /// 安装组件更新到位置（已撤下的关联会被恢复）
    pub fn attach_component_update(
        &self,
        location_id: i64,
        component_update_id: i64,
        actor: &str,
    ) -> RepositoryResult<Link> {
        self.component_updates
            .add_link(location_id, component_update_id, actor)
    }

    /// 从位置撤下组件更新（软删除关联行）
    pub fn detach_component_update(
        &self,
        location_id: i64,
        component_update_id: i64,
        actor: &str,
    ) -> RepositoryResult<()> {
        self.component_updates
            .remove_link(location_id, component_update_id, actor)
    }

    /// 组件更新已安装到的位置
    pub fn locations_for_component_update(
        &self,
        component_update_id: i64,
    ) -> RepositoryResult<Vec<Location>> {
        self.component_updates.related_left(component_update_id)
    }
}
