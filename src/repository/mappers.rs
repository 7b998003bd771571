// ==========================================
// 工具包发布跟踪系统 - 各表行映射
// ==========================================
// 对齐: tables.rs 中每个 TableDef 的列顺序
// ==========================================

use crate::domain::audit::Audit;
use crate::domain::catalog::{
    ChangeRequestStatus, Component, ComponentType, Location, Platform, Release, StageName,
};
use crate::domain::change::{ChangeRequest, CodeUpdate, FileVersion};
use crate::domain::delivery::{ComponentUpdate, Deliverable, DeliverableUpdate};
use crate::domain::tool_kit::{ComponentPackage, ComponentTkVersion, ComponentVersion, ToolKit};
use crate::repository::entity::{opt_int, opt_text, read_audit, text, Entity};
use crate::repository::table_def::TableDef;
use crate::repository::tables;
use rusqlite::types::Value;
use rusqlite::Row;

// ==========================================
// 基础实体
// ==========================================

impl Entity for Component {
    const TABLE: &'static TableDef = &tables::COMPONENT;

    fn id(&self) -> i64 {
        self.id
    }

    fn column_values(&self) -> Vec<Value> {
        vec![text(&self.name), opt_text(&self.description)]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("component_id")?,
            name: row.get("name")?,
            description: row.get("description")?,
            audit: read_audit(row, Self::TABLE.audit)?,
        })
    }

    fn audit(&self) -> Option<&Audit> {
        Some(&self.audit)
    }
}

impl Entity for ComponentType {
    const TABLE: &'static TableDef = &tables::COMPONENT_TYPE;

    fn id(&self) -> i64 {
        self.id
    }

    fn column_values(&self) -> Vec<Value> {
        vec![text(&self.name), opt_text(&self.description)]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("component_type_id")?,
            name: row.get("name")?,
            description: row.get("description")?,
            audit: read_audit(row, Self::TABLE.audit)?,
        })
    }

    fn audit(&self) -> Option<&Audit> {
        Some(&self.audit)
    }
}

impl Entity for Release {
    const TABLE: &'static TableDef = &tables::RELEASE;

    fn id(&self) -> i64 {
        self.id
    }

    fn column_values(&self) -> Vec<Value> {
        vec![text(&self.name), opt_text(&self.description)]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("release_id")?,
            name: row.get("name")?,
            description: row.get("description")?,
            audit: read_audit(row, Self::TABLE.audit)?,
        })
    }

    fn audit(&self) -> Option<&Audit> {
        Some(&self.audit)
    }
}

impl Entity for Platform {
    const TABLE: &'static TableDef = &tables::PLATFORM;

    fn id(&self) -> i64 {
        self.id
    }

    fn column_values(&self) -> Vec<Value> {
        vec![
            text(&self.name),
            opt_text(&self.short_name),
            opt_text(&self.description),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("platform_id")?,
            name: row.get("name")?,
            short_name: row.get("short_name")?,
            description: row.get("description")?,
            audit: read_audit(row, Self::TABLE.audit)?,
        })
    }

    fn audit(&self) -> Option<&Audit> {
        Some(&self.audit)
    }
}

impl Entity for Location {
    const TABLE: &'static TableDef = &tables::LOCATION;

    fn id(&self) -> i64 {
        self.id
    }

    fn column_values(&self) -> Vec<Value> {
        vec![text(&self.name), opt_text(&self.description)]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("location_id")?,
            name: row.get("name")?,
            description: row.get("description")?,
            audit: read_audit(row, Self::TABLE.audit)?,
        })
    }

    fn audit(&self) -> Option<&Audit> {
        Some(&self.audit)
    }
}

impl Entity for StageName {
    const TABLE: &'static TableDef = &tables::STAGE_NAME;

    fn id(&self) -> i64 {
        self.id
    }

    fn column_values(&self) -> Vec<Value> {
        vec![text(&self.name), opt_text(&self.description)]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("stage_name_id")?,
            name: row.get("name")?,
            description: row.get("description")?,
        })
    }
}

impl Entity for ChangeRequestStatus {
    const TABLE: &'static TableDef = &tables::CHANGE_REQUEST_STATUS;

    fn id(&self) -> i64 {
        self.id
    }

    fn column_values(&self) -> Vec<Value> {
        vec![text(&self.name), opt_text(&self.description)]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("change_request_status_id")?,
            name: row.get("name")?,
            description: row.get("description")?,
        })
    }
}

// ==========================================
// 工具包与组件版本
// ==========================================

impl Entity for ToolKit {
    const TABLE: &'static TableDef = &tables::TOOL_KIT;

    fn id(&self) -> i64 {
        self.id
    }

    fn column_values(&self) -> Vec<Value> {
        vec![
            text(&self.name),
            Value::Integer(self.release_id),
            Value::Integer(self.stage_name_id),
            opt_text(&self.description),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("tool_kit_id")?,
            name: row.get("name")?,
            release_id: row.get("release_id")?,
            stage_name_id: row.get("stage_name_id")?,
            description: row.get("description")?,
            audit: read_audit(row, Self::TABLE.audit)?,
        })
    }

    fn audit(&self) -> Option<&Audit> {
        Some(&self.audit)
    }
}

impl Entity for ComponentVersion {
    const TABLE: &'static TableDef = &tables::COMPONENT_VERSION;

    fn id(&self) -> i64 {
        self.id
    }

    fn column_values(&self) -> Vec<Value> {
        vec![
            Value::Integer(self.component_id),
            Value::Integer(self.release_id),
            opt_int(self.component_type_id),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("component_version_id")?,
            component_id: row.get("component_id")?,
            release_id: row.get("release_id")?,
            component_type_id: row.get("component_type_id")?,
            audit: read_audit(row, Self::TABLE.audit)?,
        })
    }

    fn audit(&self) -> Option<&Audit> {
        Some(&self.audit)
    }
}

impl Entity for ComponentTkVersion {
    const TABLE: &'static TableDef = &tables::COMPONENT_TK_VERSION;

    fn id(&self) -> i64 {
        self.id
    }

    fn column_values(&self) -> Vec<Value> {
        vec![
            Value::Integer(self.component_version_id),
            Value::Integer(self.tool_kit_id),
            Value::Integer(if self.ready_for_release { 1 } else { 0 }),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("component_tk_version_id")?,
            component_version_id: row.get("component_version_id")?,
            tool_kit_id: row.get("tool_kit_id")?,
            ready_for_release: row.get::<_, i64>("ready_for_release")? != 0,
            audit: read_audit(row, Self::TABLE.audit)?,
        })
    }

    fn audit(&self) -> Option<&Audit> {
        Some(&self.audit)
    }
}

impl Entity for ComponentPackage {
    const TABLE: &'static TableDef = &tables::COMPONENT_PACKAGE;

    fn id(&self) -> i64 {
        self.id
    }

    fn column_values(&self) -> Vec<Value> {
        vec![text(&self.name), opt_text(&self.description)]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("component_package_id")?,
            name: row.get("name")?,
            description: row.get("description")?,
            audit: read_audit(row, Self::TABLE.audit)?,
        })
    }

    fn audit(&self) -> Option<&Audit> {
        Some(&self.audit)
    }
}

// ==========================================
// 变更请求与代码更新
// ==========================================

impl Entity for ChangeRequest {
    const TABLE: &'static TableDef = &tables::CHANGE_REQUEST;

    fn id(&self) -> i64 {
        self.id
    }

    fn column_values(&self) -> Vec<Value> {
        vec![
            text(&self.name),
            opt_text(&self.description),
            Value::Integer(self.status_id),
            opt_int(self.severity),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("change_request_id")?,
            name: row.get("name")?,
            description: row.get("description")?,
            status_id: row.get("status_id")?,
            severity: row.get("severity")?,
            audit: read_audit(row, Self::TABLE.audit)?,
        })
    }

    fn audit(&self) -> Option<&Audit> {
        Some(&self.audit)
    }
}

impl Entity for CodeUpdate {
    const TABLE: &'static TableDef = &tables::CODE_UPDATE;

    fn id(&self) -> i64 {
        self.id
    }

    fn column_values(&self) -> Vec<Value> {
        vec![
            Value::Integer(self.component_version_id),
            text(&self.revision),
            opt_text(&self.description),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("code_update_id")?,
            component_version_id: row.get("component_version_id")?,
            revision: row.get("revision")?,
            description: row.get("description")?,
            audit: read_audit(row, Self::TABLE.audit)?,
        })
    }

    fn audit(&self) -> Option<&Audit> {
        Some(&self.audit)
    }
}

impl Entity for FileVersion {
    const TABLE: &'static TableDef = &tables::FILE_VERSION;

    fn id(&self) -> i64 {
        self.id
    }

    fn column_values(&self) -> Vec<Value> {
        vec![
            Value::Integer(self.code_update_id),
            text(&self.file_name),
            text(&self.revision),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("file_version_id")?,
            code_update_id: row.get("code_update_id")?,
            file_name: row.get("file_name")?,
            revision: row.get("revision")?,
            audit: read_audit(row, Self::TABLE.audit)?,
        })
    }

    fn audit(&self) -> Option<&Audit> {
        Some(&self.audit)
    }
}

// ==========================================
// 交付物
// ==========================================

impl Entity for Deliverable {
    const TABLE: &'static TableDef = &tables::DELIVERABLE;

    fn id(&self) -> i64 {
        self.id
    }

    fn column_values(&self) -> Vec<Value> {
        vec![
            text(&self.name),
            Value::Integer(self.component_tk_version_id),
            opt_int(self.platform_id),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("deliverable_id")?,
            name: row.get("name")?,
            component_tk_version_id: row.get("component_tk_version_id")?,
            platform_id: row.get("platform_id")?,
            audit: read_audit(row, Self::TABLE.audit)?,
        })
    }

    fn audit(&self) -> Option<&Audit> {
        Some(&self.audit)
    }
}

impl Entity for DeliverableUpdate {
    const TABLE: &'static TableDef = &tables::DELIVERABLE_UPDATE;

    fn id(&self) -> i64 {
        self.id
    }

    fn column_values(&self) -> Vec<Value> {
        vec![Value::Integer(self.deliverable_id), opt_text(&self.description)]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("deliverable_update_id")?,
            deliverable_id: row.get("deliverable_id")?,
            description: row.get("description")?,
            audit: read_audit(row, Self::TABLE.audit)?,
        })
    }

    fn audit(&self) -> Option<&Audit> {
        Some(&self.audit)
    }
}

impl Entity for ComponentUpdate {
    const TABLE: &'static TableDef = &tables::COMPONENT_UPDATE;

    fn id(&self) -> i64 {
        self.id
    }

    fn column_values(&self) -> Vec<Value> {
        vec![
            Value::Integer(self.component_tk_version_id),
            opt_text(&self.description),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("component_update_id")?,
            component_tk_version_id: row.get("component_tk_version_id")?,
            description: row.get("description")?,
            audit: read_audit(row, Self::TABLE.audit)?,
        })
    }

    fn audit(&self) -> Option<&Audit> {
        Some(&self.audit)
    }
}
