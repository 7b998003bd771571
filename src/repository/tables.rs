// ==========================================
// 工具包发布跟踪系统 - 表目录
// ==========================================
// 对齐: schema.rs 中的 DDL（列名即与数据库的契约）
// ==========================================

use crate::repository::table_def::{AuditMode, HistoryDef, JoinDef, TableDef};

// ===== 基础查找表 =====

pub const COMPONENT_TYPE: TableDef = TableDef {
    entity: "ComponentType",
    table: "component_type",
    id_column: "component_type_id",
    columns: &["name", "description"],
    name_column: Some("name"),
    audit: AuditMode::Full,
};

pub const COMPONENT: TableDef = TableDef {
    entity: "Component",
    table: "component",
    id_column: "component_id",
    columns: &["name", "description"],
    name_column: Some("name"),
    audit: AuditMode::Full,
};

pub const RELEASE: TableDef = TableDef {
    entity: "Release",
    table: "tk_release",
    id_column: "release_id",
    columns: &["name", "description"],
    name_column: Some("name"),
    audit: AuditMode::Full,
};

pub const PLATFORM: TableDef = TableDef {
    entity: "Platform",
    table: "platform",
    id_column: "platform_id",
    columns: &["name", "short_name", "description"],
    name_column: Some("name"),
    audit: AuditMode::Created,
};

pub const LOCATION: TableDef = TableDef {
    entity: "Location",
    table: "location",
    id_column: "location_id",
    columns: &["name", "description"],
    name_column: Some("name"),
    audit: AuditMode::Full,
};

pub const STAGE_NAME: TableDef = TableDef {
    entity: "StageName",
    table: "stage_name",
    id_column: "stage_name_id",
    columns: &["name", "description"],
    name_column: Some("name"),
    audit: AuditMode::None,
};

pub const CHANGE_REQUEST_STATUS: TableDef = TableDef {
    entity: "ChangeRequestStatus",
    table: "change_request_status",
    id_column: "change_request_status_id",
    columns: &["name", "description"],
    name_column: Some("name"),
    audit: AuditMode::None,
};

// ===== 工具包与组件版本 =====

pub const TOOL_KIT: TableDef = TableDef {
    entity: "ToolKit",
    table: "tool_kit",
    id_column: "tool_kit_id",
    columns: &["name", "release_id", "stage_name_id", "description"],
    name_column: Some("name"),
    audit: AuditMode::Full,
};

pub const COMPONENT_VERSION: TableDef = TableDef {
    entity: "ComponentVersion",
    table: "component_version",
    id_column: "component_version_id",
    columns: &["component_id", "release_id", "component_type_id"],
    name_column: None,
    audit: AuditMode::Full,
};

pub const COMPONENT_TK_VERSION: TableDef = TableDef {
    entity: "ComponentTkVersion",
    table: "component_tk_version",
    id_column: "component_tk_version_id",
    columns: &["component_version_id", "tool_kit_id", "ready_for_release"],
    name_column: None,
    audit: AuditMode::Full,
};

pub const COMPONENT_PACKAGE: TableDef = TableDef {
    entity: "ComponentPackage",
    table: "component_package",
    id_column: "component_package_id",
    columns: &["name", "description"],
    name_column: Some("name"),
    audit: AuditMode::Created,
};

// ===== 变更请求与代码更新 =====

pub const CHANGE_REQUEST: TableDef = TableDef {
    entity: "ChangeRequest",
    table: "change_request",
    id_column: "change_request_id",
    columns: &["name", "description", "status_id", "severity"],
    name_column: Some("name"),
    audit: AuditMode::Full,
};

pub const CODE_UPDATE: TableDef = TableDef {
    entity: "CodeUpdate",
    table: "code_update",
    id_column: "code_update_id",
    columns: &["component_version_id", "revision", "description"],
    name_column: None,
    audit: AuditMode::Created,
};

pub const FILE_VERSION: TableDef = TableDef {
    entity: "FileVersion",
    table: "file_version",
    id_column: "file_version_id",
    columns: &["code_update_id", "file_name", "revision"],
    name_column: None,
    audit: AuditMode::Created,
};

// ===== 交付物 =====

pub const DELIVERABLE: TableDef = TableDef {
    entity: "Deliverable",
    table: "deliverable",
    id_column: "deliverable_id",
    columns: &["name", "component_tk_version_id", "platform_id"],
    name_column: None,
    audit: AuditMode::Full,
};

pub const DELIVERABLE_UPDATE: TableDef = TableDef {
    entity: "DeliverableUpdate",
    table: "deliverable_update",
    id_column: "deliverable_update_id",
    columns: &["deliverable_id", "description"],
    name_column: None,
    audit: AuditMode::Created,
};

pub const COMPONENT_UPDATE: TableDef = TableDef {
    entity: "ComponentUpdate",
    table: "component_update",
    id_column: "component_update_id",
    columns: &["component_tk_version_id", "description"],
    name_column: None,
    audit: AuditMode::Created,
};

// ===== 关联表 =====

pub const COMP_VERSION_CHANGE_REQUEST: JoinDef = JoinDef {
    entity: "CompVersionChangeRequest",
    table: "comp_version_change_request",
    left_column: "component_version_id",
    right_column: "change_request_id",
    id_column: None,
    audit: AuditMode::Created,
};

pub const CHANGE_REQUEST_CODE_UPDATE: JoinDef = JoinDef {
    entity: "ChangeRequestCodeUpdate",
    table: "change_request_code_update",
    left_column: "change_request_id",
    right_column: "code_update_id",
    id_column: None,
    audit: AuditMode::Created,
};

pub const COMPONENT_PACKAGE_TK_VERSION: JoinDef = JoinDef {
    entity: "ComponentPackageTkVersion",
    table: "component_package_tk_version",
    left_column: "component_package_id",
    right_column: "component_tk_version_id",
    id_column: None,
    audit: AuditMode::None,
};

pub const DELIVERABLE_UPDATE_CODE_UPDATE: JoinDef = JoinDef {
    entity: "DeliverableUpdateCodeUpdate",
    table: "deliverable_update_code_update",
    left_column: "deliverable_update_id",
    right_column: "code_update_id",
    id_column: Some("link_id"),
    audit: AuditMode::Created,
};

pub const LOCATION_COMPONENT_UPDATE: JoinDef = JoinDef {
    entity: "LocationComponentUpdate",
    table: "location_component_update",
    left_column: "location_id",
    right_column: "component_update_id",
    id_column: None,
    audit: AuditMode::Full,
};

// ===== 状态历史表 =====

pub const CODE_UPDATE_STATUS: HistoryDef = HistoryDef {
    entity: "CodeUpdateStatus",
    table: "code_update_status",
    id_column: "code_update_status_id",
    parent_column: "code_update_id",
    status_table: "code_update_status_name",
};

pub const DELIVERABLE_UPDATE_STATUS: HistoryDef = HistoryDef {
    entity: "DeliverableUpdateStatus",
    table: "deliverable_update_status",
    id_column: "deliverable_update_status_id",
    parent_column: "deliverable_update_id",
    status_table: "deliverable_update_status_name",
};

// ==========================================
// 目录查询
// ==========================================

pub const ENTITY_TABLES: &[&TableDef] = &[
    &COMPONENT_TYPE,
    &COMPONENT,
    &RELEASE,
    &PLATFORM,
    &LOCATION,
    &STAGE_NAME,
    &CHANGE_REQUEST_STATUS,
    &TOOL_KIT,
    &COMPONENT_VERSION,
    &COMPONENT_TK_VERSION,
    &COMPONENT_PACKAGE,
    &CHANGE_REQUEST,
    &CODE_UPDATE,
    &FILE_VERSION,
    &DELIVERABLE,
    &DELIVERABLE_UPDATE,
    &COMPONENT_UPDATE,
];

pub const JOIN_TABLES: &[&JoinDef] = &[
    &COMP_VERSION_CHANGE_REQUEST,
    &CHANGE_REQUEST_CODE_UPDATE,
    &COMPONENT_PACKAGE_TK_VERSION,
    &DELIVERABLE_UPDATE_CODE_UPDATE,
    &LOCATION_COMPONENT_UPDATE,
];

pub const HISTORY_TABLES: &[&HistoryDef] = &[&CODE_UPDATE_STATUS, &DELIVERABLE_UPDATE_STATUS];

/// 按表名查找实体表定义
pub fn find_entity_table(name: &str) -> Option<&'static TableDef> {
    ENTITY_TABLES.iter().copied().find(|d| d.table == name)
}

/// 所有表名（实体表 + 关联表 + 状态历史表 + 状态名表）
pub fn all_table_names() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = ENTITY_TABLES.iter().map(|d| d.table).collect();
    names.extend(JOIN_TABLES.iter().map(|d| d.table));
    names.extend(HISTORY_TABLES.iter().map(|d| d.table));
    names.extend(HISTORY_TABLES.iter().map(|d| d.status_table));
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_table_names_unique() {
        let names = all_table_names();
        let unique: HashSet<_> = names.iter().collect();
        assert_eq!(names.len(), unique.len());
    }

    #[test]
    fn test_find_entity_table() {
        assert_eq!(find_entity_table("tool_kit").map(|d| d.entity), Some("ToolKit"));
        assert!(find_entity_table("comp_version_change_request").is_none());
    }
}
