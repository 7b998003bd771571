// ==========================================
// 工具包发布跟踪系统 - 表结构元数据
// ==========================================
// 职责: 以声明方式描述每张表（表名/主键/数据列/审计列）
// 说明: 通用仓储据此生成 SQL，不再为每张表手写映射类
// ==========================================

/// 审计列模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditMode {
    /// 无审计列，硬删除
    None,
    /// created_by / created_on，硬删除
    Created,
    /// created / updated / deleted 全套审计列，软删除
    Full,
}

pub const CREATED_BY: &str = "created_by";
pub const CREATED_ON: &str = "created_on";
pub const UPDATED_BY: &str = "updated_by";
pub const UPDATED_ON: &str = "updated_on";
pub const DELETED_BY: &str = "deleted_by";
pub const DELETED_ON: &str = "deleted_on";

impl AuditMode {
    pub fn columns(self) -> &'static [&'static str] {
        match self {
            AuditMode::None => &[],
            AuditMode::Created => &[CREATED_BY, CREATED_ON],
            AuditMode::Full => &[
                CREATED_BY, CREATED_ON, UPDATED_BY, UPDATED_ON, DELETED_BY, DELETED_ON,
            ],
        }
    }

    pub fn has_created(self) -> bool {
        self != AuditMode::None
    }

    pub fn soft_delete(self) -> bool {
        self == AuditMode::Full
    }
}

/// 实体表定义
#[derive(Debug)]
pub struct TableDef {
    /// 映射名（用于日志与错误上下文）
    pub entity: &'static str,
    pub table: &'static str,
    pub id_column: &'static str,
    /// 数据列（不含主键与审计列），顺序即绑定顺序
    pub columns: &'static [&'static str],
    /// 唯一名称列（支持按名称查询）
    pub name_column: Option<&'static str>,
    pub audit: AuditMode,
}

impl TableDef {
    /// SELECT 列顺序: 主键 + 数据列 + 审计列
    pub fn select_columns(&self) -> Vec<&'static str> {
        let mut cols = Vec::with_capacity(1 + self.columns.len() + 6);
        cols.push(self.id_column);
        cols.extend_from_slice(self.columns);
        cols.extend_from_slice(self.audit.columns());
        cols
    }

    /// 有效记录过滤条件（仅软删除表）
    pub fn active_filter(&self) -> Option<&'static str> {
        if self.audit.soft_delete() {
            Some("deleted_on IS NULL")
        } else {
            None
        }
    }
}

/// 关联表定义（多对多）
#[derive(Debug)]
pub struct JoinDef {
    pub entity: &'static str,
    pub table: &'static str,
    pub left_column: &'static str,
    pub right_column: &'static str,
    /// 代理主键（无则以左右键组合为身份）
    pub id_column: Option<&'static str>,
    pub audit: AuditMode,
}

impl JoinDef {
    pub fn select_columns(&self) -> Vec<&'static str> {
        let mut cols = Vec::with_capacity(3 + 6);
        if let Some(id) = self.id_column {
            cols.push(id);
        }
        cols.push(self.left_column);
        cols.push(self.right_column);
        cols.extend_from_slice(self.audit.columns());
        cols
    }

    pub fn active_filter(&self) -> Option<&'static str> {
        if self.audit.soft_delete() {
            Some("deleted_on IS NULL")
        } else {
            None
        }
    }
}

/// 状态历史表定义
///
/// 每次状态变化追加一行: 父记录 + 状态名 + 操作人 + 时间
#[derive(Debug)]
pub struct HistoryDef {
    pub entity: &'static str,
    pub table: &'static str,
    pub id_column: &'static str,
    pub parent_column: &'static str,
    /// 状态名查找表（列: status_name_id / name / description）
    pub status_table: &'static str,
}

pub const STATUS_NAME_ID: &str = "status_name_id";
pub const STATUS_USER_ID: &str = "user_id";
pub const STATUS_RECORDED_ON: &str = "recorded_on";

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: TableDef = TableDef {
        entity: "Sample",
        table: "sample",
        id_column: "sample_id",
        columns: &["name", "description"],
        name_column: Some("name"),
        audit: AuditMode::Full,
    };

    #[test]
    fn test_select_columns_order() {
        let cols = SAMPLE.select_columns();
        assert_eq!(cols[0], "sample_id");
        assert_eq!(cols[1], "name");
        assert_eq!(cols[3], CREATED_BY);
        assert_eq!(cols.len(), 9);
    }

    #[test]
    fn test_audit_mode_delete_policy() {
        assert!(AuditMode::Full.soft_delete());
        assert!(!AuditMode::Created.soft_delete());
        assert!(!AuditMode::None.has_created());
        assert_eq!(SAMPLE.active_filter(), Some("deleted_on IS NULL"));
    }
}
