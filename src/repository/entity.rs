// ==========================================
// 工具包发布跟踪系统 - 行映射契约
// ==========================================
// 职责: 一张表 ↔ 一个结构体 的双向映射
// 红线: 映射只做字段转换，不含业务逻辑
// ==========================================

use crate::domain::audit::Audit;
use crate::repository::table_def::{
    AuditMode, TableDef, CREATED_BY, CREATED_ON, DELETED_BY, DELETED_ON, UPDATED_BY, UPDATED_ON,
};
use rusqlite::types::Value;
use rusqlite::Row;

/// 实体表映射
///
/// 读取按列名进行，因此 SELECT 列顺序可以自由调整（JOIN 查询需 `t.col AS col`）。
pub trait Entity: Sized {
    /// 表结构元数据
    const TABLE: &'static TableDef;

    fn id(&self) -> i64;

    /// 数据列的绑定值，顺序与 `TABLE.columns` 一致
    fn column_values(&self) -> Vec<Value>;

    /// 从结果行构造
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;

    fn audit(&self) -> Option<&Audit> {
        None
    }

    /// 集合查询使用的键
    fn id_key(&self) -> String {
        self.id().to_string()
    }

    fn is_deleted(&self) -> bool {
        self.audit().map(|a| a.is_deleted()).unwrap_or(false)
    }
}

/// 按审计模式读取审计列
pub fn read_audit(row: &Row<'_>, mode: AuditMode) -> rusqlite::Result<Audit> {
    let mut audit = Audit::default();
    if mode.has_created() {
        audit.created_by = row.get(CREATED_BY)?;
        audit.created_on = row.get(CREATED_ON)?;
    }
    if mode.soft_delete() {
        audit.updated_by = row.get(UPDATED_BY)?;
        audit.updated_on = row.get(UPDATED_ON)?;
        audit.deleted_by = row.get(DELETED_BY)?;
        audit.deleted_on = row.get(DELETED_ON)?;
    }
    Ok(audit)
}

/// 可空文本
pub fn opt_text(v: &Option<String>) -> Value {
    match v {
        Some(s) => Value::Text(s.clone()),
        None => Value::Null,
    }
}

/// 可空整数
pub fn opt_int(v: Option<i64>) -> Value {
    match v {
        Some(i) => Value::Integer(i),
        None => Value::Null,
    }
}

pub fn text(v: &str) -> Value {
    Value::Text(v.to_string())
}
