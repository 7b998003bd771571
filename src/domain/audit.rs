// ==========================================
// 工具包发布跟踪系统 - 审计列
// ==========================================
// 对齐: created_by/on, updated_by/on, deleted_by/on
// 约定: 操作人为用户 ID 文本，时间为本地时间（秒级）
// ==========================================

use chrono::{Local, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// 数据库时间戳格式
pub const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 当前本地时间（截断到秒，与库中存储精度一致）
pub fn now_ts() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

pub fn format_ts(ts: &NaiveDateTime) -> String {
    ts.format(TS_FORMAT).to_string()
}

/// 审计信息
///
/// 无审计列的表该结构全部为 None；仅 created 审计的表只填前两项。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Audit {
    pub created_by: Option<String>,
    pub created_on: Option<NaiveDateTime>,
    pub updated_by: Option<String>,
    pub updated_on: Option<NaiveDateTime>,
    pub deleted_by: Option<String>,
    pub deleted_on: Option<NaiveDateTime>,
}

impl Audit {
    /// 是否已软删除
    pub fn is_deleted(&self) -> bool {
        self.deleted_on.is_some()
    }

    /// 最近一次修改人（更新优先于创建）
    pub fn last_modified_by(&self) -> Option<&str> {
        self.updated_by
            .as_deref()
            .or(self.created_by.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_ts_has_no_fraction() {
        assert_eq!(now_ts().nanosecond(), 0);
    }

    #[test]
    fn test_format_ts() {
        let ts = NaiveDateTime::parse_from_str("2026-03-01 08:15:30", TS_FORMAT).unwrap();
        assert_eq!(format_ts(&ts), "2026-03-01 08:15:30");
    }

    #[test]
    fn test_last_modified_by() {
        let mut audit = Audit {
            created_by: Some("alice".to_string()),
            ..Default::default()
        };
        assert_eq!(audit.last_modified_by(), Some("alice"));
        audit.updated_by = Some("bob".to_string());
        assert_eq!(audit.last_modified_by(), Some("bob"));
        assert!(!audit.is_deleted());
    }
}
