// ==========================================
// 工具包发布跟踪系统 - 关联行与状态历史
// ==========================================

use crate::domain::audit::Audit;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// Link - 关联表中的一行
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub id: Option<i64>, // 代理主键（仅部分关联表有）
    pub left_id: i64,
    pub right_id: i64,
    pub audit: Audit,
}

impl Link {
    /// 集合查询使用的键: 有代理主键用主键，否则为 "left_right"
    pub fn id_key(&self) -> String {
        match self.id {
            Some(id) => id.to_string(),
            None => format!("{}_{}", self.left_id, self.right_id),
        }
    }
}

// ==========================================
// StatusName - 状态名字典
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusName {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

// ==========================================
// StatusEvent - 一次状态变化
// ==========================================
// 说明: 状态变化以追加行记录，不做迁移合法性校验
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEvent {
    pub id: i64,
    pub parent_id: i64,
    pub status_name_id: i64,
    pub status_name: String,
    pub user_id: String,
    pub recorded_on: NaiveDateTime,
}
