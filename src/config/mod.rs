// ==========================================
// 工具包发布跟踪系统 - 配置层
// ==========================================
// 职责: 数据库连接与审计操作人的配置，支持多级覆写
// 来源: 默认值 / JSON 文件 / 环境变量
// ==========================================

pub mod db_config;

pub use db_config::{default_db_path, env_keys, ConfigError, DbConfig};
