// ==========================================
// 工具包发布跟踪系统 - 数据库配置
// ==========================================
// 职责: 配置加载与多级覆写
// 优先级（后者覆盖前者）: 默认值 → JSON 文件 → 环境变量
// ==========================================

use crate::db::DEFAULT_BUSY_TIMEOUT_MS;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

// ==========================================
// 环境变量名
// ==========================================
pub mod env_keys {
    pub const DB_PATH: &str = "TKDB_DB_PATH";
    pub const BUSY_TIMEOUT_MS: &str = "TKDB_BUSY_TIMEOUT_MS";
    pub const PERF_SQL: &str = "TKDB_PERF_SQL";
    pub const SLOW_SQL_MS: &str = "TKDB_SLOW_SQL_MS";
    pub const ACTOR: &str = "TKDB_ACTOR";
}

const APP_DIR: &str = "tk-release-db";
const DB_FILE: &str = "tk_release.db";

// ==========================================
// ConfigError - 配置错误
// ==========================================
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("读取配置文件失败 {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("配置文件格式错误: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("配置项 {key} 取值无效: {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("配置校验失败: {0}")]
    Validation(String),
}

// ==========================================
// DbConfig - 数据库配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DbConfig {
    pub db_path: String,
    pub busy_timeout_ms: u64,
    /// None: Debug 构建开启，Release 构建关闭
    pub trace_sql: Option<bool>,
    pub slow_sql_ms: Option<u64>,
    pub default_actor: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            trace_sql: None,
            slow_sql_ms: None,
            default_actor: default_actor(),
        }
    }
}

impl DbConfig {
    /// 按优先级加载配置并校验
    ///
    /// # 参数
    /// - file: 可选 JSON 配置文件
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match file {
            Some(path) => Self::from_json_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// 从 JSON 文件读取（缺省字段取默认值）
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config: DbConfig = serde_json::from_str(&text)?;
        tracing::debug!(path = %path.display(), "已加载配置文件");
        Ok(config)
    }

    /// 应用覆写源（环境变量或测试用的键值表）
    ///
    /// # 参数
    /// - get: 按变量名取值，空白值视为未设置
    pub fn apply_overrides<F>(&mut self, get: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            get(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(v) = read(env_keys::DB_PATH) {
            self.db_path = v;
        }
        if let Some(v) = read(env_keys::BUSY_TIMEOUT_MS) {
            self.busy_timeout_ms = parse_u64(env_keys::BUSY_TIMEOUT_MS, &v)?;
        }
        if let Some(v) = read(env_keys::PERF_SQL) {
            self.trace_sql = Some(is_true(&v));
        }
        if let Some(v) = read(env_keys::SLOW_SQL_MS) {
            self.slow_sql_ms = Some(parse_u64(env_keys::SLOW_SQL_MS, &v)?);
        }
        if let Some(v) = read(env_keys::ACTOR) {
            self.default_actor = v;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.db_path.trim().is_empty() {
            return Err(ConfigError::Validation("db_path 不能为空".to_string()));
        }
        if self.busy_timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "busy_timeout_ms 必须大于 0".to_string(),
            ));
        }
        if self.default_actor.trim().is_empty() {
            return Err(ConfigError::Validation("default_actor 不能为空".to_string()));
        }
        Ok(())
    }

    /// SQL 跟踪开关（未配置时按构建类型）
    pub fn trace_sql_enabled(&self) -> bool {
        self.trace_sql.unwrap_or(cfg!(debug_assertions))
    }

    /// 慢 SQL 阈值（毫秒）
    pub fn slow_sql_threshold_ms(&self) -> u64 {
        self.slow_sql_ms
            .unwrap_or(if cfg!(debug_assertions) { 50 } else { 200 })
    }
}

pub(crate) fn is_true(v: &str) -> bool {
    matches!(
        v.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "y" | "on"
    )
}

fn parse_u64(key: &'static str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    })
}

/// 默认操作人（审计列使用）
fn default_actor() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| "tkdb".to_string())
}

/// 默认数据库路径
///
/// - 用户数据目录下的 `tk-release-db/tk_release.db`
/// - 数据目录不可用时回退到当前目录
/// - 只计算路径，不创建目录（由 `DbSession::open` 在打开前创建）
/// - 环境变量 `TKDB_DB_PATH` 由 `apply_overrides` 处理
pub fn default_db_path() -> String {
    let path = match dirs::data_dir() {
        Some(data_dir) => data_dir.join(APP_DIR).join(DB_FILE),
        None => PathBuf::from(".").join(DB_FILE),
    };
    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn overrides(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn base() -> DbConfig {
        DbConfig {
            db_path: "/tmp/tk.db".to_string(),
            busy_timeout_ms: 1000,
            trace_sql: None,
            slow_sql_ms: None,
            default_actor: "alice".to_string(),
        }
    }

    #[test]
    fn test_overrides_take_precedence() {
        let mut config = base();
        config
            .apply_overrides(overrides(&[
                (env_keys::DB_PATH, " /data/release.db "),
                (env_keys::BUSY_TIMEOUT_MS, "250"),
                (env_keys::PERF_SQL, "on"),
                (env_keys::SLOW_SQL_MS, "10"),
                (env_keys::ACTOR, "bob"),
            ]))
            .unwrap();

        assert_eq!(config.db_path, "/data/release.db");
        assert_eq!(config.busy_timeout_ms, 250);
        assert!(config.trace_sql_enabled());
        assert_eq!(config.slow_sql_threshold_ms(), 10);
        assert_eq!(config.default_actor, "bob");
    }

    #[test]
    fn test_blank_override_is_ignored() {
        let mut config = base();
        config
            .apply_overrides(overrides(&[(env_keys::DB_PATH, "   ")]))
            .unwrap();
        assert_eq!(config.db_path, "/tmp/tk.db");
    }

    #[test]
    fn test_invalid_number_rejected() {
        let mut config = base();
        let err = config
            .apply_overrides(overrides(&[(env_keys::BUSY_TIMEOUT_MS, "soon")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key, .. } if key == env_keys::BUSY_TIMEOUT_MS));
    }

    #[test]
    fn test_validate() {
        assert!(base().validate().is_ok());

        let mut config = base();
        config.busy_timeout_ms = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));

        let mut config = base();
        config.db_path = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_json_file_with_partial_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"db_path": "/srv/tk.db", "trace_sql": false}}"#).unwrap();

        let config = DbConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.db_path, "/srv/tk.db");
        assert_eq!(config.busy_timeout_ms, DEFAULT_BUSY_TIMEOUT_MS);
        assert!(!config.trace_sql_enabled());
    }

    #[test]
    fn test_default_path_has_no_side_effects() {
        let path = PathBuf::from(default_db_path());
        assert!(path.ends_with(Path::new(APP_DIR).join(DB_FILE)) || path.ends_with(DB_FILE));

        // 反序列化缺省字段时不应触碰文件系统
        let config: DbConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.db_path, default_db_path());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = DbConfig::from_json_file(Path::new("/nonexistent/tkdb.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
