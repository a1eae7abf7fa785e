use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::Level;

use crate::storage::DEFAULT_STORAGE_KEY;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("读取配置失败: {0}")]
    Io(#[from] io::Error),
    #[error("配置文件格式错误: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("无效的日志级别 `{0}`（可选 trace/debug/info/warn/error）")]
    LogLevel(String),
    #[error("无法获取用户{0}目录")]
    MissingDir(&'static str),
}

/// 配置文件 (~/.config/todo-latch/config.toml)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub storage_key: String,
    /// 数据目录，默认 ~/.local/share/todo-latch/
    pub data_dir: Option<PathBuf>,
    pub log_level: String,
    pub removal_delay_ms: u64,
    pub counter_animation_ms: u64,
    pub stagger_ms: u64,
    /// 每次渲染同时写出的 HTML 快照
    pub html_snapshot: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            data_dir: None,
            log_level: "info".to_string(),
            removal_delay_ms: 300,
            counter_animation_ms: 400,
            stagger_ms: 40,
            html_snapshot: None,
        }
    }
}

impl Config {
    /// 加载配置；文件不存在时使用默认值
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.log_level()?;
        Ok(config)
    }

    pub fn log_level(&self) -> Result<Level, ConfigError> {
        Level::from_str(&self.log_level).map_err(|_| ConfigError::LogLevel(self.log_level.clone()))
    }

    pub fn default_path() -> Result<PathBuf, ConfigError> {
        Ok(dirs::config_dir()
            .ok_or(ConfigError::MissingDir("配置"))?
            .join("todo-latch")
            .join("config.toml"))
    }

    /// 数据目录路径，必要时创建
    pub fn resolve_data_dir(&self) -> Result<PathBuf, ConfigError> {
        let data_dir = match &self.data_dir {
            Some(dir) => dir.clone(),
            None => dirs::data_dir()
                .ok_or(ConfigError::MissingDir("数据"))?
                .join("todo-latch"),
        };
        fs::create_dir_all(&data_dir)?;
        Ok(data_dir)
    }

    pub fn removal_delay(&self) -> Duration {
        Duration::from_millis(self.removal_delay_ms)
    }

    pub fn counter_animation(&self) -> Duration {
        Duration::from_millis(self.counter_animation_ms)
    }

    pub fn stagger(&self) -> Duration {
        Duration::from_millis(self.stagger_ms)
    }
}
