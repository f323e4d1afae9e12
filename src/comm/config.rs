use anyhow::{anyhow, Result};
use config::{Config, ConfigBuilder, Environment, File, FileFormat};
use lazy_static::lazy_static;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

lazy_static! {
    static ref GLOBAL_CONFIG_MANAGER: RwLock<Option<Arc<ConfigManager>>> = RwLock::new(None);
}

/// 环境变量前缀 / Environment variable prefix (`DLQ_SERVER_PORT=8080`)
pub const ENV_PREFIX: &str = "DLQ";

/// 配置数据源信息 / Config source info
#[derive(Debug, Clone)]
pub struct ConfigSourceInfo {
    pub source_type: String,
    pub description: String,
    pub priority: u8,
    pub loaded: bool,
}

/// 配置管理器 / Layered configuration manager
pub struct ConfigManager {
    config: Config,
    sources_info: Vec<ConfigSourceInfo>,
}

impl ConfigManager {
    /// 创建配置管理器（仅默认配置源）/ Create with default sources only
    pub fn new() -> Result<Self> {
        Self::with_sources(vec![])
    }

    /// 使用指定的配置源创建配置管理器
    /// Create with extra sources; later sources win over earlier ones.
    pub fn with_sources(sources: Vec<ConfigSource>) -> Result<Self> {
        let mut builder = Config::builder();
        let mut sources_info = Vec::new();

        // 优先级：环境变量 > production.toml > default.toml > development.toml
        // Priority: env > production.toml > default.toml > development.toml
        let default_sources = vec![
            ConfigSource::File {
                path: "config/development.toml".to_string(),
                format: Some(FileFormat::Toml),
                required: false,
            },
            ConfigSource::File {
                path: "config/default.toml".to_string(),
                format: Some(FileFormat::Toml),
                required: false,
            },
            ConfigSource::File {
                path: "config/production.toml".to_string(),
                format: Some(FileFormat::Toml),
                required: false,
            },
            ConfigSource::Env {
                prefix: ENV_PREFIX.to_string(),
                separator: "_",
            },
        ];

        for (index, source) in default_sources.into_iter().chain(sources).enumerate() {
            let info = source.get_source_info(index as u8 + 1);

            if let ConfigSource::File { path, required, .. } = &source {
                let exists = std::path::Path::new(path).exists();
                if !exists && *required {
                    return Err(anyhow!("required config file is missing: {}", path));
                }
                if !exists {
                    sources_info.push(info);
                    continue;
                }
            }

            builder = source
                .add_to_builder(builder)
                .map_err(|e| anyhow!("failed to add config source: {}", e))?;
            sources_info.push(ConfigSourceInfo {
                loaded: true,
                ..info
            });
        }

        let config = builder
            .build()
            .map_err(|e| anyhow!("failed to build config: {}", e))?;
        Ok(Self {
            config,
            sources_info,
        })
    }

    /// 获取指定 key 的配置值 / Get a typed value
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        self.config
            .get(key)
            .map_err(|e| anyhow!("failed to read config '{}': {}", key, e))
    }

    /// 获取配置值，不存在时返回默认值 / Get a value or fall back to `default`
    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.get(key).unwrap_or(default)
    }

    /// 获取当前活跃的配置源 / Sources that were actually loaded
    pub fn get_active_sources(&self) -> Vec<&ConfigSourceInfo> {
        self.sources_info.iter().filter(|info| info.loaded).collect()
    }

    /// 记录配置源详细信息 / Log the config source table
    pub fn log_sources_info(&self) {
        for info in &self.sources_info {
            tracing::debug!(
                source_type = %info.source_type,
                priority = info.priority,
                loaded = info.loaded,
                "{}",
                info.description
            );
        }
        tracing::info!(
            total = self.sources_info.len(),
            loaded = self.get_active_sources().len(),
            "configuration sources resolved"
        );
    }
}

/// 配置源类型 / Config source kind
pub enum ConfigSource {
    /// 文件配置源 / File
    File {
        path: String,
        format: Option<FileFormat>,
        required: bool,
    },
    /// 环境变量配置源 / Environment variables
    Env {
        prefix: String,
        separator: &'static str,
    },
    /// 内存配置源，key 使用点分路径 / In-memory overrides keyed by dotted path
    Memory(HashMap<String, String>),
    /// 字符串配置源 / Inline string content
    String { content: String, format: FileFormat },
}

impl ConfigSource {
    pub fn get_source_info(&self, priority: u8) -> ConfigSourceInfo {
        let (source_type, description) = match self {
            ConfigSource::File { path, required, .. } => (
                "File",
                format!("file source: {} (required: {})", path, required),
            ),
            ConfigSource::Env { prefix, separator } => (
                "Environment",
                format!("environment source: prefix={}, separator={}", prefix, separator),
            ),
            ConfigSource::Memory(map) => ("Memory", format!("memory source: {} keys", map.len())),
            ConfigSource::String { .. } => ("String", "inline string source".to_string()),
        };
        ConfigSourceInfo {
            source_type: source_type.to_string(),
            description,
            priority,
            loaded: false,
        }
    }

    pub fn add_to_builder(
        self,
        builder: ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<ConfigBuilder<config::builder::DefaultState>> {
        match self {
            ConfigSource::File {
                path,
                format,
                required,
            } => {
                let file_source = match format {
                    Some(format) => File::new(&path, format),
                    None => File::with_name(&path),
                };
                Ok(builder.add_source(file_source.required(required)))
            }
            ConfigSource::Env { prefix, separator } => Ok(builder.add_source(
                Environment::with_prefix(&prefix)
                    .separator(separator)
                    .prefix_separator("_")
                    .try_parsing(true)
                    .ignore_empty(true),
            )),
            ConfigSource::Memory(map) => {
                let mut builder = builder;
                for (key, value) in map {
                    builder = builder
                        .set_override(key.as_str(), value)
                        .map_err(|e| anyhow!("invalid memory config key '{}': {}", key, e))?;
                }
                Ok(builder)
            }
            ConfigSource::String { content, format } => {
                Ok(builder.add_source(File::from_str(&content, format)))
            }
        }
    }
}

/// 获取全局配置管理器实例（单例）/ Process-wide manager, created on first use
pub fn get_global_config_manager() -> Result<Arc<ConfigManager>> {
    {
        let manager = GLOBAL_CONFIG_MANAGER
            .read()
            .map_err(|e| anyhow!("config manager lock poisoned: {}", e))?;
        if let Some(ref config_manager) = *manager {
            return Ok(Arc::clone(config_manager));
        }
    }
    let mut manager = GLOBAL_CONFIG_MANAGER
        .write()
        .map_err(|e| anyhow!("config manager lock poisoned: {}", e))?;
    match manager.as_ref() {
        Some(config_manager) => Ok(Arc::clone(config_manager)),
        None => {
            let config_manager = Arc::new(ConfigManager::new()?);
            *manager = Some(Arc::clone(&config_manager));
            Ok(config_manager)
        }
    }
}
