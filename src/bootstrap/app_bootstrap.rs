use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::{Context, Result};
use tracing::{info, instrument};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{health, swagger::ApiDoc};
use crate::comm::config::{get_global_config_manager, ConfigManager};
use crate::command_registry::ServerArgs;
use crate::db::{connect_pool, run_migrations, DbSettings, StoreBackend};
use crate::modules::dlq::repo::{MemoryMessageRepository, MessageRepository, PgMessageRepository};
use crate::modules::dlq::controller::DEFAULT_MAX_BODY_BYTES;
use crate::modules::dlq::routes;
use crate::modules::dlq::service::{DlqService, DlqServiceImpl};

/// 应用配置结构体 / HTTP listener settings (`server.*`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
    /// JSON 请求体上限（字节）/ JSON request body cap in bytes
    pub max_body_bytes: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            workers: None,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl AppConfig {
    /// 从配置读取，缺省项使用默认值 / Read `server.*`, falling back to defaults
    pub fn from_config(mgr: &ConfigManager) -> Self {
        let defaults = Self::default();
        Self {
            host: mgr.get_or("server.host", defaults.host),
            port: mgr.get_or("server.port", defaults.port),
            workers: mgr.get::<usize>("server.workers").ok().filter(|w| *w > 0),
            max_body_bytes: mgr
                .get::<usize>("server.max_body_bytes")
                .ok()
                .filter(|n| *n > 0)
                .unwrap_or(defaults.max_body_bytes),
        }
    }

    /// 命令行参数覆盖配置 / Command-line flags win over config
    pub fn merge_args(mut self, args: &ServerArgs) -> Self {
        if let Some(host) = &args.host {
            self.host = host.clone();
        }
        if let Some(port) = args.port {
            self.port = port;
        }
        if let Some(workers) = args.workers {
            self.workers = Some(workers);
        }
        self
    }
}

/// 共享的应用状态：仓库与服务各一份，所有 worker 共用
/// Shared by every worker: one repository, one service over it.
#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<dyn MessageRepository>,
    pub service: Arc<dyn DlqService>,
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn new(repository: Arc<dyn MessageRepository>) -> Self {
        let service: Arc<dyn DlqService> = Arc::new(DlqServiceImpl::new(repository.clone()));
        Self {
            repository,
            service,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    /// 基于内存存储的状态 / State backed by the in-memory store
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryMessageRepository::new()))
    }

    /// 注入依赖并挂载全部路由 / Register app data and every route
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(web::Data::from(self.repository.clone()))
            .app_data(web::Data::from(self.service.clone()))
            .service(routes::scope(self.max_body_bytes))
            .configure(health::configure)
            // 通配路径以兼容静态资源与尾随斜杠
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            );
    }
}

/// 按配置打开存储 / Open the configured store, migrating if enabled
pub async fn open_repository(settings: &DbSettings) -> Result<Arc<dyn MessageRepository>> {
    match settings.backend {
        StoreBackend::Memory => {
            info!("using in-memory message store");
            Ok(Arc::new(MemoryMessageRepository::new()))
        }
        StoreBackend::Postgres => {
            let pool = connect_pool(settings)
                .await
                .context("failed to connect to postgres")?;
            if settings.migrate {
                run_migrations(&pool).await.context("migration failed")?;
            }
            info!(max_connections = settings.max_connections, "postgres pool ready");
            Ok(Arc::new(PgMessageRepository::new(pool)))
        }
    }
}

/// 应用启动器
pub struct AppBootstrap {
    config: Option<AppConfig>,
}

impl AppBootstrap {
    pub fn new() -> Self {
        Self { config: None }
    }

    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// 运行应用服务器，直到进程收到停止信号
    /// Run the HTTP server until shutdown.
    #[instrument(skip(self))]
    pub async fn run(self) -> Result<()> {
        let config_manager = get_global_config_manager()?;
        config_manager.log_sources_info();

        let config = match self.config {
            Some(config) => config,
            None => AppConfig::from_config(&config_manager),
        };
        let settings = DbSettings::from_config(&config_manager)?;
        info!(backend = %settings.backend, ?config, "starting dlq-store");

        let state = AppState::new(open_repository(&settings).await?)
            .with_max_body_bytes(config.max_body_bytes);
        Self::start_http_server(config, state).await
    }

    /// 仅执行表结构迁移 / Apply schema migrations and exit
    pub async fn migrate() -> Result<()> {
        let config_manager = get_global_config_manager()?;
        let settings = DbSettings::from_config(&config_manager)?;
        if settings.backend == StoreBackend::Memory {
            info!("memory backend has no schema, nothing to migrate");
            return Ok(());
        }
        let pool = connect_pool(&settings)
            .await
            .context("failed to connect to postgres")?;
        run_migrations(&pool).await.context("migration failed")?;
        pool.close().await;
        Ok(())
    }

    async fn start_http_server(config: AppConfig, state: AppState) -> Result<()> {
        let mut server = HttpServer::new(move || {
            let state = state.clone();
            App::new()
                .wrap(Logger::default())
                .configure(|cfg| state.configure(cfg))
        });
        if let Some(workers) = config.workers {
            server = server.workers(workers);
        }

        let addr = format!("{}:{}", config.host, config.port);
        info!("listening on {}", addr);
        server
            .bind(&addr)
            .with_context(|| format!("failed to bind {}", addr))?
            .run()
            .await
            .context("http server exited with error")?;

        info!("server stopped");
        Ok(())
    }
}

impl Default for AppBootstrap {
    fn default() -> Self {
        Self::new()
    }
}
