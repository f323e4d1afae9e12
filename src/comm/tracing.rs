use anyhow::{anyhow, Result};
use chrono::{Datelike, Timelike};
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_log::LogTracer;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Registry};

use crate::comm::config::get_global_config_manager;

struct LogTimer;

impl fmt::time::FormatTime for LogTimer {
    fn format_time(&self, w: &mut fmt::format::Writer<'_>) -> std::fmt::Result {
        let now = chrono::Local::now();
        let cs = now.timestamp_subsec_millis() / 10;
        let s = format!(
            "{:04}-{:02}-{:02}:{:02}:{:02}:{:02}:{:02}",
            now.year(),
            now.month(),
            now.day(),
            now.hour(),
            now.minute(),
            now.second(),
            cs
        );
        w.write_str(&s)
    }
}

/// 初始化全局日志（进程内仅调用一次）
/// Install the process-wide subscriber. Call once at startup.
///
/// - `RUST_LOG` 优先，否则读取 `logging.level` / `RUST_LOG` wins over `logging.level`
/// - `logging.json = true` 输出 bunyan JSON 行，否则输出紧凑文本
pub fn init_tracing() -> Result<()> {
    let mgr = get_global_config_manager().ok();
    let level: String = mgr
        .as_ref()
        .and_then(|m| m.get("logging.level").ok())
        .unwrap_or_else(|| "info".to_string());
    let json: bool = mgr
        .as_ref()
        .map(|m| m.get_or("logging.json", true))
        .unwrap_or(true);

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    if json {
        let formatting_layer =
            BunyanFormattingLayer::new(env!("CARGO_PKG_NAME").into(), std::io::stdout);
        let subscriber = Registry::default()
            .with(filter)
            .with(JsonStorageLayer)
            .with(formatting_layer);
        tracing::subscriber::set_global_default(subscriber)
            .map_err(|e| anyhow!("failed to install tracing subscriber: {}", e))?;
    } else {
        let subscriber = fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_timer(LogTimer)
            .compact()
            .with_target(false)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
            .map_err(|e| anyhow!("failed to install tracing subscriber: {}", e))?;
    }

    // actix / sqlx 的 `log` 记录转发到 tracing / forward `log` records into tracing
    LogTracer::init().ok();
    Ok(())
}
