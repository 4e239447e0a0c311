use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Arg, Command};
use fuelcast::{
    app::{AppMode, Application},
    common::init_logging,
    shutdown::{wait_for_shutdown_signal, ShutdownManager},
};
use fuelcast_core::AppConfig;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let matches = Command::new("fuelcast")
        .version(env!("CARGO_PKG_VERSION"))
        .about("燃料价格预测服务编排层")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("配置文件路径，缺省时按默认路径查找"),
        )
        .arg(
            Arg::new("mode")
                .short('m')
                .long("mode")
                .value_name("MODE")
                .help("运行模式")
                .value_parser(["discovery", "gateway", "training", "worker", "all"])
                .default_value("all"),
        )
        .arg(
            Arg::new("log-level")
                .short('l')
                .long("log-level")
                .value_name("LEVEL")
                .help("日志级别，缺省使用配置文件中的值")
                .value_parser(["trace", "debug", "info", "warn", "error"]),
        )
        .arg(
            Arg::new("log-format")
                .long("log-format")
                .value_name("FORMAT")
                .help("日志格式")
                .value_parser(["json", "pretty"])
                .default_value("pretty"),
        )
        .get_matches();

    let config_path = matches.get_one::<String>("config").map(String::as_str);
    let mode: AppMode = matches
        .get_one::<String>("mode")
        .map(String::as_str)
        .unwrap_or("all")
        .parse()?;
    let log_format = matches
        .get_one::<String>("log-format")
        .map(String::as_str)
        .unwrap_or("pretty");

    let config = AppConfig::load(config_path).with_context(|| {
        format!(
            "加载配置失败: {}",
            config_path.unwrap_or("<default paths>")
        )
    })?;

    let log_level = matches
        .get_one::<String>("log-level")
        .cloned()
        .unwrap_or_else(|| config.observability.log_level.clone());
    init_logging(&log_level, log_format)?;

    info!("Starting fuelcast {}", env!("CARGO_PKG_VERSION"));
    info!("Mode: {:?}", mode);

    let app = Application::new(config, mode).await?;
    let shutdown_manager = ShutdownManager::new();

    let mut app_handle = {
        let shutdown = shutdown_manager.clone();
        tokio::spawn(async move { app.run(shutdown).await })
    };

    tokio::select! {
        _ = wait_for_shutdown_signal() => {
            info!("Shutting down gracefully...");
        }
        result = &mut app_handle => {
            // 组件启动失败时不再等待信号
            return result.context("应用任务异常退出")?;
        }
    }
    shutdown_manager.shutdown().await;

    match tokio::time::timeout(Duration::from_secs(30), app_handle).await {
        Ok(Ok(Ok(()))) => info!("Application stopped"),
        Ok(Ok(Err(e))) => error!("Application failed: {:#}", e),
        Ok(Err(e)) => error!("Application task panicked: {}", e),
        Err(_) => warn!("Shutdown timed out, exiting"),
    }

    Ok(())
}
