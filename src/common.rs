use anyhow::{Context, Result};
use fuelcast_core::DiscoveryConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// 初始化日志系统
pub fn init_logging(log_level: &str, log_format: &str) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let registry = tracing_subscriber::registry().with(env_filter);

    match log_format {
        "json" => {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .try_init()
                .context("初始化JSON日志格式失败")?;
        }
        "pretty" => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty())
                .try_init()
                .context("初始化Pretty日志格式失败")?;
        }
        _ => {
            return Err(anyhow::anyhow!("不支持的日志格式: {log_format}"));
        }
    }

    Ok(())
}

/// 自注册时公布的主机名：优先使用配置，其次是本机主机名
pub fn advertise_host(config: &DiscoveryConfig) -> Result<String> {
    if let Some(host) = &config.advertise_host {
        return Ok(host.clone());
    }

    hostname::get()
        .context("读取本机主机名失败")?
        .into_string()
        .map_err(|raw| anyhow::anyhow!("主机名不是有效的UTF-8: {:?}", raw))
}

/// 屏蔽连接URL中的密码
///
/// 只在 `scheme://` 之后的认证段内查找 `user:password@`，没有密码的URL原样返回。
pub fn mask_url(url: &str) -> String {
    let authority_start = url.find("://").map_or(0, |pos| pos + 3);
    let authority_end = url[authority_start..]
        .find('/')
        .map_or(url.len(), |pos| authority_start + pos);
    let authority = &url[authority_start..authority_end];

    if let Some(at_pos) = authority.rfind('@') {
        if let Some(colon_pos) = authority[..at_pos].find(':') {
            let mut masked = url.to_string();
            masked.replace_range(
                authority_start + colon_pos + 1..authority_start + at_pos,
                "***",
            );
            return masked;
        }
    }
    url.to_string()
}
