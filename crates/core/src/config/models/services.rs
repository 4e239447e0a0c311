use serde::{Deserialize, Serialize};

/// 从 `host:port` 形式的监听地址中取出端口
fn port_of(bind_address: &str) -> Option<u16> {
    bind_address.rsplit_once(':')?.1.parse().ok()
}

fn validate_bind_address(bind_address: &str, field: &str) -> anyhow::Result<()> {
    match port_of(bind_address) {
        Some(port) if port > 0 => Ok(()),
        _ => Err(anyhow::anyhow!(
            "{} 必须是 host:port 格式: {}",
            field,
            bind_address
        )),
    }
}

/// 服务发现配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// 服务发现服务自身的监听地址
    pub bind_address: String,
    /// 其他服务访问服务发现的地址
    pub url: String,
    /// 自注册时对外公布的主机名，缺省使用本机主机名
    pub advertise_host: Option<String>,
    /// 请求服务发现及上游服务的超时时间（秒）
    pub request_timeout_seconds: u64,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".to_string(),
            url: "http://127.0.0.1:8000".to_string(),
            advertise_host: None,
            request_timeout_seconds: 10,
        }
    }
}

impl DiscoveryConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        validate_bind_address(&self.bind_address, "discovery.bind_address")?;

        if !self.url.starts_with("http://") && !self.url.starts_with("https://") {
            return Err(anyhow::anyhow!("服务发现URL必须是http(s)格式: {}", self.url));
        }

        if matches!(self.advertise_host.as_deref(), Some(host) if host.trim().is_empty()) {
            return Err(anyhow::anyhow!("advertise_host 不能为空字符串"));
        }

        if self.request_timeout_seconds == 0 {
            return Err(anyhow::anyhow!("请求超时时间必须大于0"));
        }

        Ok(())
    }
}

/// 滑动窗口限流配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub enabled: bool,
    /// 每个客户端在窗口内允许的最大请求数
    pub max_requests: u32,
    pub window_seconds: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_requests: 10,
            window_seconds: 60,
        }
    }
}

impl RateLimitConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.enabled {
            if self.max_requests == 0 {
                return Err(anyhow::anyhow!(
                    "rate_limit.max_requests must be greater than 0"
                ));
            }
            if self.window_seconds == 0 {
                return Err(anyhow::anyhow!(
                    "rate_limit.window_seconds must be greater than 0"
                ));
            }
        }
        Ok(())
    }
}

/// 预测网关配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub bind_address: String,
    /// 在服务发现中注册的名称
    pub service_name: String,
    pub rate_limit: RateLimitConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:5000".to_string(),
            service_name: "predservice".to_string(),
            rate_limit: RateLimitConfig::default(),
        }
    }
}

impl GatewayConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        validate_bind_address(&self.bind_address, "gateway.bind_address")?;
        if self.service_name.trim().is_empty() {
            return Err(anyhow::anyhow!("网关服务名称不能为空"));
        }
        self.rate_limit.validate()
    }

    pub fn port(&self) -> u16 {
        port_of(&self.bind_address).unwrap_or_default()
    }
}

/// 训练触发器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub bind_address: String,
    pub service_name: String,
    /// 提供训练数据的服务在服务发现中的名称
    pub data_service_name: String,
    /// 允许训练的目标列
    pub targets: Vec<String>,
    /// 读取训练水位时校验的共享密钥（`x-api-key` 请求头），为空则不校验
    pub api_key: Option<String>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3001".to_string(),
            service_name: "trainservice".to_string(),
            data_service_name: "dataservice".to_string(),
            targets: vec![
                "euro95_1".to_string(),
                "diesel_2".to_string(),
                "lpg_3".to_string(),
            ],
            api_key: None,
        }
    }
}

impl TrainingConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        validate_bind_address(&self.bind_address, "training.bind_address")?;

        if self.service_name.trim().is_empty() {
            return Err(anyhow::anyhow!("训练服务名称不能为空"));
        }

        if self.data_service_name.trim().is_empty() {
            return Err(anyhow::anyhow!("数据服务名称不能为空"));
        }

        if self.targets.is_empty() {
            return Err(anyhow::anyhow!("训练目标列表不能为空"));
        }

        if self.targets.iter().any(|t| t.trim().is_empty()) {
            return Err(anyhow::anyhow!("训练目标名称不能为空"));
        }

        Ok(())
    }

    pub fn port(&self) -> u16 {
        port_of(&self.bind_address).unwrap_or_default()
    }
}

/// 可观测性配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub log_level: String,
    pub metrics_enabled: bool,
    pub metrics_endpoint: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
            metrics_endpoint: "/metrics".to_string(),
        }
    }
}

impl ObservabilityConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(anyhow::anyhow!(
                "无效的日志级别: {}，支持的级别: {:?}",
                self.log_level,
                valid_levels
            ));
        }

        if self.metrics_enabled && !self.metrics_endpoint.starts_with('/') {
            return Err(anyhow::anyhow!("指标端点必须以 / 开头"));
        }

        Ok(())
    }
}
