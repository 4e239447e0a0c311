use fuelcast_core::{OrchestratorError, OrchestratorResult, RateLimitConfig};
use metrics::counter;
use std::collections::{HashMap, VecDeque};
use std::net::IpAddr;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// 按客户端地址的滑动窗口限流器
///
/// 每个地址保留窗口内的请求时间戳，超过上限的请求立即失败，不排队。
#[derive(Debug)]
pub struct SlidingWindowLimiter {
    max_requests: usize,
    window: Duration,
    clients: Mutex<HashMap<IpAddr, VecDeque<Instant>>>,
}

impl SlidingWindowLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests: max_requests as usize,
            window,
            clients: Mutex::new(HashMap::new()),
        }
    }

    /// 配置中关闭限流时返回 `None`
    pub fn from_config(config: &RateLimitConfig) -> Option<Self> {
        config.enabled.then(|| {
            Self::new(
                config.max_requests,
                Duration::from_secs(config.window_seconds),
            )
        })
    }

    pub fn check(&self, client: IpAddr) -> OrchestratorResult<()> {
        self.check_at(client, Instant::now())
    }

    fn check_at(&self, client: IpAddr, now: Instant) -> OrchestratorResult<()> {
        let mut clients = self.clients.lock().unwrap_or_else(|e| e.into_inner());
        let hits = clients.entry(client).or_default();

        while let Some(oldest) = hits.front() {
            if now.duration_since(*oldest) >= self.window {
                hits.pop_front();
            } else {
                break;
            }
        }

        if hits.len() >= self.max_requests {
            counter!("fuelcast_rate_limited_total").increment(1);
            warn!("Rate limit exceeded for client {}", client);
            return Err(OrchestratorError::RateLimited {
                client: client.to_string(),
            });
        }

        hits.push_back(now);
        Ok(())
    }

    /// 清理窗口内没有请求的客户端
    pub fn prune(&self) {
        let now = Instant::now();
        let mut clients = self.clients.lock().unwrap_or_else(|e| e.into_inner());
        let before = clients.len();
        clients.retain(|_, hits| {
            hits.back()
                .is_some_and(|newest| now.duration_since(*newest) < self.window)
        });
        debug!("Pruned {} idle rate limit entries", before - clients.len());
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn tracked_clients(&self) -> usize {
        self.clients.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}
