use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::Router;
use fuelcast_api::{
    discovery_routes, prediction_routes, training_routes, with_observability, DiscoveryState,
    GatewayState, MetricsEndpoint, TrainingState,
};
use fuelcast_core::{AppConfig, Category, ServiceRecord};
use fuelcast_dispatcher::{
    DiscoveryClient, DiscoveryService, DispatchGateway, HttpDataSource, SlidingWindowLimiter,
    TrainingTrigger, WatermarkHook,
};
use fuelcast_infrastructure::{Backends, InMemoryServiceRegistry, TaskFabric};
use fuelcast_worker::{PredictionHandler, TrainingHandler, TrendTrainer, WorkerPool};
use futures::future::join_all;
use metrics_exporter_prometheus::PrometheusBuilder;
use tokio::{net::TcpListener, sync::broadcast, task::JoinHandle};
use tracing::{error, info, warn};

use crate::common::{advertise_host, mask_url};
use crate::shutdown::ShutdownManager;

const DISCOVERY_SERVICE_NAME: &str = "servicediscovery";

/// 应用运行模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    /// 仅运行服务发现
    Discovery,
    /// 仅运行预测网关
    Gateway,
    /// 仅运行训练触发器
    Training,
    /// 仅运行Worker池
    Worker,
    /// 在同一进程中运行所有组件
    All,
}

impl AppMode {
    fn includes(self, component: AppMode) -> bool {
        self == AppMode::All || self == component
    }
}

impl FromStr for AppMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "discovery" => Ok(AppMode::Discovery),
            "gateway" => Ok(AppMode::Gateway),
            "training" => Ok(AppMode::Training),
            "worker" => Ok(AppMode::Worker),
            "all" => Ok(AppMode::All),
            _ => Err(anyhow::anyhow!("不支持的运行模式: {s}")),
        }
    }
}

/// 主应用程序
pub struct Application {
    config: AppConfig,
    mode: AppMode,
    backends: Backends,
    metrics: Option<MetricsEndpoint>,
}

impl Application {
    pub async fn new(config: AppConfig, mode: AppMode) -> Result<Self> {
        info!("Initializing application in {:?} mode", mode);

        if config.backend.is_redis() {
            info!(
                "Connecting to Redis backend at {}",
                mask_url(&config.backend.redis_url)
            );
        }
        let backends = Backends::create(&config.backend)
            .await
            .context("创建队列后端失败")?;
        backends
            .fabric()
            .declare_queues()
            .await
            .context("声明任务队列失败")?;

        let metrics = if config.observability.metrics_enabled {
            let handle = PrometheusBuilder::new()
                .install_recorder()
                .context("安装Prometheus指标记录器失败")?;
            Some(MetricsEndpoint {
                path: config.observability.metrics_endpoint.clone(),
                handle,
            })
        } else {
            None
        };

        Ok(Self {
            config,
            mode,
            backends,
            metrics,
        })
    }

    /// 启动本模式包含的组件，直到收到关闭信号
    pub async fn run(&self, shutdown: ShutdownManager) -> Result<()> {
        info!("Starting application in {:?} mode", self.mode);

        let mut servers = Vec::new();
        let mut workers = Vec::new();

        // 服务发现先启动，其他组件才能自注册
        if self.mode.includes(AppMode::Discovery) {
            servers.push(self.start_discovery(&shutdown).await?);
        }
        if self.mode.includes(AppMode::Gateway) {
            servers.extend(self.start_gateway(&shutdown).await?);
        }
        if self.mode.includes(AppMode::Training) {
            servers.push(self.start_training(&shutdown).await?);
        }
        if self.mode.includes(AppMode::Worker) {
            workers.extend(self.start_workers(&shutdown).await?);
        }

        let mut shutdown_rx = shutdown.subscribe().await;
        let _ = shutdown_rx.recv().await;
        info!("Application received shutdown signal");

        // Worker会先完成手上的任务
        for result in join_all(workers).await {
            if let Err(e) = result {
                error!("Worker task ended abnormally: {}", e);
            }
        }
        for result in join_all(servers).await {
            if let Err(e) = result {
                error!("Server task ended abnormally: {}", e);
            }
        }

        info!("All components stopped");
        Ok(())
    }

    async fn start_discovery(&self, shutdown: &ShutdownManager) -> Result<JoinHandle<()>> {
        let state = DiscoveryState {
            discovery: DiscoveryService::new(Arc::new(InMemoryServiceRegistry::new())),
        };
        let router = with_observability(
            discovery_routes(state),
            DISCOVERY_SERVICE_NAME,
            self.metrics.as_ref(),
        );

        serve(
            DISCOVERY_SERVICE_NAME,
            &self.config.discovery.bind_address,
            router,
            shutdown,
        )
        .await
    }

    async fn start_gateway(&self, shutdown: &ShutdownManager) -> Result<Vec<JoinHandle<()>>> {
        let gateway_config = &self.config.gateway;
        let limiter = SlidingWindowLimiter::from_config(&gateway_config.rate_limit).map(Arc::new);

        let mut handles = Vec::new();
        if let Some(limiter) = &limiter {
            info!(
                "Rate limiting predictions to {} requests per {:?}",
                gateway_config.rate_limit.max_requests,
                limiter.window()
            );
            handles.push(spawn_limiter_pruner(
                limiter.clone(),
                shutdown.subscribe().await,
            ));
        }

        let state = GatewayState {
            gateway: DispatchGateway::new(self.backends.fabric()),
            limiter,
        };
        let router = with_observability(
            prediction_routes(state),
            &gateway_config.service_name,
            self.metrics.as_ref(),
        );

        handles.push(
            serve(
                "gateway",
                &gateway_config.bind_address,
                router,
                shutdown,
            )
            .await?,
        );
        self.register_self(&gateway_config.service_name, gateway_config.port())
            .await;

        Ok(handles)
    }

    async fn start_training(&self, shutdown: &ShutdownManager) -> Result<JoinHandle<()>> {
        let training_config = &self.config.training;

        let data_source = HttpDataSource::new(
            self.discovery_client()?,
            &training_config.data_service_name,
            self.request_timeout(),
        )
        .context("创建数据服务客户端失败")?;
        let trigger = TrainingTrigger::new(
            DispatchGateway::new(self.backends.fabric()),
            Arc::new(data_source),
            self.backends.watermarks.clone(),
            training_config.targets.clone(),
        );
        info!("Training targets: {:?}", trigger.targets());

        let router = with_observability(
            training_routes(TrainingState::new(trigger, training_config.api_key.clone())),
            &training_config.service_name,
            self.metrics.as_ref(),
        );

        let handle = serve(
            "training",
            &training_config.bind_address,
            router,
            shutdown,
        )
        .await?;
        self.register_self(&training_config.service_name, training_config.port())
            .await;

        Ok(handle)
    }

    async fn start_workers(&self, shutdown: &ShutdownManager) -> Result<Vec<JoinHandle<()>>> {
        let sender = shutdown
            .sender()
            .await
            .ok_or_else(|| anyhow::anyhow!("应用已关闭，无法启动Worker"))?;
        let fabric = self.backends.fabric();

        let mut handles = Vec::new();
        for category in Category::ALL
            .into_iter()
            .filter(|c| self.config.workers.categories.contains(c))
        {
            let pool = self.worker_pool(category, fabric.clone());
            info!("Starting {} workers for {}", pool.workers(), category);
            handles.extend(pool.start(&sender));
        }

        Ok(handles)
    }

    fn worker_pool(&self, category: Category, fabric: TaskFabric) -> WorkerPool {
        let workers = self.config.workers.count_for(category);
        let dequeue_wait = self.config.workers.dequeue_wait();

        match category {
            Category::Prediction(fuel) => WorkerPool::new(
                category,
                fabric,
                Arc::new(PredictionHandler::from_config(fuel, self.config.fuel.get(fuel))),
                workers,
                dequeue_wait,
            ),
            Category::Training => WorkerPool::new(
                category,
                fabric,
                Arc::new(TrainingHandler::new(Arc::new(TrendTrainer))),
                workers,
                dequeue_wait,
            )
            .with_hook(Arc::new(WatermarkHook::new(
                self.backends.watermarks.clone(),
            ))),
        }
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.config.discovery.request_timeout_seconds)
    }

    fn discovery_client(&self) -> Result<DiscoveryClient> {
        DiscoveryClient::new(&self.config.discovery.url, self.request_timeout())
            .context("创建服务发现客户端失败")
    }

    /// 向服务发现注册自身，失败只记录警告
    async fn register_self(&self, name: &str, port: u16) {
        let result = async {
            let host = advertise_host(&self.config.discovery)?;
            let record = ServiceRecord::new(name, host, port)?;
            self.discovery_client()?.register(&record).await?;
            Ok::<_, anyhow::Error>(record)
        }
        .await;

        match result {
            Ok(record) => info!(
                "Registered {} with discovery as {}:{}",
                record.name, record.host, record.port
            ),
            Err(e) => warn!("Self-registration of {} failed: {:#}", name, e),
        }
    }
}

/// 绑定地址并在后台运行HTTP服务，收到关闭信号后停止接受新连接
async fn serve(
    name: &'static str,
    bind_address: &str,
    router: Router,
    shutdown: &ShutdownManager,
) -> Result<JoinHandle<()>> {
    let listener = TcpListener::bind(bind_address)
        .await
        .with_context(|| format!("绑定地址失败: {bind_address}"))?;
    info!("{} listening on http://{}", name, bind_address);

    let mut shutdown_rx = shutdown.subscribe().await;
    Ok(tokio::spawn(async move {
        let result = axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.recv().await;
        })
        .await;

        if let Err(e) = result {
            error!("{} server failed: {}", name, e);
        }
        info!("{} server stopped", name);
    }))
}

/// 定期清理限流器中已过期的客户端记录
fn spawn_limiter_pruner(
    limiter: Arc<SlidingWindowLimiter>,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(limiter.window());
        loop {
            tokio::select! {
                _ = interval.tick() => limiter.prune(),
                _ = shutdown_rx.recv() => break,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_app_mode() {
        assert_eq!("gateway".parse::<AppMode>().unwrap(), AppMode::Gateway);
        assert_eq!("all".parse::<AppMode>().unwrap(), AppMode::All);
        assert!("dispatcher".parse::<AppMode>().is_err());
    }

    #[test]
    fn test_all_mode_includes_every_component() {
        for mode in [
            AppMode::Discovery,
            AppMode::Gateway,
            AppMode::Training,
            AppMode::Worker,
        ] {
            assert!(AppMode::All.includes(mode));
            assert!(mode.includes(mode));
        }
        assert!(!AppMode::Worker.includes(AppMode::Gateway));
    }

    #[tokio::test]
    async fn test_worker_mode_stops_on_shutdown() {
        let mut config = AppConfig::default();
        config.observability.metrics_enabled = false;
        config.workers.dequeue_wait_ms = 20;

        let app = Application::new(config, AppMode::Worker).await.unwrap();
        let shutdown = ShutdownManager::new();

        let runner = {
            let shutdown = shutdown.clone();
            tokio::spawn(async move { app.run(shutdown).await })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        shutdown.shutdown().await;

        let result = tokio::time::timeout(Duration::from_secs(2), runner)
            .await
            .unwrap()
            .unwrap();
        assert!(result.is_ok());
    }
}
