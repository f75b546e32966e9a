use std::sync::Arc;

use crate::auth::JwtService;
use crate::core::tasks::{BackgroundTasks, TaskKind};
use crate::core::{Config, Result};
use crate::hub::{SubscriptionHub, run_forwarder, run_heartbeat};
use crate::orders::OrdersManager;
use crate::services::{CatalogLookup, InMemoryCatalog};

/// 服务器状态 - 持有所有服务的共享引用
///
/// 所有字段都是浅拷贝 (Arc)，可以直接作为 axum State 使用。
///
/// | 字段 | 说明 |
/// |------|------|
/// | config | 配置项 (不可变) |
/// | orders | 订单账本 |
/// | hub | 实时推送中心 |
/// | jwt_service | JWT 认证服务 |
#[derive(Clone, Debug)]
pub struct ServerState {
    pub config: Config,
    pub orders: OrdersManager,
    pub hub: SubscriptionHub,
    pub jwt_service: Arc<JwtService>,
}

impl ServerState {
    /// 创建服务器状态 (手动构造)
    ///
    /// 测试中用来注入内存存储和独立的 hub
    pub fn new(
        config: Config,
        orders: OrdersManager,
        hub: SubscriptionHub,
        jwt_service: Arc<JwtService>,
    ) -> Self {
        Self {
            config,
            orders,
            hub,
            jwt_service,
        }
    }

    /// 初始化服务器状态
    ///
    /// 1. 创建工作目录
    /// 2. 加载菜单
    /// 3. 打开订单数据库
    pub fn initialize(config: &Config) -> Result<Self> {
        std::fs::create_dir_all(&config.work_dir)?;

        let catalog = InMemoryCatalog::from_json_file(config.catalog_path())?;
        let catalog: Arc<dyn CatalogLookup> = Arc::new(catalog);

        let orders = OrdersManager::new(config.db_path(), catalog)?
            .with_event_capacity(config.event_channel_capacity);
        let hub = SubscriptionHub::new(config.hub_queue_capacity);
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));

        Ok(Self::new(config.clone(), orders, hub, jwt_service))
    }

    pub fn jwt_service(&self) -> &JwtService {
        &self.jwt_service
    }

    /// 启动后台任务 (推送转发、心跳)
    ///
    /// The forwarder subscribes before this returns, so no commit made
    /// afterwards is missed.
    pub fn start_background_tasks(&self) -> BackgroundTasks {
        let mut tasks = BackgroundTasks::new();

        let source = self.orders.subscribe();
        tasks.spawn(
            "event_forwarder",
            TaskKind::Listener,
            run_forwarder(source, self.hub.clone(), tasks.shutdown_token()),
        );
        tasks.spawn(
            "heartbeat",
            TaskKind::Periodic,
            run_heartbeat(
                self.hub.clone(),
                self.config.heartbeat_interval(),
                tasks.shutdown_token(),
            ),
        );

        tracing::info!("Background tasks registered: {}", tasks.len());
        tasks
    }
}
