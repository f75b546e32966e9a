//! Order Server - 餐厅订单生命周期服务
//!
//! # 架构概述
//!
//! - **订单账本** (`orders`): 事件溯源的订单状态机，redb 持久化
//! - **推送中心** (`hub`): 按订单 / 角色组的 WebSocket 推送
//! - **认证** (`auth`): JWT 认证与角色权限
//! - **HTTP API** (`api`): RESTful API 接口
//!
//! # 模块结构
//!
//! ```text
//! order-server/src/
//! ├── core/          # 配置、状态、错误、后台任务
//! ├── auth/          # JWT 认证、权限
//! ├── services/      # 菜单目录
//! ├── api/           # HTTP 路由和处理器
//! ├── hub/           # 实时推送
//! ├── utils/         # 错误、日志
//! └── orders/        # 订单事件溯源
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod hub;
pub mod orders;
pub mod services;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use hub::SubscriptionHub;
pub use orders::{OrderStorage, OrdersManager};
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// 按配置初始化日志 (生产环境总是输出 JSON)
pub fn setup_environment(config: &Config) {
    init_logger_with_file(
        Some(&config.log_level),
        Some(config.log_json || config.is_production()),
        config.log_dir.as_deref(),
    );
}
