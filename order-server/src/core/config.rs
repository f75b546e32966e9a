use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::auth::JwtConfig;

/// 服务器配置
///
/// # 环境变量
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./data | 工作目录 |
/// | HTTP_PORT | 3000 | HTTP / WebSocket 端口 |
/// | ORDER_DB_FILE | orders.redb | 订单数据库文件 (相对 WORK_DIR) |
/// | CATALOG_FILE | catalog.json | 菜单种子文件 (相对 WORK_DIR, 可选) |
/// | HEARTBEAT_INTERVAL_SECS | 30 | 心跳间隔 |
/// | HUB_QUEUE_CAPACITY | 64 | 每连接发送队列容量 |
/// | EVENT_CHANNEL_CAPACITY | 4096 | 账本广播通道容量 |
/// | REQUEST_TIMEOUT_MS | 30000 | 请求超时(毫秒) |
/// | ENVIRONMENT | development | 运行环境 |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_DIR | - | 日志目录 (存在时写入按天滚动的文件) |
/// | LOG_JSON | false | JSON 日志 |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/srv/orders HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存放数据库和菜单文件
    pub work_dir: String,
    pub http_port: u16,
    pub order_db_file: String,
    pub catalog_file: String,
    pub heartbeat_interval_secs: u64,
    pub hub_queue_capacity: usize,
    pub event_channel_capacity: usize,
    /// 请求超时时间 (毫秒)
    pub request_timeout_ms: u64,
    /// 运行环境: development | production
    pub environment: String,
    pub log_level: String,
    pub log_dir: Option<String>,
    pub log_json: bool,
    /// JWT 认证配置
    pub jwt: JwtConfig,
}

/// 读取并解析环境变量，缺失或无法解析时取默认值
fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_string(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

impl Config {
    /// 从环境变量加载配置，未设置的项使用默认值
    pub fn from_env() -> Self {
        Self {
            work_dir: env_string("WORK_DIR", "./data"),
            http_port: env_or("HTTP_PORT", 3000),
            order_db_file: env_string("ORDER_DB_FILE", "orders.redb"),
            catalog_file: env_string("CATALOG_FILE", "catalog.json"),
            heartbeat_interval_secs: env_or("HEARTBEAT_INTERVAL_SECS", 30),
            hub_queue_capacity: env_or("HUB_QUEUE_CAPACITY", 64),
            event_channel_capacity: env_or("EVENT_CHANNEL_CAPACITY", 4096),
            request_timeout_ms: env_or("REQUEST_TIMEOUT_MS", 30_000),
            environment: env_string("ENVIRONMENT", "development"),
            log_level: env_string("LOG_LEVEL", "info"),
            log_dir: std::env::var("LOG_DIR").ok(),
            log_json: env_or("LOG_JSON", false),
            jwt: JwtConfig::default(),
        }
    }

    /// 测试用：固定工作目录和端口
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config
    }

    pub fn db_path(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join(&self.order_db_file)
    }

    pub fn catalog_path(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join(&self.catalog_file)
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_secs.max(1))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
