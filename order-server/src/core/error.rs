use thiserror::Error;

use crate::orders::ManagerError;
use crate::services::CatalogError;

/// 启动与运行期错误
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("订单存储错误: {0}")]
    Storage(#[from] ManagerError),

    #[error("菜单加载错误: {0}")]
    Catalog(#[from] CatalogError),

    #[error("内部服务器错误: {0}")]
    Internal(#[from] anyhow::Error),
}

/// 服务器 Result 类型别名
pub type Result<T> = std::result::Result<T, ServerError>;
