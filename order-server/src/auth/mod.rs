//! 认证授权模块
//!
//! - [`JwtService`] - JWT 令牌服务
//! - [`CurrentUser`] - 当前用户上下文
//! - [`attach_user`] - 可选认证中间件
//! - [`require_role`] - 角色检查中间件
//! - [`permissions`] - 订单访问规则

pub mod extractor;
pub mod jwt;
pub mod middleware;
pub mod permissions;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};
pub use middleware::{attach_user, authenticate, require_role};
