//! Identity models shared by server and clients

pub mod role;

pub use role::{Role, RoleGroup};
