//! Role Model

use serde::{Deserialize, Serialize};

/// Actor role carried in identity claims
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Unauthenticated diner holding only an order id
    #[default]
    Guest,
    Customer,
    Waiter,
    Kitchen,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Guest => "guest",
            Role::Customer => "customer",
            Role::Waiter => "waiter",
            Role::Kitchen => "kitchen",
            Role::Admin => "admin",
        }
    }

    /// Floor staff: waiters and admins
    pub fn is_floor_staff(&self) -> bool {
        matches!(self, Role::Waiter | Role::Admin)
    }

    /// Kitchen crew: kitchen and admins
    pub fn is_kitchen(&self) -> bool {
        matches!(self, Role::Kitchen | Role::Admin)
    }

    /// Whether a connection with this role may join the given broadcast group
    pub fn may_join(&self, group: RoleGroup) -> bool {
        match group {
            RoleGroup::FloorStaff => self.is_floor_staff(),
            RoleGroup::Kitchen => self.is_kitchen(),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "guest" => Ok(Role::Guest),
            "customer" => Ok(Role::Customer),
            "waiter" => Ok(Role::Waiter),
            "kitchen" => Ok(Role::Kitchen),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// Broadcast groups populated by explicit announcement
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum RoleGroup {
    FloorStaff,
    Kitchen,
}

impl std::fmt::Display for RoleGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoleGroup::FloorStaff => f.write_str("floor-staff"),
            RoleGroup::Kitchen => f.write_str("kitchen"),
        }
    }
}
