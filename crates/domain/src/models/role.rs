//! Roles and account status.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Roles with their reach: admin is global, manager is one company,
/// employee is one location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Manager,
    Employee,
}

/// Every accepted spelling of a role, including legacy names.
///
/// Lookups are case-insensitive after `-` and spaces are normalised to `_`.
pub const ROLE_ALIASES: &[(&str, Role)] = &[
    ("admin", Role::Admin),
    ("cueron_admin", Role::Admin),
    ("super_admin", Role::Admin),
    ("manager", Role::Manager),
    ("master", Role::Manager),
    ("employee", Role::Employee),
    ("staff", Role::Employee),
];

impl Role {
    /// Check if this role has at least the specified reach.
    /// Hierarchy: Admin > Manager > Employee
    pub fn has_at_least(&self, required: Role) -> bool {
        self.priority() >= required.priority()
    }

    fn priority(&self) -> u8 {
        match self {
            Role::Admin => 100,
            Role::Manager => 50,
            Role::Employee => 10,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Employee => "employee",
        }
    }

    pub fn all() -> &'static [Role] {
        &[Role::Admin, Role::Manager, Role::Employee]
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        ROLE_ALIASES
            .iter()
            .find(|(alias, _)| *alias == normalized)
            .map(|(_, role)| *role)
            .ok_or_else(|| format!("Invalid role: {}", s))
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Account approval status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    Pending,
    Approved,
    Suspended,
}

impl AccountStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, AccountStatus::Approved)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Pending => "pending",
            AccountStatus::Approved => "approved",
            AccountStatus::Suspended => "suspended",
        }
    }
}

impl FromStr for AccountStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(AccountStatus::Pending),
            "approved" => Ok(AccountStatus::Approved),
            "suspended" => Ok(AccountStatus::Suspended),
            _ => Err(format!("Invalid account status: {}", s)),
        }
    }
}

impl std::fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
