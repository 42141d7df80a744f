//! The resolved caller of a request.

use serde::Serialize;

use super::role::{AccountStatus, Role};

/// Snapshot of the caller used for authorization decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    pub profile_id: i64,
    pub role: Role,
    pub company_id: Option<i64>,
    pub location_id: Option<i64>,
    pub status: AccountStatus,
}

impl Actor {
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}

/// Actor plus request metadata that privileged operations record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub actor: Actor,
    pub ip_address: Option<String>,
}

impl RequestContext {
    pub fn new(actor: Actor, ip_address: Option<String>) -> Self {
        Self { actor, ip_address }
    }

    pub fn profile_id(&self) -> i64 {
        self.actor.profile_id
    }
}
