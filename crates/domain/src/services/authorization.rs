//! Authorization and scoping engine.
//!
//! [`decide`] is the single entry point every listing and mutating operation
//! goes through. It is a pure function of the actor snapshot, the requested
//! `(resource kind, operation)` and an optional target snapshot; callers
//! fetch both snapshots before asking.
//!
//! Evaluation order:
//! 1. the account must be approved,
//! 2. the role must appear in [`CAPABILITIES`] for the pair,
//! 3. managers may only create employee accounts,
//! 4. the target (when given) must lie inside the actor's natural scope,
//! 5. a requested company reassignment must stay inside that scope.

use serde::Serialize;
use std::str::FromStr;

use crate::error::{DomainError, ForbiddenReason};
use crate::models::{Actor, Role};

/// Kinds of resources guarded by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    User,
    Company,
    Location,
    Device,
    Reading,
    Alert,
    Ticket,
    AuditLog,
}

/// Operations that can be requested on a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    List,
    Read,
    Create,
    Update,
    Delete,
    /// Approve or suspend an account.
    ChangeStatus,
    Snooze,
    Resolve,
    /// Walk the audit hash chain.
    Verify,
}

/// Rows an operation may touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ScopeFilter {
    Global,
    Company(i64),
    Location(i64),
    /// The actor has the capability but no assignment; listings are empty.
    Empty,
}

impl ScopeFilter {
    /// Natural scope of an actor, derived from role and assignment.
    pub fn for_actor(actor: &Actor) -> Self {
        match actor.role {
            Role::Admin => ScopeFilter::Global,
            Role::Manager => actor
                .company_id
                .map_or(ScopeFilter::Empty, ScopeFilter::Company),
            Role::Employee => actor
                .location_id
                .map_or(ScopeFilter::Empty, ScopeFilter::Location),
        }
    }

    /// Whether a target snapshot lies inside this scope.
    pub fn covers(&self, target: &Target) -> bool {
        match self {
            ScopeFilter::Global => true,
            ScopeFilter::Company(id) => target.company_id == Some(*id),
            ScopeFilter::Location(id) => target.location_id == Some(*id),
            ScopeFilter::Empty => false,
        }
    }

    /// Whether rows may be assigned to `company_id` from this scope.
    pub fn admits_company(&self, company_id: i64) -> bool {
        match self {
            ScopeFilter::Global => true,
            ScopeFilter::Company(id) => *id == company_id,
            ScopeFilter::Location(_) | ScopeFilter::Empty => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ScopeFilter::Empty)
    }
}

/// Snapshot of the record an operation targets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Target {
    /// Owning company of the record.
    pub company_id: Option<i64>,
    /// Owning location of the record, when it has one.
    pub location_id: Option<i64>,
    /// Role of the account being created or the role requested for it.
    pub role: Option<Role>,
    /// Company the payload would move the record to.
    pub reassign_company_id: Option<i64>,
}

impl Target {
    pub fn company(company_id: i64) -> Self {
        Self {
            company_id: Some(company_id),
            ..Default::default()
        }
    }

    pub fn location(company_id: i64, location_id: i64) -> Self {
        Self {
            company_id: Some(company_id),
            location_id: Some(location_id),
            ..Default::default()
        }
    }

    /// A user account, which may have no company (global admins).
    pub fn account(company_id: Option<i64>, location_id: Option<i64>) -> Self {
        Self {
            company_id,
            location_id,
            ..Default::default()
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    pub fn reassigning_to(mut self, company_id: Option<i64>) -> Self {
        self.reassign_company_id = company_id;
        self
    }
}

/// Outcome of [`decide`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow(ScopeFilter),
    Deny(ForbiddenReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow(_))
    }

    pub fn scope(&self) -> Option<ScopeFilter> {
        match self {
            Decision::Allow(scope) => Some(*scope),
            Decision::Deny(_) => None,
        }
    }

    /// Converts a denial into [`DomainError::Forbidden`].
    pub fn into_result(self) -> Result<ScopeFilter, DomainError> {
        match self {
            Decision::Allow(scope) => Ok(scope),
            Decision::Deny(reason) => Err(DomainError::Forbidden(reason)),
        }
    }
}

const ANYONE: &[Role] = &[Role::Admin, Role::Manager, Role::Employee];
const ADMINISTRATORS: &[Role] = &[Role::Admin, Role::Manager];
const ADMIN_ONLY: &[Role] = &[Role::Admin];
const MANAGER_ONLY: &[Role] = &[Role::Manager];
const FIELD_STAFF: &[Role] = &[Role::Manager, Role::Employee];

/// One row of the capability table.
#[derive(Debug, Clone, Copy)]
pub struct Capability {
    pub resource: ResourceKind,
    pub operation: Operation,
    pub roles: &'static [Role],
}

const fn cap(resource: ResourceKind, operation: Operation, roles: &'static [Role]) -> Capability {
    Capability {
        resource,
        operation,
        roles,
    }
}

/// Which roles may perform which operation. Pairs absent from the table are
/// denied to everyone.
pub const CAPABILITIES: &[Capability] = &[
    cap(ResourceKind::User, Operation::List, ADMINISTRATORS),
    cap(ResourceKind::User, Operation::Read, ADMINISTRATORS),
    cap(ResourceKind::User, Operation::Create, ADMINISTRATORS),
    cap(ResourceKind::User, Operation::Update, ADMINISTRATORS),
    cap(ResourceKind::User, Operation::ChangeStatus, ADMINISTRATORS),
    cap(ResourceKind::Company, Operation::List, ADMINISTRATORS),
    cap(ResourceKind::Company, Operation::Read, ADMINISTRATORS),
    cap(ResourceKind::Company, Operation::Create, ADMIN_ONLY),
    cap(ResourceKind::Location, Operation::List, ANYONE),
    cap(ResourceKind::Location, Operation::Read, ANYONE),
    cap(ResourceKind::Location, Operation::Create, MANAGER_ONLY),
    cap(ResourceKind::Location, Operation::Update, ADMINISTRATORS),
    cap(ResourceKind::Location, Operation::Delete, ADMINISTRATORS),
    cap(ResourceKind::Device, Operation::List, ANYONE),
    cap(ResourceKind::Device, Operation::Read, ANYONE),
    cap(ResourceKind::Device, Operation::Create, ADMINISTRATORS),
    cap(ResourceKind::Device, Operation::Update, ADMINISTRATORS),
    cap(ResourceKind::Device, Operation::Delete, ADMINISTRATORS),
    cap(ResourceKind::Reading, Operation::List, ANYONE),
    cap(ResourceKind::Alert, Operation::List, ANYONE),
    cap(ResourceKind::Alert, Operation::Read, ANYONE),
    cap(ResourceKind::Alert, Operation::Snooze, ANYONE),
    cap(ResourceKind::Alert, Operation::Resolve, ADMINISTRATORS),
    cap(ResourceKind::Ticket, Operation::List, ANYONE),
    cap(ResourceKind::Ticket, Operation::Read, ANYONE),
    cap(ResourceKind::Ticket, Operation::Create, FIELD_STAFF),
    cap(ResourceKind::Ticket, Operation::Update, ADMINISTRATORS),
    cap(ResourceKind::AuditLog, Operation::List, ADMINISTRATORS),
    cap(ResourceKind::AuditLog, Operation::Verify, ADMIN_ONLY),
];

fn roles_for(resource: ResourceKind, operation: Operation) -> &'static [Role] {
    CAPABILITIES
        .iter()
        .find(|c| c.resource == resource && c.operation == operation)
        .map(|c| c.roles)
        .unwrap_or(&[])
}

/// Decides whether `actor` may perform `operation` on `resource`.
///
/// Without a target the decision covers a listing or a creation whose
/// ownership the caller forces from the actor; the returned scope is then
/// the filter to apply. With a target, the target must be inside the scope.
pub fn decide(
    actor: &Actor,
    resource: ResourceKind,
    operation: Operation,
    target: Option<&Target>,
) -> Decision {
    if !actor.is_active() {
        return Decision::Deny(ForbiddenReason::AccountInactive);
    }

    if !roles_for(resource, operation).contains(&actor.role) {
        return Decision::Deny(ForbiddenReason::RoleInsufficient);
    }

    if resource == ResourceKind::User
        && operation == Operation::Create
        && actor.role == Role::Manager
        && target.and_then(|t| t.role) != Some(Role::Employee)
    {
        return Decision::Deny(ForbiddenReason::RoleInsufficient);
    }

    let scope = ScopeFilter::for_actor(actor);

    if let Some(target) = target {
        if !scope.covers(target) {
            return Decision::Deny(ForbiddenReason::ScopeMismatch);
        }
        if let Some(company_id) = target.reassign_company_id {
            if !scope.admits_company(company_id) {
                return Decision::Deny(ForbiddenReason::ScopeMismatch);
            }
        }
    }

    Decision::Allow(scope)
}

/// Shorthand for `decide(..).into_result()`.
pub fn authorize(
    actor: &Actor,
    resource: ResourceKind,
    operation: Operation,
    target: Option<&Target>,
) -> Result<ScopeFilter, DomainError> {
    decide(actor, resource, operation, target).into_result()
}

/// Company a newly created record is filed under.
///
/// Managers always file under their own company whatever the payload says;
/// admins file under the requested company.
pub fn forced_company(actor: &Actor, requested: Option<i64>) -> Option<i64> {
    match actor.role {
        Role::Admin => requested,
        Role::Manager | Role::Employee => actor.company_id,
    }
}

/// Rule applied to role assignments on top of [`decide`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleChangePolicy {
    /// Managers may only assign the employee role.
    #[default]
    Restricted,
    /// Managers may assign any role inside their company.
    Permissive,
}

impl RoleChangePolicy {
    pub fn check(&self, actor: &Actor, requested: Role) -> Result<(), DomainError> {
        match (self, actor.role) {
            (_, Role::Admin) => Ok(()),
            (RoleChangePolicy::Permissive, _) => Ok(()),
            (RoleChangePolicy::Restricted, _) if requested == Role::Employee => Ok(()),
            (RoleChangePolicy::Restricted, _) => {
                Err(DomainError::Forbidden(ForbiddenReason::RoleInsufficient))
            }
        }
    }
}

impl FromStr for RoleChangePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "restricted" => Ok(RoleChangePolicy::Restricted),
            "permissive" => Ok(RoleChangePolicy::Permissive),
            _ => Err(format!("Invalid role change policy: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AccountStatus;

    fn actor(role: Role, company_id: Option<i64>, location_id: Option<i64>) -> Actor {
        Actor {
            profile_id: 1,
            role,
            company_id,
            location_id,
            status: AccountStatus::Approved,
        }
    }

    fn admin() -> Actor {
        actor(Role::Admin, None, None)
    }

    fn manager(company: i64) -> Actor {
        actor(Role::Manager, Some(company), None)
    }

    fn employee(company: i64, location: i64) -> Actor {
        actor(Role::Employee, Some(company), Some(location))
    }

    #[test]
    fn test_natural_scopes() {
        assert_eq!(ScopeFilter::for_actor(&admin()), ScopeFilter::Global);
        assert_eq!(ScopeFilter::for_actor(&manager(7)), ScopeFilter::Company(7));
        assert_eq!(
            ScopeFilter::for_actor(&employee(7, 70)),
            ScopeFilter::Location(70)
        );
        assert_eq!(
            ScopeFilter::for_actor(&actor(Role::Employee, Some(7), None)),
            ScopeFilter::Empty
        );
        assert_eq!(
            ScopeFilter::for_actor(&actor(Role::Manager, None, None)),
            ScopeFilter::Empty
        );
    }

    #[test]
    fn test_listing_scopes_per_role() {
        let d = decide(&admin(), ResourceKind::Alert, Operation::List, None);
        assert_eq!(d, Decision::Allow(ScopeFilter::Global));

        let d = decide(&manager(7), ResourceKind::Location, Operation::List, None);
        assert_eq!(d, Decision::Allow(ScopeFilter::Company(7)));

        let d = decide(&employee(7, 70), ResourceKind::Ticket, Operation::List, None);
        assert_eq!(d, Decision::Allow(ScopeFilter::Location(70)));
    }

    #[test]
    fn test_unassigned_employee_lists_nothing() {
        let unassigned = actor(Role::Employee, Some(7), None);
        let d = decide(&unassigned, ResourceKind::Alert, Operation::List, None);
        assert_eq!(d, Decision::Allow(ScopeFilter::Empty));
    }

    #[test]
    fn test_employee_never_manages_users() {
        let e = employee(7, 70);
        for op in [
            Operation::List,
            Operation::Create,
            Operation::Update,
            Operation::ChangeStatus,
        ] {
            assert_eq!(
                decide(&e, ResourceKind::User, op, None),
                Decision::Deny(ForbiddenReason::RoleInsufficient)
            );
        }
    }

    #[test]
    fn test_employee_cannot_read_audit_or_create_locations() {
        let e = employee(7, 70);
        assert_eq!(
            decide(&e, ResourceKind::AuditLog, Operation::List, None),
            Decision::Deny(ForbiddenReason::RoleInsufficient)
        );
        assert_eq!(
            decide(&e, ResourceKind::Location, Operation::Create, None),
            Decision::Deny(ForbiddenReason::RoleInsufficient)
        );
    }

    #[test]
    fn test_only_managers_create_locations() {
        assert!(decide(&manager(7), ResourceKind::Location, Operation::Create, None).is_allowed());
        assert_eq!(
            decide(&admin(), ResourceKind::Location, Operation::Create, None),
            Decision::Deny(ForbiddenReason::RoleInsufficient)
        );
    }

    #[test]
    fn test_manager_update_foreign_user_is_scope_mismatch() {
        let target = Target::account(Some(9), None);
        assert_eq!(
            decide(&manager(7), ResourceKind::User, Operation::Update, Some(&target)),
            Decision::Deny(ForbiddenReason::ScopeMismatch)
        );
    }

    #[test]
    fn test_manager_update_same_company_role_admin_allowed() {
        let target = Target::account(Some(7), None).with_role(Role::Admin);
        assert_eq!(
            decide(&manager(7), ResourceKind::User, Operation::Update, Some(&target)),
            Decision::Allow(ScopeFilter::Company(7))
        );
    }

    #[test]
    fn test_manager_cannot_move_user_to_foreign_company() {
        let target = Target::account(Some(7), None).reassigning_to(Some(9));
        assert_eq!(
            decide(&manager(7), ResourceKind::User, Operation::Update, Some(&target)),
            Decision::Deny(ForbiddenReason::ScopeMismatch)
        );

        let same = Target::account(Some(7), None).reassigning_to(Some(7));
        assert!(decide(&manager(7), ResourceKind::User, Operation::Update, Some(&same)).is_allowed());
    }

    #[test]
    fn test_admin_may_move_users_anywhere() {
        let target = Target::account(Some(7), None).reassigning_to(Some(9));
        assert!(decide(&admin(), ResourceKind::User, Operation::Update, Some(&target)).is_allowed());
    }

    #[test]
    fn test_manager_creates_only_employees() {
        for role in [Role::Admin, Role::Manager] {
            let target = Target::company(7).with_role(role);
            assert_eq!(
                decide(&manager(7), ResourceKind::User, Operation::Create, Some(&target)),
                Decision::Deny(ForbiddenReason::RoleInsufficient)
            );
        }
        assert_eq!(
            decide(&manager(7), ResourceKind::User, Operation::Create, None),
            Decision::Deny(ForbiddenReason::RoleInsufficient)
        );
        let target = Target::company(7).with_role(Role::Employee);
        assert!(decide(&manager(7), ResourceKind::User, Operation::Create, Some(&target)).is_allowed());
    }

    #[test]
    fn test_admin_creates_any_role() {
        for role in Role::all() {
            let target = Target::account(None, None).with_role(*role);
            assert!(decide(&admin(), ResourceKind::User, Operation::Create, Some(&target)).is_allowed());
        }
    }

    #[test]
    fn test_snooze_requires_scope_equivalence() {
        let in_scope = Target::location(7, 70);
        let other_location = Target::location(7, 71);
        let e = employee(7, 70);

        assert!(decide(&e, ResourceKind::Alert, Operation::Snooze, Some(&in_scope)).is_allowed());
        assert_eq!(
            decide(&e, ResourceKind::Alert, Operation::Snooze, Some(&other_location)),
            Decision::Deny(ForbiddenReason::ScopeMismatch)
        );
        assert_eq!(
            decide(&manager(8), ResourceKind::Alert, Operation::Snooze, Some(&in_scope)),
            Decision::Deny(ForbiddenReason::ScopeMismatch)
        );
    }

    #[test]
    fn test_unassigned_employee_cannot_touch_targets() {
        let unassigned = actor(Role::Employee, Some(7), None);
        assert_eq!(
            decide(
                &unassigned,
                ResourceKind::Alert,
                Operation::Snooze,
                Some(&Target::location(7, 70))
            ),
            Decision::Deny(ForbiddenReason::ScopeMismatch)
        );
    }

    #[test]
    fn test_tickets_created_by_field_staff_only() {
        let target = Target::location(7, 70);
        assert!(decide(&employee(7, 70), ResourceKind::Ticket, Operation::Create, Some(&target)).is_allowed());
        assert!(decide(&manager(7), ResourceKind::Ticket, Operation::Create, Some(&target)).is_allowed());
        assert_eq!(
            decide(&admin(), ResourceKind::Ticket, Operation::Create, Some(&target)),
            Decision::Deny(ForbiddenReason::RoleInsufficient)
        );
    }

    #[test]
    fn test_audit_scopes() {
        assert_eq!(
            decide(&admin(), ResourceKind::AuditLog, Operation::List, None),
            Decision::Allow(ScopeFilter::Global)
        );
        assert_eq!(
            decide(&manager(7), ResourceKind::AuditLog, Operation::List, None),
            Decision::Allow(ScopeFilter::Company(7))
        );
        assert_eq!(
            decide(&manager(7), ResourceKind::AuditLog, Operation::Verify, None),
            Decision::Deny(ForbiddenReason::RoleInsufficient)
        );
    }

    #[test]
    fn test_inactive_accounts_denied_everything() {
        for status in [AccountStatus::Pending, AccountStatus::Suspended] {
            let mut a = admin();
            a.status = status;
            assert_eq!(
                decide(&a, ResourceKind::Alert, Operation::List, None),
                Decision::Deny(ForbiddenReason::AccountInactive)
            );
        }
    }

    #[test]
    fn test_unlisted_pairs_denied() {
        assert_eq!(
            decide(&admin(), ResourceKind::Reading, Operation::Delete, None),
            Decision::Deny(ForbiddenReason::RoleInsufficient)
        );
    }

    #[test]
    fn test_capability_table_has_no_duplicates() {
        for (i, a) in CAPABILITIES.iter().enumerate() {
            for b in &CAPABILITIES[i + 1..] {
                assert!(
                    !(a.resource == b.resource && a.operation == b.operation),
                    "duplicate capability {:?}/{:?}",
                    a.resource,
                    a.operation
                );
            }
        }
    }

    #[test]
    fn test_forced_company() {
        assert_eq!(forced_company(&manager(7), Some(9)), Some(7));
        assert_eq!(forced_company(&manager(7), None), Some(7));
        assert_eq!(forced_company(&admin(), Some(9)), Some(9));
        assert_eq!(forced_company(&admin(), None), None);
    }

    #[test]
    fn test_role_change_policy() {
        let m = manager(7);
        assert!(RoleChangePolicy::Restricted.check(&m, Role::Employee).is_ok());
        assert!(RoleChangePolicy::Restricted.check(&m, Role::Admin).is_err());
        assert!(RoleChangePolicy::Restricted.check(&m, Role::Manager).is_err());
        assert!(RoleChangePolicy::Permissive.check(&m, Role::Admin).is_ok());
        assert!(RoleChangePolicy::Restricted.check(&admin(), Role::Admin).is_ok());
    }

    #[test]
    fn test_role_change_policy_parse() {
        assert_eq!(
            "Permissive".parse::<RoleChangePolicy>().unwrap(),
            RoleChangePolicy::Permissive
        );
        assert!("lenient".parse::<RoleChangePolicy>().is_err());
    }

    #[test]
    fn test_scope_filter_serialization() {
        assert_eq!(
            serde_json::to_value(ScopeFilter::Company(7)).unwrap(),
            serde_json::json!({"kind": "company", "id": 7})
        );
        assert_eq!(
            serde_json::to_value(ScopeFilter::Global).unwrap(),
            serde_json::json!({"kind": "global"})
        );
    }
}
