//! Domain services for facility monitoring.
//!
//! Services contain business logic that operates on domain models through
//! the store ports.

pub mod alert_lifecycle;
pub mod alerts;
pub mod audit;
pub mod authorization;
pub mod directory;
pub mod locations;
pub mod tickets;
pub mod users;

pub use alert_lifecycle::{AlertPolicy, MetricBreach, MetricEvaluation};
pub use alerts::{AlertService, EvaluationReport, IngestOutcome, ReadingPage};
pub use audit::{
    audit_helpers, AppendOutcome, AuditDiagnostics, AuditEntryBuilder, AuditFailure,
    AuditRecorder,
};
pub use authorization::{
    authorize, decide, Decision, Operation, ResourceKind, RoleChangePolicy, ScopeFilter, Target,
};
pub use directory::TenantDirectory;
pub use locations::LocationService;
pub use tickets::TicketService;
pub use users::{SessionIdentity, UserAdminService};
