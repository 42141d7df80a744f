//! Domain models for the facility monitoring backend.

pub mod actor;
pub mod alert;
pub mod audit_log;
pub mod company;
pub mod device;
pub mod location;
pub mod reading;
pub mod role;
pub mod ticket;
pub mod user;

pub use actor::{Actor, RequestContext};
pub use alert::{
    display_active, Alert, AlertSeverity, AlertStatus, AlertType, AlertView, NewAlert,
    SnoozeAlertRequest,
};
pub use audit_log::{
    audit_timestamp, AuditAction, AuditEntityType, AuditLogEntry, AuditLogFilter, AuditScope,
    ChainVerification, NewAuditEntry, AUDIT_TAXONOMY_VERSION,
};
pub use company::Company;
pub use device::{
    CreateDeviceRequest, Device, DeviceChanges, DeviceStatus, NewDevice, Thresholds,
    UpdateDeviceRequest,
};
pub use location::{
    CreateLocationRequest, Location, LocationChanges, NewLocation, UpdateLocationRequest,
};
pub use reading::{DoorStatus, NewReading, SensorDataRequest, SensorReading};
pub use role::{AccountStatus, Role, ROLE_ALIASES};
pub use ticket::{
    CreateTicketRequest, NewTicket, Ticket, TicketChanges, TicketStatus, UpdateTicketRequest,
};
pub use user::{
    ApproveUserRequest, CreateUserRequest, NewUserProfile, OnboardingRequest, ProfileChanges,
    UpdateUserRequest, UserProfile,
};
