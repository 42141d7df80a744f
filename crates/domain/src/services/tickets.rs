//! Service tickets.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use validator::Validate;

use crate::error::DomainError;
use crate::models::{
    Actor, CreateTicketRequest, NewTicket, RequestContext, Ticket, TicketChanges,
    UpdateTicketRequest,
};
use crate::ports::TicketStore;
use crate::services::audit::{audit_helpers, AuditRecorder};
use crate::services::authorization::{authorize, Operation, ResourceKind, Target};
use crate::services::directory::{location_target, TenantDirectory};

#[derive(Clone)]
pub struct TicketService {
    directory: TenantDirectory,
    tickets: Arc<dyn TicketStore>,
    audit: AuditRecorder,
}

impl TicketService {
    pub fn new(directory: TenantDirectory, tickets: Arc<dyn TicketStore>, audit: AuditRecorder) -> Self {
        Self {
            directory,
            tickets,
            audit,
        }
    }

    pub async fn list(&self, actor: &Actor) -> Result<Vec<Ticket>, DomainError> {
        let scope = authorize(actor, ResourceKind::Ticket, Operation::List, None)?;
        if scope.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.tickets.list_tickets(&scope).await?)
    }

    /// Opens a ticket for a device at a location in the actor's scope.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        req: CreateTicketRequest,
    ) -> Result<Ticket, DomainError> {
        authorize(&ctx.actor, ResourceKind::Ticket, Operation::Create, None)?;
        req.validate()?;

        let (Some(location_id), Some(device_id), Some(problem), Some(visit_date)) = (
            req.location_id,
            req.device_id,
            req.problem.as_deref().map(str::trim).filter(|p| !p.is_empty()),
            req.visit_date,
        ) else {
            return Err(DomainError::validation(
                "locationId, deviceId, problem and visitDate are required",
            ));
        };

        let location = self.directory.location(location_id).await?;
        authorize(
            &ctx.actor,
            ResourceKind::Ticket,
            Operation::Create,
            Some(&location_target(&location)),
        )?;

        let device = self.directory.device(device_id).await?;
        if device.location_id != location.id {
            return Err(DomainError::validation(
                "Device does not belong to the location",
            ));
        }

        let ticket = self
            .tickets
            .insert_ticket(NewTicket {
                location_id: location.id,
                device_id: device.id,
                created_by: ctx.profile_id(),
                problem: problem.to_string(),
                visit_date,
            })
            .await?;

        tracing::info!(
            ticket_id = ticket.id,
            location_id = ticket.location_id,
            "Ticket created"
        );
        self.audit
            .record(audit_helpers::ticket_created(ctx, &ticket))
            .await;
        Ok(ticket)
    }

    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: i64,
        req: UpdateTicketRequest,
        now: DateTime<Utc>,
    ) -> Result<Ticket, DomainError> {
        req.validate()?;
        let changes = TicketChanges::from(req);
        if changes.is_empty() {
            return Err(DomainError::validation("No fields to update"));
        }

        let before = self
            .tickets
            .find_ticket(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Ticket not found"))?;
        authorize(
            &ctx.actor,
            ResourceKind::Ticket,
            Operation::Update,
            Some(&Target::location(before.company_id, before.location_id)),
        )?;

        if let Some(next) = changes.status {
            if next != before.status && !before.status.can_transition_to(next) {
                return Err(DomainError::validation(format!(
                    "Cannot move a ticket from {} to {}",
                    before.status, next
                )));
            }
        }

        let after = self
            .tickets
            .update_ticket(id, &changes, now)
            .await?
            .ok_or_else(|| DomainError::not_found("Ticket not found"))?;

        self.audit
            .record(audit_helpers::ticket_updated(ctx, &before, &after))
            .await;
        Ok(after)
    }
}
