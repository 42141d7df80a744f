use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Serialize;

use domain::models::{CreateTicketRequest, Ticket, UpdateTicketRequest};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::CurrentActor;

#[derive(Debug, Serialize)]
pub struct TicketsResponse {
    pub tickets: Vec<Ticket>,
}

#[derive(Debug, Serialize)]
pub struct TicketResponse {
    pub ticket: Ticket,
}

/// GET /api/v1/tickets
pub async fn list_tickets(
    State(state): State<AppState>,
    CurrentActor(ctx): CurrentActor,
) -> Result<Json<TicketsResponse>, ApiError> {
    let tickets = state.tickets.list(&ctx.actor).await?;
    Ok(Json(TicketsResponse { tickets }))
}

/// POST /api/v1/tickets
pub async fn create_ticket(
    State(state): State<AppState>,
    CurrentActor(ctx): CurrentActor,
    Json(request): Json<CreateTicketRequest>,
) -> Result<(StatusCode, Json<TicketResponse>), ApiError> {
    let ticket = state.tickets.create(&ctx, request).await?;
    Ok((StatusCode::CREATED, Json(TicketResponse { ticket })))
}

/// PATCH /api/v1/tickets/:ticket_id
pub async fn update_ticket(
    State(state): State<AppState>,
    CurrentActor(ctx): CurrentActor,
    Path(ticket_id): Path<i64>,
    Json(request): Json<UpdateTicketRequest>,
) -> Result<Json<TicketResponse>, ApiError> {
    let ticket = state
        .tickets
        .update(&ctx, ticket_id, request, Utc::now())
        .await?;
    Ok(Json(TicketResponse { ticket }))
}
