use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::errors::AppError;
use crate::models::{IssuedTicket, TicketData};
use crate::state::AppState;

pub async fn generate_ticket(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TicketData>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(ticket) = payload?;

    let issued = state
        .machine
        .issuer()
        .lookup(&ticket.booking_ref)?
        .ok_or_else(|| AppError::NotFound(format!("booking {}", ticket.booking_ref)))?;

    // Compared against the ledger row only, never against current prices.
    if let Some(field) = ticket.first_difference(&issued.ticket) {
        return Err(AppError::TicketMismatch(format!(
            "{field} differs from the issued ticket {}",
            ticket.booking_ref
        )));
    }

    download(&state, &issued).await
}

pub async fn download_ticket(
    State(state): State<Arc<AppState>>,
    Path(raw_ref): Path<String>,
) -> Result<Response, AppError> {
    let booking_ref = raw_ref.strip_suffix(".pdf").unwrap_or(&raw_ref);

    let issued = state
        .machine
        .issuer()
        .lookup(booking_ref)?
        .ok_or_else(|| AppError::NotFound(format!("booking {booking_ref}")))?;

    download(&state, &issued).await
}

async fn download(state: &AppState, issued: &IssuedTicket) -> Result<Response, AppError> {
    let booking_ref = &issued.ticket.booking_ref;
    let bytes = state
        .renderer
        .render(issued)
        .await
        .map_err(|e| AppError::Render(format!("{e:#}")))?;

    tracing::info!(booking_ref = %booking_ref, size = bytes.len(), "ticket rendered");

    let filename = format!("museum-ticket-{booking_ref}.pdf");
    Ok((
        [
            (header::CONTENT_TYPE, state.renderer.content_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    )
        .into_response())
}
