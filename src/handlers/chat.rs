use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use chrono::{FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::{
    BookingRecord, ChatOption, ConversationState, TicketData, Transition, UiHint,
};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    #[serde(rename = "currentState", default)]
    pub current_state: Option<String>,
    #[serde(rename = "bookingData", default)]
    pub booking_data: Option<BookingRecord>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub state: ConversationState,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<ChatOption>,
    #[serde(skip_serializing_if = "is_false")]
    pub show_initial_buttons: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub show_booking_option: bool,
    pub booking_info: BookingRecord,
    #[serde(skip_serializing_if = "is_false")]
    pub show_payment: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub show_date_picker: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub show_confirmation_buttons: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub show_download: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket_data: Option<TicketData>,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl From<Transition> for ChatResponse {
    fn from(t: Transition) -> Self {
        let show_booking_option = t.options.iter().any(|o| o.value == "book");
        Self {
            response: t.prompt,
            state: t.next,
            show_initial_buttons: t.hint == UiHint::ShowOptions,
            show_booking_option,
            show_payment: t.hint == UiHint::ShowPayment,
            show_date_picker: t.hint == UiHint::ShowDatePicker,
            show_confirmation_buttons: t.hint == UiHint::ShowConfirmation,
            show_download: t.hint == UiHint::ShowDownload,
            options: t.options,
            booking_info: t.booking,
            ticket_data: t.ticket,
        }
    }
}

/// Calendar date at the museum, used as the earliest bookable visit date.
pub fn museum_today(utc_offset_minutes: i32) -> NaiveDate {
    let now = Utc::now();
    match FixedOffset::east_opt(utc_offset_minutes * 60) {
        Some(offset) => now.with_timezone(&offset).date_naive(),
        None => now.date_naive(),
    }
}

pub async fn chat(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, AppError> {
    let Json(payload) = payload?;
    let current = match payload.current_state.as_deref().map(str::trim) {
        None | Some("") => ConversationState::InitialOptions,
        Some(tag) => ConversationState::parse(tag)
            .ok_or_else(|| AppError::UnknownState(tag.to_string()))?,
    };
    let booking = payload.booking_data.unwrap_or_default();
    let today = museum_today(state.config.utc_offset_minutes);

    let transition = state
        .machine
        .transition(current, &payload.message, booking, today)?;

    if let Some(ticket) = &transition.ticket {
        tracing::info!(booking_ref = %ticket.booking_ref, "booking completed over chat");
    }

    Ok(Json(transition.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transition(hint: UiHint, options: Vec<ChatOption>) -> Transition {
        Transition::to(ConversationState::InitialOptions, "hi", BookingRecord::default())
            .with_options(options)
            .with_hint(hint)
    }

    #[test]
    fn test_hint_flattens_to_single_flag() {
        let res = ChatResponse::from(transition(UiHint::ShowDatePicker, vec![]));
        let json = serde_json::to_value(&res).unwrap();

        assert_eq!(json["show_date_picker"], true);
        for flag in [
            "show_initial_buttons",
            "show_booking_option",
            "show_payment",
            "show_confirmation_buttons",
            "show_download",
        ] {
            assert!(json.get(flag).is_none(), "{flag} should be omitted");
        }
        assert!(json.get("options").is_none());
        assert!(json.get("ticket_data").is_none());
        assert!(json.get("booking_info").is_some());
    }

    #[test]
    fn test_booking_option_follows_options() {
        let res = ChatResponse::from(transition(
            UiHint::ShowOptions,
            vec![ChatOption::new("Book Tickets", "book")],
        ));
        assert!(res.show_initial_buttons);
        assert!(res.show_booking_option);

        let json = serde_json::to_value(&res).unwrap();
        assert_eq!(json["state"], "initial_options");
        assert_eq!(json["options"][0]["value"], "book");
    }

    #[test]
    fn test_request_field_names() {
        let req: ChatRequest = serde_json::from_str(
            r#"{"message":"hi","currentState":"collecting_date","bookingData":{"adult_tickets":1}}"#,
        )
        .unwrap();
        assert_eq!(req.current_state.as_deref(), Some("collecting_date"));
        assert_eq!(req.booking_data.unwrap().adult_tickets, 1);

        let bare: ChatRequest = serde_json::from_str(r#"{"message":"book"}"#).unwrap();
        assert!(bare.current_state.is_none());
        assert!(bare.booking_data.is_none());
    }
}
