use serde::{Deserialize, Serialize};

use super::{BookingRecord, TicketData};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConversationState {
    InitialOptions,
    AwaitingInfoOrBook,
    CollectingTicketCounts,
    CollectingContactInfo,
    CollectingDate,
    AwaitingConfirmation,
    AwaitingPayment,
    Completed,
}

impl ConversationState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConversationState::InitialOptions => "initial_options",
            ConversationState::AwaitingInfoOrBook => "awaiting_info_or_book",
            ConversationState::CollectingTicketCounts => "collecting_ticket_counts",
            ConversationState::CollectingContactInfo => "collecting_contact_info",
            ConversationState::CollectingDate => "collecting_date",
            ConversationState::AwaitingConfirmation => "awaiting_confirmation",
            ConversationState::AwaitingPayment => "awaiting_payment",
            ConversationState::Completed => "completed",
        }
    }

    // unknown tags are rejected, never mapped to a default state
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "initial_options" => Some(ConversationState::InitialOptions),
            "awaiting_info_or_book" => Some(ConversationState::AwaitingInfoOrBook),
            "collecting_ticket_counts" => Some(ConversationState::CollectingTicketCounts),
            "collecting_contact_info" => Some(ConversationState::CollectingContactInfo),
            "collecting_date" => Some(ConversationState::CollectingDate),
            "awaiting_confirmation" => Some(ConversationState::AwaitingConfirmation),
            "awaiting_payment" => Some(ConversationState::AwaitingPayment),
            "completed" => Some(ConversationState::Completed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UiHint {
    None,
    ShowOptions,
    ShowDatePicker,
    ShowConfirmation,
    ShowPayment,
    ShowDownload,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatOption {
    pub text: String,
    pub value: String,
}

impl ChatOption {
    pub fn new(text: &str, value: &str) -> Self {
        Self {
            text: text.to_string(),
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub next: ConversationState,
    pub prompt: String,
    pub options: Vec<ChatOption>,
    pub hint: UiHint,
    pub booking: BookingRecord,
    pub ticket: Option<TicketData>,
}

impl Transition {
    pub fn to(next: ConversationState, prompt: impl Into<String>, booking: BookingRecord) -> Self {
        Self {
            next,
            prompt: prompt.into(),
            options: Vec::new(),
            hint: UiHint::None,
            booking,
            ticket: None,
        }
    }

    pub fn with_options(mut self, options: Vec<ChatOption>) -> Self {
        self.options = options;
        self
    }

    pub fn with_hint(mut self, hint: UiHint) -> Self {
        self.hint = hint;
        self
    }

    pub fn with_ticket(mut self, ticket: TicketData) -> Self {
        self.ticket = Some(ticket);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [ConversationState; 8] = [
        ConversationState::InitialOptions,
        ConversationState::AwaitingInfoOrBook,
        ConversationState::CollectingTicketCounts,
        ConversationState::CollectingContactInfo,
        ConversationState::CollectingDate,
        ConversationState::AwaitingConfirmation,
        ConversationState::AwaitingPayment,
        ConversationState::Completed,
    ];

    #[test]
    fn test_parse_matches_as_str() {
        for state in ALL {
            assert_eq!(ConversationState::parse(state.as_str()), Some(state));
        }
    }

    #[test]
    fn test_parse_matches_serde() {
        for state in ALL {
            let json = serde_json::to_value(state).unwrap();
            assert_eq!(json, state.as_str());
        }
    }

    #[test]
    fn test_parse_unknown_tag() {
        assert_eq!(ConversationState::parse("greeting"), None);
        assert_eq!(ConversationState::parse(""), None);
        assert_eq!(ConversationState::parse("Completed"), None);
    }
}
