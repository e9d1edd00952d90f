use std::sync::Arc;

use chrono::NaiveDate;

use crate::errors::AppError;
use crate::models::museum::day_name;
use crate::models::{
    BookingRecord, ChatOption, ContactField, ConversationState, MuseumInfo, PricingTable,
    TicketData, Transition, UiHint,
};
use crate::services::issuer::TicketIssuer;
use crate::services::parsing::{
    extract_contact, parse_counts, parse_visit_date, Command, CountsError, DateError, Fragment,
};

// Holds nothing per conversation. The only side effect is ticket issuance
// on `payment_completed`.
pub struct StateMachine {
    pricing: PricingTable,
    museum: MuseumInfo,
    issuer: Arc<TicketIssuer>,
}

impl StateMachine {
    pub fn new(pricing: PricingTable, museum: MuseumInfo, issuer: Arc<TicketIssuer>) -> Self {
        Self {
            pricing,
            museum,
            issuer,
        }
    }

    pub fn issuer(&self) -> &TicketIssuer {
        &self.issuer
    }

    pub fn transition(
        &self,
        state: ConversationState,
        input: &str,
        booking: BookingRecord,
        today: NaiveDate,
    ) -> Result<Transition, AppError> {
        let booking = booking.rehydrate(&self.pricing);
        let command = Command::parse(input);

        if command == Some(Command::StartNew) {
            return Ok(self.welcome());
        }

        let transition = match self.unmet_prerequisite(state, command, &booking, today) {
            Some(redirect) => redirect,
            None => self.dispatch(state, command, input, booking, today)?,
        };

        tracing::info!(
            from = state.as_str(),
            to = transition.next.as_str(),
            hint = ?transition.hint,
            "transition"
        );

        Ok(transition)
    }

    fn dispatch(
        &self,
        state: ConversationState,
        command: Option<Command>,
        input: &str,
        booking: BookingRecord,
        today: NaiveDate,
    ) -> Result<Transition, AppError> {
        let transition = match state {
            ConversationState::InitialOptions | ConversationState::AwaitingInfoOrBook => {
                self.on_initial(command, booking)
            }
            ConversationState::CollectingTicketCounts => self.on_counts(input, booking),
            ConversationState::CollectingContactInfo => self.on_contact(input, booking),
            ConversationState::CollectingDate => self.on_date(input, booking, today),
            ConversationState::AwaitingConfirmation => self.on_confirmation(command, booking),
            ConversationState::AwaitingPayment => self.on_payment(command, booking, today)?,
            ConversationState::Completed => self.on_completed(booking),
        };
        Ok(transition)
    }

    // A state past counts collection sends the conversation back to the
    // earliest step whose data the echoed record lacks. Payment is left to
    // the issuer, which rejects incomplete bookings outright.
    fn unmet_prerequisite(
        &self,
        state: ConversationState,
        command: Option<Command>,
        booking: &BookingRecord,
        today: NaiveDate,
    ) -> Option<Transition> {
        let needs_contact = match state {
            ConversationState::CollectingContactInfo => false,
            ConversationState::CollectingDate => true,
            ConversationState::AwaitingConfirmation if command != Some(Command::Cancel) => true,
            _ => return None,
        };

        if booking.counts().is_empty() {
            return Some(Transition::to(
                ConversationState::CollectingTicketCounts,
                format!("Let's choose your tickets first. {}", self.counts_prompt()),
                booking.clone(),
            ));
        }
        if !needs_contact {
            return None;
        }
        if let Some(field) = booking.missing_contact() {
            return Some(Transition::to(
                ConversationState::CollectingContactInfo,
                missing_contact_prompt(field),
                booking.clone(),
            ));
        }
        if state == ConversationState::AwaitingConfirmation {
            let bookable = booking
                .visit_date
                .is_some_and(|date| date >= today && self.museum.is_open_on(date));
            if !bookable {
                let mut booking = booking.clone();
                booking.visit_date = None;
                return Some(
                    Transition::to(
                        ConversationState::CollectingDate,
                        "Please select your preferred visit date.",
                        booking,
                    )
                    .with_hint(UiHint::ShowDatePicker),
                );
            }
        }
        None
    }

    fn welcome(&self) -> Transition {
        Transition::to(
            ConversationState::InitialOptions,
            format!(
                "Welcome to the {}! How may I assist you today?",
                self.museum.name
            ),
            BookingRecord::default(),
        )
        .with_options(initial_options())
        .with_hint(UiHint::ShowOptions)
    }

    fn on_initial(&self, command: Option<Command>, booking: BookingRecord) -> Transition {
        match command {
            Some(Command::Info) => Transition::to(
                ConversationState::InitialOptions,
                self.museum.description(),
                booking,
            )
            .with_options(initial_options())
            .with_hint(UiHint::ShowOptions),
            Some(Command::Book) => Transition::to(
                ConversationState::CollectingTicketCounts,
                format!("Great! Let's start your booking. {}", self.counts_prompt()),
                BookingRecord::default(),
            ),
            _ => Transition::to(
                ConversationState::InitialOptions,
                "I can help you with museum information or ticket booking. Please choose an option.",
                booking,
            )
            .with_options(initial_options())
            .with_hint(UiHint::ShowOptions),
        }
    }

    fn counts_prompt(&self) -> String {
        format!(
            "How many tickets would you like?\n\
             Adult: {}\n\
             Student: {}\n\
             Child (below 12): {}\n\
             For example: \"2 adult 1 child\".",
            PricingTable::describe(self.pricing.adult),
            PricingTable::describe(self.pricing.student),
            PricingTable::describe(self.pricing.child),
        )
    }

    fn on_counts(&self, input: &str, mut booking: BookingRecord) -> Transition {
        let stay = |prompt: String, booking: BookingRecord| {
            Transition::to(ConversationState::CollectingTicketCounts, prompt, booking)
        };

        match parse_counts(input) {
            Ok(counts) => {
                booking.set_counts(counts, &self.pricing);
                let prompt = format!(
                    "You've selected {}. Total: Rs. {}.\n\
                     Please share your name, email address and phone number, \
                     for example: \"Asha Rao, asha@example.com, 9876543210\".",
                    describe_counts(&booking),
                    booking.total_amount
                );
                Transition::to(ConversationState::CollectingContactInfo, prompt, booking)
            }
            Err(CountsError::AllZero) => stay(
                format!(
                    "You need to book at least one ticket to proceed. {}",
                    self.counts_prompt()
                ),
                booking,
            ),
            Err(CountsError::TooManyNumbers) => stay(
                "I found more numbers than ticket types. Please name each one, \
                 for example: \"2 adult 1 student 1 child\"."
                    .to_string(),
                booking,
            ),
            Err(CountsError::Overflow) => stay(
                "That is more tickets than we can book in one go. Please enter a smaller number."
                    .to_string(),
                booking,
            ),
            Err(CountsError::NoNumbers) => stay(
                format!("I couldn't find any ticket numbers. {}", self.counts_prompt()),
                booking,
            ),
        }
    }

    fn on_contact(&self, input: &str, mut booking: BookingRecord) -> Transition {
        let fragments = extract_contact(input);
        let mut complaint = None;

        // leftover words beside an email or phone only replace a stored
        // name when the message says it is a name
        let name_only = fragments.email.is_none() && fragments.phone.is_none();
        if let Some(name) = fragments.name {
            if booking.name.is_none() || name_only || fragments.name_cued {
                booking.name = Some(name);
            }
        }
        match fragments.email {
            Some(Fragment::Valid(email)) => booking.email = Some(email),
            Some(Fragment::Invalid(_)) => {
                complaint = Some(
                    "That email address doesn't look right. \
                     Please enter a valid email address (e.g., example@domain.com).",
                )
            }
            None => {}
        }
        match fragments.phone {
            Some(Fragment::Valid(phone)) => booking.phone = Some(phone),
            Some(Fragment::Invalid(_)) => {
                complaint = complaint.or(Some(
                    "Please enter a valid phone number with 10 to 13 digits (e.g., 9876543210).",
                ))
            }
            None => {}
        }

        if let Some(complaint) = complaint {
            return Transition::to(ConversationState::CollectingContactInfo, complaint, booking);
        }

        match booking.missing_contact() {
            Some(field) => Transition::to(
                ConversationState::CollectingContactInfo,
                missing_contact_prompt(field),
                booking,
            ),
            None => {
                let prompt = format!(
                    "Thank you, {}! Please select your preferred visit date.",
                    booking.name.as_deref().unwrap_or_default()
                );
                Transition::to(ConversationState::CollectingDate, prompt, booking)
                    .with_hint(UiHint::ShowDatePicker)
            }
        }
    }

    fn on_date(&self, input: &str, mut booking: BookingRecord, today: NaiveDate) -> Transition {
        match parse_visit_date(input, today, &self.museum) {
            Ok(date) => {
                booking.visit_date = Some(date);
                booking.recompute_total(&self.pricing);
                let prompt = format!(
                    "Booking Summary:\n{}\n\nWould you like to confirm this booking?",
                    self.summary(&booking)
                );
                Transition::to(ConversationState::AwaitingConfirmation, prompt, booking)
                    .with_options(confirmation_options())
                    .with_hint(UiHint::ShowConfirmation)
            }
            Err(err) => {
                let prompt = match err {
                    DateError::Malformed => {
                        "Please choose a visit date in YYYY-MM-DD format (e.g., 2030-01-15)."
                            .to_string()
                    }
                    DateError::InPast => {
                        "That date has already passed. Please choose today or a later date."
                            .to_string()
                    }
                    DateError::Closed(day) => format!(
                        "The museum is closed on {}s. Please choose another date.",
                        day_name(day)
                    ),
                };
                Transition::to(ConversationState::CollectingDate, prompt, booking)
                    .with_hint(UiHint::ShowDatePicker)
            }
        }
    }

    fn on_confirmation(&self, command: Option<Command>, booking: BookingRecord) -> Transition {
        match command {
            Some(Command::Confirm) => {
                let prompt = format!(
                    "Great! Your booking is confirmed. Please proceed with the payment of Rs. {}.",
                    booking.total_amount
                );
                Transition::to(ConversationState::AwaitingPayment, prompt, booking)
                    .with_hint(UiHint::ShowPayment)
            }
            Some(Command::Cancel) => Transition::to(
                ConversationState::InitialOptions,
                "Booking cancelled. What would you like to do next?",
                BookingRecord::default(),
            )
            .with_options(initial_options())
            .with_hint(UiHint::ShowOptions),
            _ => Transition::to(
                ConversationState::AwaitingConfirmation,
                "Please select either 'confirm' or 'cancel' to proceed.",
                booking,
            )
            .with_options(confirmation_options())
            .with_hint(UiHint::ShowConfirmation),
        }
    }

    fn on_payment(
        &self,
        command: Option<Command>,
        mut booking: BookingRecord,
        today: NaiveDate,
    ) -> Result<Transition, AppError> {
        let transition = match command {
            Some(Command::PaymentCompleted) => {
                let ticket = self.issuer.issue(&booking, today)?;
                booking.booking_ref = Some(ticket.booking_ref.clone());
                booking.total_amount = ticket.total_amount;
                Transition::to(
                    ConversationState::Completed,
                    completion_message(&ticket),
                    booking,
                )
                .with_hint(UiHint::ShowDownload)
                .with_ticket(ticket)
            }
            Some(Command::PaymentFailed) => Transition::to(
                ConversationState::AwaitingPayment,
                "The payment did not go through. Please try again.",
                booking,
            )
            .with_hint(UiHint::ShowPayment),
            _ => Transition::to(
                ConversationState::AwaitingPayment,
                format!(
                    "Please complete the payment of Rs. {} to finish your booking.",
                    booking.total_amount
                ),
                booking,
            )
            .with_hint(UiHint::ShowPayment),
        };
        Ok(transition)
    }

    fn on_completed(&self, booking: BookingRecord) -> Transition {
        Transition::to(
            ConversationState::Completed,
            "Our conversation has ended. Choose 'Start New Chat' to make another booking.",
            booking,
        )
        .with_options(vec![ChatOption::new("Start New Chat", "start_new")])
        .with_hint(UiHint::ShowDownload)
    }

    fn summary(&self, booking: &BookingRecord) -> String {
        let price = |count: u32, unit: u32| {
            if unit == 0 {
                format!("{count} (free)")
            } else {
                format!("{count} x Rs. {unit}")
            }
        };
        format!(
            "Name: {}\n\
             Email: {}\n\
             Phone: {}\n\
             Visit Date: {}\n\
             Adult Tickets: {}\n\
             Student Tickets: {}\n\
             Child Tickets: {}\n\n\
             Total Amount: Rs. {}",
            booking.name.as_deref().unwrap_or("-"),
            booking.email.as_deref().unwrap_or("-"),
            booking.phone.as_deref().unwrap_or("-"),
            booking
                .visit_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "-".to_string()),
            price(booking.adult_tickets, self.pricing.adult),
            price(booking.student_tickets, self.pricing.student),
            price(booking.child_tickets, self.pricing.child),
            booking.total_amount,
        )
    }
}

fn initial_options() -> Vec<ChatOption> {
    vec![
        ChatOption::new("Museum Information", "info"),
        ChatOption::new("Book Tickets", "book"),
    ]
}

fn confirmation_options() -> Vec<ChatOption> {
    vec![
        ChatOption::new("Confirm Booking", "confirm"),
        ChatOption::new("Cancel", "cancel"),
    ]
}

fn missing_contact_prompt(field: ContactField) -> &'static str {
    match field {
        ContactField::Name => "Please tell me the name for this booking.",
        ContactField::Email => "Please provide your email address (e.g., example@domain.com).",
        ContactField::Phone => "Please share your phone number (e.g., 9876543210).",
    }
}

// "2 adult, 1 child"
fn describe_counts(booking: &BookingRecord) -> String {
    [
        (booking.adult_tickets, "adult"),
        (booking.student_tickets, "student"),
        (booking.child_tickets, "child"),
    ]
    .into_iter()
    .filter(|(count, _)| *count > 0)
    .map(|(count, label)| format!("{count} {label}"))
    .collect::<Vec<_>>()
    .join(", ")
}

fn completion_message(ticket: &TicketData) -> String {
    format!(
        "Payment completed successfully!\n\n\
         Booking Reference: {}\n\
         Name: {}\n\
         Email: {}\n\
         Phone: {}\n\
         Visit Date: {}\n\n\
         Adult Tickets: {}\n\
         Student Tickets: {}\n\
         Child Tickets: {}\n\
         Total Amount: Rs. {}\n\n\
         Thank you for booking with us! You can download your ticket below.",
        ticket.booking_ref,
        ticket.name,
        ticket.email,
        ticket.phone,
        ticket.visit_date.format("%Y-%m-%d"),
        ticket.adult_tickets,
        ticket.student_tickets,
        ticket.child_tickets,
        ticket.total_amount,
    )
}
