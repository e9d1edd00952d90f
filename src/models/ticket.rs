use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{PricingTable, TicketCounts};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketData {
    pub booking_ref: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub visit_date: NaiveDate,
    pub adult_tickets: u32,
    pub student_tickets: u32,
    pub child_tickets: u32,
    pub total_amount: u64,
}

impl TicketData {
    pub fn counts(&self) -> TicketCounts {
        TicketCounts {
            adult: self.adult_tickets,
            student: self.student_tickets,
            child: self.child_tickets,
        }
    }

    pub fn first_difference(&self, other: &TicketData) -> Option<&'static str> {
        if self.booking_ref != other.booking_ref {
            Some("booking_ref")
        } else if self.name != other.name {
            Some("name")
        } else if self.email != other.email {
            Some("email")
        } else if self.phone != other.phone {
            Some("phone")
        } else if self.visit_date != other.visit_date {
            Some("visit_date")
        } else if self.counts() != other.counts() {
            Some("ticket counts")
        } else if self.total_amount != other.total_amount {
            Some("total_amount")
        } else {
            None
        }
    }
}

// A ledger row: the ticket plus the unit prices it was sold at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedTicket {
    pub ticket: TicketData,
    // rows written before prices were recorded have none
    pub prices: Option<PricingTable>,
}
