pub mod booking;
pub mod conversation;
pub mod museum;
pub mod pricing;
pub mod ticket;

pub use booking::{BookingRecord, ContactField, TicketCounts};
pub use conversation::{ChatOption, ConversationState, Transition, UiHint};
pub use museum::MuseumInfo;
pub use pricing::PricingTable;
pub use ticket::{IssuedTicket, TicketData};
