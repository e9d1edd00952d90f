use std::sync::{Arc, Mutex, MutexGuard};

use chrono::NaiveDate;
use rusqlite::{Connection, ErrorCode};

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{BookingRecord, IssuedTicket, PricingTable, TicketData};

const REFERENCE_PREFIX: &str = "MSM";
const MAX_ALLOCATION_ATTEMPTS: usize = 8;

// The ledger mutex is the only lock taken on the request path.
pub struct TicketIssuer {
    db: Arc<Mutex<Connection>>,
    pricing: PricingTable,
}

impl TicketIssuer {
    pub fn new(db: Arc<Mutex<Connection>>, pricing: PricingTable) -> Self {
        Self { db, pricing }
    }

    pub fn issue(&self, booking: &BookingRecord, issued_on: NaiveDate) -> Result<TicketData, AppError> {
        if let Some(existing) = &booking.booking_ref {
            return Err(AppError::AlreadyIssued(existing.clone()));
        }

        let gaps = booking.issuance_gaps();
        if !gaps.is_empty() {
            return Err(AppError::IncompleteBooking(gaps.join(", ")));
        }
        let (Some(name), Some(email), Some(phone), Some(visit_date)) = (
            booking.name.as_deref(),
            booking.email.as_deref(),
            booking.phone.as_deref(),
            booking.visit_date,
        ) else {
            return Err(AppError::IncompleteBooking("contact details".to_string()));
        };

        let mut ticket = TicketData {
            booking_ref: String::new(),
            name: name.trim().to_string(),
            email: email.trim().to_string(),
            phone: phone.trim().to_string(),
            visit_date,
            adult_tickets: booking.adult_tickets,
            student_tickets: booking.student_tickets,
            child_tickets: booking.child_tickets,
            total_amount: self.pricing.compute_total(&booking.counts()),
        };

        let db = self.ledger()?;
        for _ in 0..MAX_ALLOCATION_ATTEMPTS {
            ticket.booking_ref = generate_reference(issued_on);
            match queries::insert_ticket(&db, &ticket, &self.pricing) {
                Ok(()) => {
                    tracing::info!(
                        booking_ref = %ticket.booking_ref,
                        visit_date = %ticket.visit_date,
                        total_amount = ticket.total_amount,
                        "ticket issued"
                    );
                    return Ok(ticket);
                }
                Err(e) if e.sqlite_error_code() == Some(ErrorCode::ConstraintViolation) => {
                    tracing::warn!(booking_ref = %ticket.booking_ref, "booking reference collision, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(AppError::Internal(
            "could not allocate a unique booking reference".to_string(),
        ))
    }

    pub fn lookup(&self, booking_ref: &str) -> Result<Option<IssuedTicket>, AppError> {
        let db = self.ledger()?;
        Ok(queries::get_ticket(&db, booking_ref)?)
    }

    pub fn issued_count(&self) -> Result<i64, AppError> {
        let db = self.ledger()?;
        Ok(queries::count_tickets(&db)?)
    }

    fn ledger(&self) -> Result<MutexGuard<'_, Connection>, AppError> {
        self.db
            .lock()
            .map_err(|_| AppError::Internal("ticket ledger lock poisoned".to_string()))
    }
}

// MSM<YYYYMMDD><6 hex digits>, e.g. MSM20300108A1B2C3
pub fn generate_reference(issued_on: NaiveDate) -> String {
    let token = uuid::Uuid::new_v4().simple().to_string();
    format!(
        "{REFERENCE_PREFIX}{}{}",
        issued_on.format("%Y%m%d"),
        token[..6].to_uppercase()
    )
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::thread;

    use super::*;
    use crate::db;

    fn issuer() -> TicketIssuer {
        let conn = db::init_db(":memory:").unwrap();
        TicketIssuer::new(Arc::new(Mutex::new(conn)), PricingTable::default())
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2030, 1, 1).unwrap()
    }

    fn paid_booking(name: &str) -> BookingRecord {
        BookingRecord {
            adult_tickets: 2,
            child_tickets: 1,
            name: Some(name.to_string()),
            email: Some("asha@example.com".to_string()),
            phone: Some("9876543210".to_string()),
            visit_date: NaiveDate::from_ymd_opt(2030, 1, 8),
            total_amount: 1,
            ..Default::default()
        }
    }

    #[test]
    fn test_reference_format() {
        let reference = generate_reference(today());
        assert_eq!(reference.len(), 17);
        assert!(reference.starts_with("MSM20300101"));
        assert!(reference[11..]
            .chars()
            .all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c)));
    }

    #[test]
    fn test_issue_freezes_booking_and_recomputes_total() {
        let issuer = issuer();
        let ticket = issuer.issue(&paid_booking("Asha Rao"), today()).unwrap();

        assert_eq!(ticket.name, "Asha Rao");
        assert_eq!(ticket.adult_tickets, 2);
        assert_eq!(ticket.child_tickets, 1);
        assert_eq!(ticket.total_amount, 1000);
        let stored = issuer.lookup(&ticket.booking_ref).unwrap().unwrap();
        assert_eq!(stored.ticket, ticket);
        assert_eq!(stored.prices, Some(PricingTable::default()));
        assert_eq!(issuer.issued_count().unwrap(), 1);
    }

    #[test]
    fn test_issued_prices_survive_price_change() {
        let db = Arc::new(Mutex::new(db::init_db(":memory:").unwrap()));
        let before = TicketIssuer::new(Arc::clone(&db), PricingTable::default());
        let ticket = before.issue(&paid_booking("Asha Rao"), today()).unwrap();

        let raised = PricingTable {
            adult: 600,
            student: 300,
            child: 50,
        };
        let after = TicketIssuer::new(db, raised);
        let stored = after.lookup(&ticket.booking_ref).unwrap().unwrap();
        assert_eq!(stored.ticket.total_amount, 1000);
        assert_eq!(stored.prices, Some(PricingTable::default()));

        let fresh = after.issue(&paid_booking("Ravi Rao"), today()).unwrap();
        assert_eq!(fresh.total_amount, 1250);
    }

    #[test]
    fn test_issue_rejects_already_issued_booking() {
        let issuer = issuer();
        let mut booking = paid_booking("Asha Rao");
        let ticket = issuer.issue(&booking, today()).unwrap();
        booking.booking_ref = Some(ticket.booking_ref.clone());

        let err = issuer.issue(&booking, today()).unwrap_err();
        assert!(matches!(err, AppError::AlreadyIssued(r) if r == ticket.booking_ref));
        assert_eq!(issuer.issued_count().unwrap(), 1);
    }

    #[test]
    fn test_issue_rejects_incomplete_booking() {
        let issuer = issuer();
        let mut booking = paid_booking("Asha Rao");
        booking.visit_date = None;
        booking.adult_tickets = 0;
        booking.child_tickets = 0;

        let err = issuer.issue(&booking, today()).unwrap_err();
        match err {
            AppError::IncompleteBooking(missing) => {
                assert_eq!(missing, "ticket counts, visit date");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_concurrent_issuance_yields_unique_references() {
        let issuer = Arc::new(issuer());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let issuer = Arc::clone(&issuer);
                thread::spawn(move || {
                    (0..25)
                        .map(|i| {
                            issuer
                                .issue(&paid_booking(&format!("Visitor {t} {i}")), today())
                                .unwrap()
                                .booking_ref
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for reference in handle.join().unwrap() {
                assert!(seen.insert(reference), "duplicate booking reference");
            }
        }
        assert_eq!(seen.len(), 200);
    }
}
