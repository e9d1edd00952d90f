use chrono::NaiveDate;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};

use crate::models::{IssuedTicket, PricingTable, TicketData};

// ── Tickets ──

// Fails with a constraint violation if the reference is already in the ledger.
pub fn insert_ticket(
    conn: &Connection,
    ticket: &TicketData,
    prices: &PricingTable,
) -> rusqlite::Result<()> {
    let visit_date = ticket.visit_date.format("%Y-%m-%d").to_string();
    let total_amount = i64::try_from(ticket.total_amount)
        .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

    conn.execute(
        "INSERT INTO tickets (booking_ref, name, email, phone, visit_date, adult_tickets, student_tickets, child_tickets, total_amount, adult_price, student_price, child_price)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            ticket.booking_ref,
            ticket.name,
            ticket.email,
            ticket.phone,
            visit_date,
            ticket.adult_tickets,
            ticket.student_tickets,
            ticket.child_tickets,
            total_amount,
            prices.adult,
            prices.student,
            prices.child,
        ],
    )?;
    Ok(())
}

pub fn get_ticket(conn: &Connection, booking_ref: &str) -> rusqlite::Result<Option<IssuedTicket>> {
    conn.query_row(
        "SELECT booking_ref, name, email, phone, visit_date, adult_tickets, student_tickets, child_tickets, total_amount, adult_price, student_price, child_price
         FROM tickets WHERE booking_ref = ?1",
        params![booking_ref],
        parse_ticket_row,
    )
    .optional()
}

pub fn count_tickets(conn: &Connection) -> rusqlite::Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM tickets", [], |row| row.get(0))
}

fn parse_ticket_row(row: &rusqlite::Row) -> rusqlite::Result<IssuedTicket> {
    let visit_date_str: String = row.get(4)?;
    let visit_date = NaiveDate::parse_from_str(&visit_date_str, "%Y-%m-%d")
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?;
    let total_amount: i64 = row.get(8)?;
    let total_amount = u64::try_from(total_amount)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(8, Type::Integer, Box::new(e)))?;

    let adult_price: Option<u32> = row.get(9)?;
    let student_price: Option<u32> = row.get(10)?;
    let child_price: Option<u32> = row.get(11)?;
    let prices = match (adult_price, student_price, child_price) {
        (Some(adult), Some(student), Some(child)) => Some(PricingTable {
            adult,
            student,
            child,
        }),
        _ => None,
    };

    Ok(IssuedTicket {
        ticket: TicketData {
            booking_ref: row.get(0)?,
            name: row.get(1)?,
            email: row.get(2)?,
            phone: row.get(3)?,
            visit_date,
            adult_tickets: row.get(5)?,
            student_tickets: row.get(6)?,
            child_tickets: row.get(7)?,
            total_amount,
        },
        prices,
    })
}
