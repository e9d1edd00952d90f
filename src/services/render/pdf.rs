use async_trait::async_trait;

use super::TicketRenderer;
use crate::models::{IssuedTicket, PricingTable};

const PAGE_WIDTH: u32 = 595;
const PAGE_HEIGHT: u32 = 842;
const MARGIN_LEFT: u32 = 72;
const TOP: u32 = 780;

const INSTRUCTIONS: [&str; 5] = [
    "- Please arrive 15 minutes before your scheduled visit time",
    "- Present this ticket at the entrance (digital or printed)",
    "- Photography is allowed without flash",
    "- No food and beverages allowed inside",
    "- Please maintain silence in the museum premises",
];

// Single page, standard Helvetica fonts only.
pub struct PdfTicketRenderer {
    museum_name: String,
}

struct Line {
    bold: bool,
    size: u32,
    gap_before: u32,
    text: String,
}

impl Line {
    fn heading(size: u32, gap_before: u32, text: impl Into<String>) -> Self {
        Self {
            bold: true,
            size,
            gap_before,
            text: text.into(),
        }
    }

    fn body(text: impl Into<String>) -> Self {
        Self {
            bold: false,
            size: 12,
            gap_before: 0,
            text: text.into(),
        }
    }

    fn spaced(mut self, gap_before: u32) -> Self {
        self.gap_before = gap_before;
        self
    }
}

impl PdfTicketRenderer {
    pub fn new(museum_name: String) -> Self {
        Self { museum_name }
    }

    fn lines(&self, issued: &IssuedTicket) -> Vec<Line> {
        let ticket = &issued.ticket;
        let mut lines = vec![
            Line::heading(24, 0, self.museum_name.to_uppercase()),
            Line::heading(20, 8, "ENTRY TICKET"),
            Line::heading(14, 24, "BOOKING DETAILS"),
            Line::body(format!("Booking Reference: {}", ticket.booking_ref)),
            Line::body(format!("Visit Date: {}", ticket.visit_date.format("%Y-%m-%d"))),
            Line::body(format!("Name: {}", ticket.name)),
            Line::body(format!("Email: {}", ticket.email)),
            Line::body(format!("Phone: {}", ticket.phone)),
            Line::heading(12, 12, "TICKET DETAILS"),
        ];

        let categories = [
            ("Adult", ticket.adult_tickets),
            ("Student", ticket.student_tickets),
            ("Child", ticket.child_tickets),
        ];
        for (label, count) in categories.iter().filter(|(_, count)| *count > 0) {
            lines.push(Line::body(format!("{label} Tickets: {count}")));
        }

        if let Some(prices) = &issued.prices {
            lines.push(Line::heading(12, 12, "PRICE BREAKDOWN"));
            lines.extend(price_breakdown(&categories, prices).into_iter().map(Line::body));
        }
        lines.push(Line::heading(
            12,
            12,
            format!("Total Amount: Rs.{}", ticket.total_amount),
        ));

        lines.push(Line::heading(14, 24, "IMPORTANT INSTRUCTIONS"));
        lines.extend(INSTRUCTIONS.iter().map(|text| Line::body(*text)));
        lines.push(Line::body(format!("Thank you for visiting {}", self.museum_name)).spaced(24));

        lines
    }
}

#[async_trait]
impl TicketRenderer for PdfTicketRenderer {
    fn content_type(&self) -> &'static str {
        "application/pdf"
    }

    async fn render(&self, issued: &IssuedTicket) -> anyhow::Result<Vec<u8>> {
        let content = content_stream(&self.lines(issued));
        Ok(build_document(&content))
    }
}

fn price_breakdown(categories: &[(&str, u32); 3], prices: &PricingTable) -> Vec<String> {
    let unit_prices = [prices.adult, prices.student, prices.child];
    categories
        .iter()
        .zip(unit_prices)
        .filter(|((_, count), _)| *count > 0)
        .map(|((label, count), price)| {
            if price == 0 {
                format!("{label}: {count} (free)")
            } else {
                let amount = u64::from(*count) * u64::from(price);
                format!("{label}: {count} x Rs.{price} = Rs.{amount}")
            }
        })
        .collect()
}

fn content_stream(lines: &[Line]) -> String {
    let mut y = TOP;
    let mut stream = String::new();
    for line in lines {
        y = y.saturating_sub(line.gap_before);
        let font = if line.bold { "F2" } else { "F1" };
        stream.push_str(&format!(
            "BT /{font} {} Tf {MARGIN_LEFT} {y} Td ({}) Tj ET\n",
            line.size,
            escape_text(&line.text)
        ));
        y = y.saturating_sub(line.size + 8);
    }
    stream
}

// Anything outside printable ASCII becomes '?'.
fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' | '(' | ')' => {
                out.push('\\');
                out.push(c);
            }
            ' '..='~' => out.push(c),
            _ => out.push('?'),
        }
    }
    out
}

fn build_document(content: &str) -> Vec<u8> {
    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {PAGE_WIDTH} {PAGE_HEIGHT}] \
             /Resources << /Font << /F1 5 0 R /F2 6 0 R >> >> /Contents 4 0 R >>"
        ),
        format!(
            "<< /Length {} >>\nstream\n{content}\nendstream",
            content.len()
        ),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold >>".to_string(),
    ];

    let mut out = String::from("%PDF-1.4\n");
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.push_str(&format!("{} 0 obj\n{body}\nendobj\n", i + 1));
    }

    let xref_offset = out.len();
    out.push_str(&format!(
        "xref\n0 {}\n0000000000 65535 f \n",
        objects.len() + 1
    ));
    for offset in offsets {
        out.push_str(&format!("{offset:010} 00000 n \n"));
    }
    out.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n",
        objects.len() + 1
    ));

    out.into_bytes()
}
