use serde::{Deserialize, Serialize};

use super::TicketCounts;

// whole rupees
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingTable {
    pub adult: u32,
    pub student: u32,
    pub child: u32,
}

impl Default for PricingTable {
    fn default() -> Self {
        Self {
            adult: 500,
            student: 250,
            child: 0,
        }
    }
}

impl PricingTable {
    pub fn compute_total(&self, counts: &TicketCounts) -> u64 {
        let line = |count: u32, price: u32| u64::from(count) * u64::from(price);
        line(counts.adult, self.adult)
            .saturating_add(line(counts.student, self.student))
            .saturating_add(line(counts.child, self.child))
    }

    pub fn describe(price: u32) -> String {
        if price == 0 {
            "free entry".to_string()
        } else {
            format!("Rs. {price} per ticket")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prices() {
        let pricing = PricingTable::default();
        assert_eq!(pricing.adult, 500);
        assert_eq!(pricing.student, 250);
        assert_eq!(pricing.child, 0);
    }

    #[test]
    fn test_compute_total_dot_product() {
        let pricing = PricingTable::default();
        let counts = TicketCounts {
            adult: 2,
            student: 3,
            child: 4,
        };
        assert_eq!(pricing.compute_total(&counts), 2 * 500 + 3 * 250);
    }

    #[test]
    fn test_free_children_still_counted_as_tickets() {
        let pricing = PricingTable::default();
        let counts = TicketCounts {
            adult: 0,
            student: 0,
            child: 2,
        };
        assert_eq!(pricing.compute_total(&counts), 0);
        assert!(!counts.is_empty());
    }

    #[test]
    fn test_large_counts_do_not_overflow() {
        let pricing = PricingTable {
            adult: u32::MAX,
            student: u32::MAX,
            child: u32::MAX,
        };
        let counts = TicketCounts {
            adult: u32::MAX,
            student: 0,
            child: 0,
        };
        assert_eq!(
            pricing.compute_total(&counts),
            u64::from(u32::MAX) * u64::from(u32::MAX)
        );
    }

    #[test]
    fn test_describe() {
        assert_eq!(PricingTable::describe(500), "Rs. 500 per ticket");
        assert_eq!(PricingTable::describe(0), "free entry");
    }
}
