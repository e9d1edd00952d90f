use std::env;

use chrono::Weekday;

use crate::models::museum::parse_weekdays;
use crate::models::PricingTable;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub museum_name: String,
    pub pricing: PricingTable,
    pub closed_weekdays: Vec<Weekday>,
    /// Offset used to decide what "today" is for visit dates.
    pub utc_offset_minutes: i32,
    pub cors_origin: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            database_url: "turnstile.db".to_string(),
            museum_name: "National Museum of India".to_string(),
            pricing: PricingTable::default(),
            closed_weekdays: vec![Weekday::Mon],
            utc_offset_minutes: 330,
            cors_origin: "http://localhost:5173".to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            port: parsed("PORT").unwrap_or(defaults.port),
            database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            museum_name: env::var("MUSEUM_NAME").unwrap_or(defaults.museum_name),
            pricing: PricingTable {
                adult: parsed("PRICE_ADULT").unwrap_or(defaults.pricing.adult),
                student: parsed("PRICE_STUDENT").unwrap_or(defaults.pricing.student),
                child: parsed("PRICE_CHILD").unwrap_or(defaults.pricing.child),
            },
            closed_weekdays: match env::var("CLOSED_WEEKDAYS") {
                Ok(v) => parse_weekdays(&v).unwrap_or_else(|e| {
                    tracing::warn!(error = %e, "ignoring CLOSED_WEEKDAYS");
                    defaults.closed_weekdays
                }),
                Err(_) => defaults.closed_weekdays,
            },
            utc_offset_minutes: parsed("UTC_OFFSET_MINUTES")
                .filter(|m: &i32| m.abs() < 24 * 60)
                .unwrap_or(defaults.utc_offset_minutes),
            cors_origin: env::var("CORS_ORIGIN").unwrap_or(defaults.cors_origin),
        }
    }
}

fn parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}
