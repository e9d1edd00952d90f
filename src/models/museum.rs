use chrono::{Datelike, NaiveDate, Weekday};

const DAY_ORDER: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MuseumInfo {
    pub name: String,
    pub closed_weekdays: Vec<Weekday>,
}

impl Default for MuseumInfo {
    fn default() -> Self {
        Self {
            name: "National Museum of India".to_string(),
            closed_weekdays: vec![Weekday::Mon],
        }
    }
}

impl MuseumInfo {
    pub fn is_open_on(&self, date: NaiveDate) -> bool {
        !self.closed_weekdays.contains(&date.weekday())
    }

    pub fn opening_days(&self) -> String {
        let open: Vec<Weekday> = DAY_ORDER
            .into_iter()
            .filter(|d| !self.closed_weekdays.contains(d))
            .collect();
        match open.as_slice() {
            [] => "closed until further notice".to_string(),
            [only] => format!("{} only", day_name(*only)),
            _ if open.len() == 7 => "every day".to_string(),
            _ => {
                let closed: Vec<&str> = DAY_ORDER
                    .into_iter()
                    .filter(|d| self.closed_weekdays.contains(d))
                    .map(day_name)
                    .collect();
                format!("every day except {}", closed.join(", "))
            }
        }
    }

    pub fn description(&self) -> String {
        format!(
            "Welcome to the {name}!\n\n\
             About:\n\
             The {name} houses over 200,000 works of art spanning 5,000 years of cultural heritage.\n\n\
             Opening hours:\n\
             10:00 AM - 6:00 PM, {days}. Closed on national holidays.\n\n\
             Location:\n\
             Janpath, New Delhi, India\n\n\
             Contact:\n\
             Phone: +91-11-23019272\n\
             Email: info@nationalmuseum.in\n\n\
             Would you like to book tickets now?",
            name = self.name,
            days = self.opening_days(),
        )
    }
}

pub fn day_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

// "mon,tue"
pub fn parse_weekdays(s: &str) -> anyhow::Result<Vec<Weekday>> {
    s.split(',')
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(parse_weekday)
        .collect()
}

fn parse_weekday(s: &str) -> anyhow::Result<Weekday> {
    match s.to_lowercase().as_str() {
        "mon" => Ok(Weekday::Mon),
        "tue" => Ok(Weekday::Tue),
        "wed" => Ok(Weekday::Wed),
        "thu" => Ok(Weekday::Thu),
        "fri" => Ok(Weekday::Fri),
        "sat" => Ok(Weekday::Sat),
        "sun" => Ok(Weekday::Sun),
        _ => Err(anyhow::anyhow!("invalid weekday: {s}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_closed_on_monday_by_default() {
        let museum = MuseumInfo::default();
        // 2030-01-07 is a Monday
        assert!(!museum.is_open_on(date("2030-01-07")));
        assert!(museum.is_open_on(date("2030-01-08")));
    }

    #[test]
    fn test_parse_weekdays() {
        assert_eq!(
            parse_weekdays("mon, Sun").unwrap(),
            vec![Weekday::Mon, Weekday::Sun]
        );
        assert!(parse_weekdays("").unwrap().is_empty());
        assert!(parse_weekdays("mon,xyz").is_err());
    }

    #[test]
    fn test_opening_days() {
        let mut museum = MuseumInfo::default();
        assert_eq!(museum.opening_days(), "every day except Monday");
        museum.closed_weekdays = vec![];
        assert_eq!(museum.opening_days(), "every day");
        museum.closed_weekdays = vec![Weekday::Sun, Weekday::Mon];
        assert_eq!(museum.opening_days(), "every day except Monday, Sunday");
    }

    #[test]
    fn test_description_mentions_name_and_days() {
        let text = MuseumInfo::default().description();
        assert!(text.contains("National Museum of India"));
        assert!(text.contains("every day except Monday"));
    }
}
