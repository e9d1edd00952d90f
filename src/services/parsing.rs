use chrono::{Datelike, NaiveDate, Weekday};

use crate::models::booking::{is_valid_email, is_valid_phone, phone_digits, PHONE_MIN_DIGITS};
use crate::models::{MuseumInfo, TicketCounts};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Info,
    Book,
    Confirm,
    Cancel,
    PaymentCompleted,
    PaymentFailed,
    StartNew,
}

impl Command {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "info" => Some(Command::Info),
            "book" => Some(Command::Book),
            "confirm" => Some(Command::Confirm),
            "cancel" => Some(Command::Cancel),
            "payment_completed" => Some(Command::PaymentCompleted),
            "payment_failed" => Some(Command::PaymentFailed),
            "start_new" => Some(Command::StartNew),
            _ => None,
        }
    }
}

// ── Ticket counts ──

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountsError {
    NoNumbers,
    TooManyNumbers,
    Overflow,
    AllZero,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Category {
    Adult,
    Student,
    Child,
}

const FILL_ORDER: [Category; 3] = [Category::Adult, Category::Student, Category::Child];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Number(u32),
    Category(Category),
    Word,
}

impl Token {
    fn is_meaningful(&self) -> bool {
        !matches!(self, Token::Word)
    }
}

fn category_of(word: &str) -> Option<Category> {
    match word {
        "adult" | "adults" => Some(Category::Adult),
        "student" | "students" => Some(Category::Student),
        "child" | "children" | "childs" | "kid" | "kids" => Some(Category::Child),
        _ => None,
    }
}

fn tokenize(input: &str) -> Result<Vec<Token>, CountsError> {
    let lower = input.to_lowercase();
    let mut tokens = Vec::new();
    let mut chars = lower.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_ascii_digit() {
            let mut digits = String::new();
            while let Some(&d) = chars.peek().filter(|d| d.is_ascii_digit()) {
                digits.push(d);
                chars.next();
            }
            // clock times such as 10:30 are not counts
            let mut ahead = chars.clone();
            if ahead.next() == Some(':') && ahead.peek().is_some_and(char::is_ascii_digit) {
                while let Some(&d) = chars.peek().filter(|d| d.is_ascii_digit() || **d == ':') {
                    digits.push(d);
                    chars.next();
                }
                tokens.push(Token::Word);
                continue;
            }
            let n = digits.parse::<u32>().map_err(|_| CountsError::Overflow)?;
            tokens.push(Token::Number(n));
        } else if c.is_alphabetic() {
            let mut word = String::new();
            while let Some(&w) = chars.peek().filter(|w| w.is_alphabetic() || **w == '\'') {
                word.push(w);
                chars.next();
            }
            let word = word.trim_end_matches("'s");
            tokens.push(match category_of(word) {
                Some(cat) => Token::Category(cat),
                None => Token::Word,
            });
        } else {
            chars.next();
        }
    }

    Ok(tokens)
}

fn next_meaningful(tokens: &[Token], from: usize) -> Option<usize> {
    tokens
        .iter()
        .enumerate()
        .skip(from + 1)
        .find(|(_, t)| t.is_meaningful())
        .map(|(i, _)| i)
}

// A number binds to the category word next to it: the following one when the
// message leads with a number, the preceding one when it leads with a
// category word. Unbound numbers fill adult, student, child in that order,
// skipping categories the message already named.
pub fn parse_counts(input: &str) -> Result<TicketCounts, CountsError> {
    let tokens = tokenize(input)?;
    let label_first = matches!(
        tokens.iter().find(|t| t.is_meaningful()),
        Some(Token::Category(_))
    );

    let mut bound: Vec<(Category, u32)> = Vec::new();
    let mut bare: Vec<u32> = Vec::new();
    let mut consumed = vec![false; tokens.len()];

    for (i, token) in tokens.iter().enumerate() {
        if consumed[i] {
            continue;
        }
        match (*token, label_first) {
            (Token::Number(n), false) => match next_meaningful(&tokens, i) {
                Some(j) => match tokens[j] {
                    Token::Category(cat) => {
                        bound.push((cat, n));
                        consumed[j] = true;
                    }
                    _ => bare.push(n),
                },
                None => bare.push(n),
            },
            (Token::Category(cat), true) => {
                if let Some(j) = next_meaningful(&tokens, i) {
                    if let Token::Number(n) = tokens[j] {
                        bound.push((cat, n));
                        consumed[j] = true;
                    }
                }
            }
            (Token::Number(n), true) => bare.push(n),
            _ => {}
        }
    }

    if bound.is_empty() && bare.is_empty() {
        return Err(CountsError::NoNumbers);
    }

    let named: Vec<Category> = bound.iter().map(|(cat, _)| *cat).collect();
    let free: Vec<Category> = FILL_ORDER
        .into_iter()
        .filter(|cat| !named.contains(cat))
        .collect();
    if bare.len() > free.len() {
        return Err(CountsError::TooManyNumbers);
    }
    bound.extend(free.into_iter().zip(bare));

    let mut counts = TicketCounts::default();
    for (cat, n) in bound {
        let slot = match cat {
            Category::Adult => &mut counts.adult,
            Category::Student => &mut counts.student,
            Category::Child => &mut counts.child,
        };
        *slot = slot.checked_add(n).ok_or(CountsError::Overflow)?;
    }

    if counts.is_empty() {
        return Err(CountsError::AllZero);
    }
    Ok(counts)
}

// ── Visit date ──

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateError {
    Malformed,
    InPast,
    Closed(Weekday),
}

pub fn parse_visit_date(
    input: &str,
    today: NaiveDate,
    museum: &MuseumInfo,
) -> Result<NaiveDate, DateError> {
    let trimmed = input.trim();
    if trimmed.len() != 10 {
        return Err(DateError::Malformed);
    }
    let date = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").map_err(|_| DateError::Malformed)?;
    if date < today {
        return Err(DateError::InPast);
    }
    if !museum.is_open_on(date) {
        return Err(DateError::Closed(date.weekday()));
    }
    Ok(date)
}

// ── Contact details ──

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    Valid(String),
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactFragments {
    pub name: Option<String>,
    // the name followed a cue such as "my name is" or "I am"
    pub name_cued: bool,
    pub email: Option<Fragment>,
    pub phone: Option<Fragment>,
}

const FILLER_WORDS: &[&str] = &[
    "my", "name", "is", "i", "am", "im", "i'm", "it's", "its", "this", "email", "e-mail", "mail",
    "id", "phone", "mobile", "number", "no", "contact", "and", "at", "please", "thanks", "thank",
    "you", "here", "the", "me", "call", "details", "sure", "yes", "ok", "okay", "hi", "hello",
];

const PHONE_RUN_MIN_DIGITS: usize = 7;

fn is_phone_token(token: &str) -> bool {
    token.chars().any(|c| c.is_ascii_digit())
        && token
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | '(' | ')'))
}

fn is_name_word(token: &str) -> bool {
    token.chars().any(char::is_alphabetic)
        && token
            .chars()
            .all(|c| c.is_alphabetic() || matches!(c, '\'' | '-' | '.'))
}

fn is_filler(token: &str) -> bool {
    let lower = token.trim_end_matches('.').to_lowercase();
    FILLER_WORDS.contains(&lower.as_str())
}

fn run_digits(run: &[&str]) -> usize {
    phone_digits(&run.join(" ")).map_or(0, |d| d.len())
}

fn flush_phone_run(run: &mut Vec<&str>, best: &mut Option<String>) {
    if run.is_empty() {
        return;
    }
    let joined = run.join(" ");
    let digit_count = run_digits(run);
    let best_count = best
        .as_deref()
        .and_then(phone_digits)
        .map_or(0, |d| d.len());
    if digit_count >= PHONE_RUN_MIN_DIGITS && digit_count > best_count {
        *best = Some(joined);
    }
    run.clear();
}

fn is_name_cue(prev: Option<&str>, word: &str) -> bool {
    matches!(
        (prev, word),
        (Some("name"), "is") | (Some("i"), "am") | (_, "i'm") | (_, "im") | (Some("this"), "is")
    )
}

pub fn extract_contact(input: &str) -> ContactFragments {
    let mut fragments = ContactFragments::default();
    let mut name_words: Vec<&str> = Vec::new();
    let mut phone_run: Vec<&str> = Vec::new();
    let mut best_phone: Option<String> = None;
    let mut prev_word: Option<String> = None;

    let tokens = input
        .split(|c: char| c.is_whitespace() || matches!(c, ',' | ';' | ':' | '/' | '|'))
        .filter(|t| !t.is_empty());

    for token in tokens {
        if token.contains('@') {
            flush_phone_run(&mut phone_run, &mut best_phone);
            let email = token.trim_end_matches('.');
            fragments.email = Some(if is_valid_email(email) {
                Fragment::Valid(email.to_string())
            } else {
                Fragment::Invalid(email.to_string())
            });
        } else if is_phone_token(token) {
            // a complete number ends the run; trailing digits start a new one
            if run_digits(&phone_run) >= PHONE_MIN_DIGITS {
                flush_phone_run(&mut phone_run, &mut best_phone);
            }
            phone_run.push(token);
        } else {
            flush_phone_run(&mut phone_run, &mut best_phone);
            let lower = token.trim_end_matches('.').to_lowercase();
            if is_name_cue(prev_word.as_deref(), &lower) {
                fragments.name_cued = true;
            }
            if is_name_word(token) && !is_filler(token) {
                name_words.push(token);
            }
            prev_word = Some(lower);
        }
    }
    flush_phone_run(&mut phone_run, &mut best_phone);

    fragments.phone = best_phone.map(|phone| {
        if is_valid_phone(&phone) {
            Fragment::Valid(phone)
        } else {
            Fragment::Invalid(phone)
        }
    });

    if !name_words.is_empty() {
        fragments.name = Some(name_words.join(" "));
    }

    fragments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(adult: u32, student: u32, child: u32) -> TicketCounts {
        TicketCounts {
            adult,
            student,
            child,
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_command_vocabulary() {
        assert_eq!(Command::parse(" Book "), Some(Command::Book));
        assert_eq!(Command::parse("PAYMENT_COMPLETED"), Some(Command::PaymentCompleted));
        assert_eq!(Command::parse("book tickets"), None);
        assert_eq!(Command::parse(""), None);
    }

    #[test]
    fn test_counts_count_first() {
        assert_eq!(parse_counts("2 adult 1 child"), Ok(counts(2, 0, 1)));
        assert_eq!(parse_counts("2 adults, 3 students and 1 kid"), Ok(counts(2, 3, 1)));
        assert_eq!(parse_counts("2 adult tickets and 1 child ticket"), Ok(counts(2, 0, 1)));
        assert_eq!(parse_counts("1 student"), Ok(counts(0, 1, 0)));
    }

    #[test]
    fn test_counts_label_first() {
        assert_eq!(parse_counts("adults 2 children 1"), Ok(counts(2, 0, 1)));
        assert_eq!(parse_counts("Adult: 2, Student: 1"), Ok(counts(2, 1, 0)));
        assert_eq!(parse_counts("kids=3; adults=1"), Ok(counts(1, 0, 3)));
    }

    #[test]
    fn test_single_bare_number_is_adult() {
        assert_eq!(parse_counts("3"), Ok(counts(3, 0, 0)));
        assert_eq!(parse_counts("we are 4"), Ok(counts(4, 0, 0)));
    }

    #[test]
    fn test_bare_numbers_fill_adult_student_child() {
        assert_eq!(parse_counts("2 3 1"), Ok(counts(2, 3, 1)));
        assert_eq!(parse_counts("2 1"), Ok(counts(2, 1, 0)));
    }

    #[test]
    fn test_bare_numbers_skip_named_categories() {
        // "3" binds to adults, leaving student then child for the bare 1
        assert_eq!(parse_counts("1, 3 adults"), Ok(counts(3, 1, 0)));
        assert_eq!(parse_counts("2 adults and 1"), Ok(counts(2, 1, 0)));
    }

    #[test]
    fn test_repeated_category_adds_up() {
        assert_eq!(parse_counts("1 adult and 1 adult"), Ok(counts(2, 0, 0)));
    }

    #[test]
    fn test_counts_rejections() {
        assert_eq!(parse_counts("some tickets please"), Err(CountsError::NoNumbers));
        assert_eq!(parse_counts("0 adult 0 child"), Err(CountsError::AllZero));
        assert_eq!(parse_counts("0"), Err(CountsError::AllZero));
        assert_eq!(parse_counts("1 2 3 4"), Err(CountsError::TooManyNumbers));
        assert_eq!(parse_counts("99999999999 adults"), Err(CountsError::Overflow));
    }

    #[test]
    fn test_possessive_category() {
        assert_eq!(parse_counts("1 adult 2 child's"), Ok(counts(1, 0, 2)));
    }

    #[test]
    fn test_visit_date_accepts_today_and_future() {
        let museum = MuseumInfo {
            closed_weekdays: vec![],
            ..Default::default()
        };
        let today = date("2030-01-01");
        assert_eq!(parse_visit_date("2030-01-01", today, &museum), Ok(today));
        assert_eq!(
            parse_visit_date(" 2030-02-15 ", today, &museum),
            Ok(date("2030-02-15"))
        );
    }

    #[test]
    fn test_visit_date_rejections() {
        let museum = MuseumInfo::default();
        let today = date("2030-01-01");
        assert_eq!(
            parse_visit_date("2029-12-31", today, &museum),
            Err(DateError::InPast)
        );
        assert_eq!(parse_visit_date("tomorrow", today, &museum), Err(DateError::Malformed));
        assert_eq!(parse_visit_date("2030-02-30", today, &museum), Err(DateError::Malformed));
        assert_eq!(parse_visit_date("2030-1-8", today, &museum), Err(DateError::Malformed));
        // 2030-01-07 is a Monday
        assert_eq!(
            parse_visit_date("2030-01-07", today, &museum),
            Err(DateError::Closed(Weekday::Mon))
        );
    }

    #[test]
    fn test_extract_all_contact_fields() {
        let fragments = extract_contact("Asha Rao, asha@example.com, 98765 43210");
        assert_eq!(fragments.name.as_deref(), Some("Asha Rao"));
        assert_eq!(
            fragments.email,
            Some(Fragment::Valid("asha@example.com".to_string()))
        );
        assert_eq!(fragments.phone, Some(Fragment::Valid("98765 43210".to_string())));
    }

    #[test]
    fn test_extract_with_filler_words() {
        let fragments =
            extract_contact("My name is Asha Rao and my email is asha@example.com.");
        assert_eq!(fragments.name.as_deref(), Some("Asha Rao"));
        assert_eq!(
            fragments.email,
            Some(Fragment::Valid("asha@example.com".to_string()))
        );
        assert_eq!(fragments.phone, None);
    }

    #[test]
    fn test_extract_phone_only() {
        let fragments = extract_contact("phone: +91 98765-43210");
        assert_eq!(fragments.name, None);
        assert_eq!(
            fragments.phone,
            Some(Fragment::Valid("+91 98765-43210".to_string()))
        );
    }

    #[test]
    fn test_extract_invalid_fragments() {
        let fragments = extract_contact("asha@example 1234567");
        assert_eq!(
            fragments.email,
            Some(Fragment::Invalid("asha@example".to_string()))
        );
        assert_eq!(fragments.phone, Some(Fragment::Invalid("1234567".to_string())));
    }

    #[test]
    fn test_phone_run_stops_once_complete() {
        let fragments = extract_contact("Asha Rao 9876543210 2");
        assert_eq!(fragments.phone, Some(Fragment::Valid("9876543210".to_string())));

        let fragments = extract_contact("call 98765 43210 12 please");
        assert_eq!(fragments.phone, Some(Fragment::Valid("98765 43210".to_string())));
    }

    #[test]
    fn test_name_cue_detected() {
        assert!(extract_contact("My name is Asha Rao").name_cued);
        assert!(extract_contact("I am Asha").name_cued);
        assert!(extract_contact("i'm Asha").name_cued);
        assert!(!extract_contact("Asha Rao, asha@example.com").name_cued);
    }

    #[test]
    fn test_acknowledgements_are_not_names() {
        let fragments = extract_contact("sure, asha@example.com");
        assert_eq!(fragments.name, None);
    }

    #[test]
    fn test_clock_times_are_not_counts() {
        assert_eq!(parse_counts("2 adults at 10:30"), Ok(counts(2, 0, 0)));
        assert_eq!(parse_counts("10:30"), Err(CountsError::NoNumbers));
        assert_eq!(parse_counts("3 kids, arriving 9:00:00"), Ok(counts(0, 0, 3)));
        assert_eq!(parse_counts("2: adults"), Ok(counts(2, 0, 0)));
    }

    #[test]
    fn test_short_numbers_are_not_phones() {
        let fragments = extract_contact("Room 42");
        assert_eq!(fragments.phone, None);
        assert_eq!(fragments.name.as_deref(), Some("Room"));
    }
}
