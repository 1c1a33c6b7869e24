//! French natural-language date parser
//!
//! Turns loosely formatted expressions such as "6 février", "début mars" or
//! "dans une semaine" into canonical `YYYY-MM-DD` strings. Input that no
//! rule recognises is returned unchanged so that validation further down can
//! reject it.

use chrono::{Datelike, Days, Local, Months, NaiveDate};

/// Month names accepted by the parser, with and without accents
const MONTHS: &[(&str, u32)] = &[
    ("janvier", 1),
    ("février", 2),
    ("fevrier", 2),
    ("mars", 3),
    ("avril", 4),
    ("mai", 5),
    ("juin", 6),
    ("juillet", 7),
    ("août", 8),
    ("aout", 8),
    ("septembre", 9),
    ("octobre", 10),
    ("novembre", 11),
    ("décembre", 12),
    ("decembre", 12),
];

/// A single recognition rule: returns the canonical date when it matches
type Matcher = fn(&DateRequest<'_>) -> Option<String>;

/// Rules in priority order. The first one that matches wins.
const MATCHERS: &[(&str, Matcher)] = &[
    ("iso", match_iso),
    ("numeric", match_numeric),
    ("day_month", match_day_month),
    ("start_of_month", match_start_of_month),
    ("mid_month", match_mid_month),
    ("end_of_month", match_end_of_month),
    ("today", match_today),
    ("tomorrow", match_tomorrow),
    ("relative", match_relative),
];

/// An expression to resolve and the date relative terms are anchored on
#[derive(Debug, Clone, Copy)]
pub struct DateRequest<'a> {
    /// Trimmed, lowercased expression
    pub expression: &'a str,
    /// The day considered "today"
    pub reference: NaiveDate,
}

/// Parser bound to a reference date
#[derive(Debug, Clone, Copy)]
pub struct DateParser {
    reference: NaiveDate,
}

impl Default for DateParser {
    fn default() -> Self {
        Self::today()
    }
}

impl DateParser {
    /// Creates a parser that resolves relative expressions against `reference`
    pub fn new(reference: NaiveDate) -> Self {
        Self { reference }
    }

    /// Creates a parser anchored on the local calendar date
    pub fn today() -> Self {
        Self::new(Local::now().date_naive())
    }

    pub fn reference(&self) -> NaiveDate {
        self.reference
    }

    /// Normalizes an expression against this parser's reference date
    pub fn parse(&self, input: &str) -> String {
        parse(input, self.reference)
    }
}

/// Normalizes a human date expression to `YYYY-MM-DD`
///
/// # Arguments
/// * `input` - Expression as typed by a user, e.g. "mi-avril" or "15/03/2026"
/// * `reference` - Date used for "demain", "dans 3 jours" and year inference
///
/// # Returns
/// The canonical date string, or `input` untouched when nothing matches.
/// Structurally valid but impossible dates (e.g. "31 février") are
/// formatted anyway and left for validation to reject.
pub fn parse(input: &str, reference: NaiveDate) -> String {
    let cleaned = input.trim().to_lowercase();
    let request = DateRequest {
        expression: &cleaned,
        reference,
    };

    for (name, matcher) in MATCHERS {
        if let Some(date) = matcher(&request) {
            tracing::debug!(rule = name, input, date = %date, "date expression resolved");
            return date;
        }
    }

    input.to_string()
}

fn match_iso(request: &DateRequest<'_>) -> Option<String> {
    let parts: Vec<&str> = request.expression.split('-').collect();
    match parts.as_slice() {
        [y, m, d] if is_digits(y, 4, 4) && is_digits(m, 2, 2) && is_digits(d, 2, 2) => {
            Some(request.expression.to_string())
        }
        _ => None,
    }
}

/// `DD/MM/YYYY` or `DD-MM-YYYY`, one or two digits for day and month
fn match_numeric(request: &DateRequest<'_>) -> Option<String> {
    let parts: Vec<&str> = request.expression.split(['/', '-']).collect();
    match parts.as_slice() {
        [d, m, y] if is_digits(d, 1, 2) && is_digits(m, 1, 2) && is_digits(y, 4, 4) => {
            Some(canonical(y.parse().ok()?, m.parse().ok()?, d.parse().ok()?))
        }
        _ => None,
    }
}

/// "6 février" or "6 février 2026"
fn match_day_month(request: &DateRequest<'_>) -> Option<String> {
    let (first, rest) = request.expression.split_once(char::is_whitespace)?;
    if !is_digits(first, 1, 2) {
        return None;
    }
    let (month, year) = month_and_year(rest, request.reference)?;
    Some(canonical(year, month, first.parse().ok()?))
}

/// "début mars" -> first of the month
fn match_start_of_month(request: &DateRequest<'_>) -> Option<String> {
    let rest = strip_word(request.expression, &["début", "debut"])?;
    let (month, year) = month_and_year(rest, request.reference)?;
    Some(canonical(year, month, 1))
}

/// "mi-avril", "mi avril" or "miavril" -> the 15th
fn match_mid_month(request: &DateRequest<'_>) -> Option<String> {
    let rest = request.expression.strip_prefix("mi")?;
    let rest = rest
        .strip_prefix('-')
        .or_else(|| rest.strip_prefix(' '))
        .unwrap_or(rest);
    let (month, year) = month_and_year(rest, request.reference)?;
    Some(canonical(year, month, 15))
}

/// "fin février" -> last calendar day of the month
fn match_end_of_month(request: &DateRequest<'_>) -> Option<String> {
    let rest = strip_word(request.expression, &["fin"])?;
    let (month, year) = month_and_year(rest, request.reference)?;
    let last = last_day_of_month(year, month)?;
    Some(format_date(last))
}

fn match_today(request: &DateRequest<'_>) -> Option<String> {
    matches!(
        request.expression,
        "aujourd'hui" | "aujourd’hui" | "aujourdhui"
    )
    .then(|| format_date(request.reference))
}

fn match_tomorrow(request: &DateRequest<'_>) -> Option<String> {
    if request.expression != "demain" {
        return None;
    }
    request
        .reference
        .checked_add_days(Days::new(1))
        .map(format_date)
}

/// "dans 3 jours", "dans une semaine", "dans 2 mois"
fn match_relative(request: &DateRequest<'_>) -> Option<String> {
    let mut words = request.expression.split_whitespace();
    if words.next()? != "dans" {
        return None;
    }
    let quantity_word = words.next()?;
    let unit = words.next()?;
    if words.next().is_some() {
        return None;
    }

    let quantity: u32 = match quantity_word {
        "un" | "une" => 1,
        digits if is_digits(digits, 1, 9) => digits.parse().ok()?,
        _ => return None,
    };

    let reference = request.reference;
    let target = match unit {
        "jour" | "jours" => reference.checked_add_days(Days::new(u64::from(quantity))),
        "semaine" | "semaines" => {
            reference.checked_add_days(Days::new(u64::from(quantity) * 7))
        }
        // Month arithmetic clamps to the last valid day (31 jan + 1 mois = 28/29 fev)
        "mois" => reference.checked_add_months(Months::new(quantity)),
        _ => None,
    }?;

    Some(format_date(target))
}

/// Parses "<month> [year]" and infers the year when it is omitted
fn month_and_year(text: &str, reference: NaiveDate) -> Option<(u32, i32)> {
    let mut words = text.split_whitespace();
    let month = month_number(words.next()?)?;
    let year = match words.next() {
        Some(y) if is_digits(y, 4, 4) => y.parse().ok()?,
        Some(_) => return None,
        None => infer_year(month, reference),
    };
    if words.next().is_some() {
        return None;
    }
    Some((month, year))
}

/// A month earlier than the reference month means next year's occurrence
pub fn infer_year(month: u32, reference: NaiveDate) -> i32 {
    if month < reference.month() {
        reference.year() + 1
    } else {
        reference.year()
    }
}

fn month_number(name: &str) -> Option<u32> {
    MONTHS
        .iter()
        .find(|(candidate, _)| *candidate == name)
        .map(|(_, number)| *number)
}

fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    first.checked_add_months(Months::new(1))?.pred_opt()
}

/// Strips a leading keyword followed by whitespace
fn strip_word<'a>(text: &'a str, words: &[&str]) -> Option<&'a str> {
    let (first, rest) = text.split_once(char::is_whitespace)?;
    words.contains(&first).then_some(rest)
}

fn is_digits(s: &str, min: usize, max: usize) -> bool {
    (min..=max).contains(&s.len()) && s.bytes().all(|b| b.is_ascii_digit())
}

fn canonical(year: i32, month: u32, day: u32) -> String {
    format!("{:04}-{:02}-{:02}", year, month, day)
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
