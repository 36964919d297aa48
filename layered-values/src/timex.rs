//! TIMEX2 normalization against the document date.
//!
//! ```text
//! "January 5 , 2004"  -> 2004-01-05
//! "last week"         -> 2004-W02      (document date 2004-01-12)
//! "three years ago"   -> 2001
//! "every Monday"      -> XXXX-WXX-1    (set)
//! "now"               -> PRESENT_REF
//! ```
//!
//! Expressions relative to the document date stay unnormalized when the
//! document has no date.

use chrono::{Datelike, Duration, Months, NaiveDate, Weekday};
use layered_resolution::DocTheory;
use once_cell::sync::Lazy;
use regex::Regex;

pub const PRESENT_REF: &str = "PRESENT_REF";
pub const PAST_REF: &str = "PAST_REF";
pub const FUTURE_REF: &str = "FUTURE_REF";

static ISO_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})-(\d{1,2})-(\d{1,2})$").expect("Invalid iso date regex"));
static MONTH_DAY_YEAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([a-z]+)\.? (\d{1,2})(?:st|nd|rd|th)?,?(?: (\d{4}))?$").expect("Invalid month day regex")
});
static DAY_MONTH_YEAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,2})(?:st|nd|rd|th)? (?:of )?([a-z]+)\.?,?(?: (\d{4}))?$").expect("Invalid day month regex")
});
static SLASH_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{4}|\d{2})$").expect("Invalid slash date regex"));
static MONTH_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([a-z]+)\.?,?(?: of)? (\d{4})$").expect("Invalid month year regex"));
static YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([12]\d{3})$").expect("Invalid year regex"));
static DECADE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([12]\d\d)0 ?'?s$").expect("Invalid decade regex"));
static RELATIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(last|past|previous|next|coming|this) ([a-z]+)$").expect("Invalid relative regex")
});
static AGO: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\S+) (day|week|month|year)s? ago$").expect("Invalid ago regex"));
static EVERY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:every|each) ([a-z]+)$").expect("Invalid every regex"));
static SPECIFIC_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}").expect("Invalid specific date regex"));

/// A normalized temporal value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timex {
    pub value: String,
    /// Recurring expressions ("every week").
    pub set: bool,
}

impl Timex {
    fn point(value: impl Into<String>) -> Self {
        Timex {
            value: value.into(),
            set: false,
        }
    }

    fn recurring(value: impl Into<String>) -> Self {
        Timex {
            value: value.into(),
            set: true,
        }
    }
}

/// True for values that name a calendar day.
pub fn is_specific_date(value: &str) -> bool {
    SPECIFIC_DATE.is_match(value)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unit {
    Day,
    Week,
    Month,
    Year,
}

impl Unit {
    fn parse(text: &str) -> Option<Self> {
        match text {
            "day" | "days" => Some(Unit::Day),
            "week" | "weeks" => Some(Unit::Week),
            "month" | "months" => Some(Unit::Month),
            "year" | "years" => Some(Unit::Year),
            _ => None,
        }
    }

    fn period(self) -> &'static str {
        match self {
            Unit::Day => "P1D",
            Unit::Week => "P1W",
            Unit::Month => "P1M",
            Unit::Year => "P1Y",
        }
    }
}

fn parse_month(text: &str) -> Option<u32> {
    match text {
        "january" | "jan" => Some(1),
        "february" | "feb" => Some(2),
        "march" | "mar" => Some(3),
        "april" | "apr" => Some(4),
        "may" => Some(5),
        "june" | "jun" => Some(6),
        "july" | "jul" => Some(7),
        "august" | "aug" => Some(8),
        "september" | "sep" | "sept" => Some(9),
        "october" | "oct" => Some(10),
        "november" | "nov" => Some(11),
        "december" | "dec" => Some(12),
        _ => None,
    }
}

fn parse_weekday(text: &str) -> Option<Weekday> {
    match text.trim_end_matches('s') {
        "monday" | "mon" => Some(Weekday::Mon),
        "tuesday" | "tue" | "tues" => Some(Weekday::Tue),
        "wednesday" | "wed" => Some(Weekday::Wed),
        "thursday" | "thu" | "thur" => Some(Weekday::Thu),
        "friday" | "fri" => Some(Weekday::Fri),
        "saturday" | "sat" => Some(Weekday::Sat),
        "sunday" | "sun" => Some(Weekday::Sun),
        _ => None,
    }
}

fn parse_count(text: &str) -> Option<u32> {
    if let Ok(n) = text.parse::<u32>() {
        return Some(n);
    }
    match text {
        "one" | "a" | "an" => Some(1),
        "two" => Some(2),
        "three" => Some(3),
        "four" => Some(4),
        "five" => Some(5),
        "six" => Some(6),
        "seven" => Some(7),
        "eight" => Some(8),
        "nine" => Some(9),
        "ten" => Some(10),
        "eleven" => Some(11),
        "twelve" => Some(12),
        "twenty" => Some(20),
        "thirty" => Some(30),
        "fifty" => Some(50),
        "hundred" => Some(100),
        _ => None,
    }
}

/// Lowercase, glue punctuation tokens back on and drop leading function words.
fn clean(text: &str) -> String {
    let mut s = text.to_lowercase().split_whitespace().collect::<Vec<_>>().join(" ");
    for (from, to) in [(" ,", ","), (" .", "."), (" / ", "/"), (" - ", "-"), (" '", "'")] {
        s = s.replace(from, to);
    }
    loop {
        let stripped = ["the ", "on ", "in ", "at ", "during ", "since ", "until "]
            .iter()
            .find_map(|prefix| s.strip_prefix(prefix).map(str::to_string));
        match stripped {
            Some(rest) => s = rest,
            None => break,
        }
    }
    s.trim_end_matches(|c| c == '.' || c == ',').to_string()
}

fn ymd(year: i32, month: u32, day: u32) -> Option<String> {
    NaiveDate::from_ymd_opt(year, month, day).map(|d| d.format("%Y-%m-%d").to_string())
}

fn format_unit(date: NaiveDate, unit: Unit) -> String {
    match unit {
        Unit::Day => date.format("%Y-%m-%d").to_string(),
        Unit::Week => date.format("%G-W%V").to_string(),
        Unit::Month => date.format("%Y-%m").to_string(),
        Unit::Year => date.format("%Y").to_string(),
    }
}

/// Move `date` by `amount` units; negative goes back.
fn shift(date: NaiveDate, unit: Unit, amount: i64) -> Option<NaiveDate> {
    let months = |n: i64| Months::new(n.unsigned_abs() as u32);
    match unit {
        Unit::Day => date.checked_add_signed(Duration::days(amount)),
        Unit::Week => date.checked_add_signed(Duration::weeks(amount)),
        Unit::Month if amount < 0 => date.checked_sub_months(months(amount)),
        Unit::Month => date.checked_add_months(months(amount)),
        Unit::Year if amount < 0 => date.checked_sub_months(months(amount * 12)),
        Unit::Year => date.checked_add_months(months(amount * 12)),
    }
}

/// Normalizes timex text, resolving relative expressions against `anchor`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemporalNormalizer {
    anchor: Option<NaiveDate>,
}

impl TemporalNormalizer {
    pub fn new(anchor: Option<NaiveDate>) -> Self {
        TemporalNormalizer { anchor }
    }

    pub fn anchor(&self) -> Option<NaiveDate> {
        self.anchor
    }

    pub fn normalize(&self, text: &str) -> Option<Timex> {
        let text = clean(text);
        if text.is_empty() {
            return None;
        }
        Self::reference(&text)
            .or_else(|| self.absolute(&text))
            .or_else(|| self.deictic(&text))
            .or_else(|| self.relative(&text))
            .or_else(|| self.ago(&text))
            .or_else(|| Self::recurring(&text))
    }

    fn reference(text: &str) -> Option<Timex> {
        let value = match text {
            "now" | "right now" | "currently" | "present" | "nowadays" | "these days" => PRESENT_REF,
            "past" | "recently" | "formerly" | "previously" => PAST_REF,
            "future" | "soon" => FUTURE_REF,
            _ => return None,
        };
        Some(Timex::point(value))
    }

    fn absolute(&self, text: &str) -> Option<Timex> {
        if let Some(caps) = ISO_DATE.captures(text) {
            return ymd(caps[1].parse().ok()?, caps[2].parse().ok()?, caps[3].parse().ok()?).map(Timex::point);
        }
        if let Some(caps) = MONTH_DAY_YEAR.captures(text) {
            if let Some(month) = parse_month(&caps[1]) {
                let day: u32 = caps[2].parse().ok()?;
                return self.day_in_year(caps.get(3).map(|y| y.as_str()), month, day);
            }
        }
        if let Some(caps) = DAY_MONTH_YEAR.captures(text) {
            if let Some(month) = parse_month(&caps[2]) {
                let day: u32 = caps[1].parse().ok()?;
                return self.day_in_year(caps.get(3).map(|y| y.as_str()), month, day);
            }
        }
        if let Some(caps) = SLASH_DATE.captures(text) {
            let month: u32 = caps[1].parse().ok()?;
            let day: u32 = caps[2].parse().ok()?;
            let mut year: i32 = caps[3].parse().ok()?;
            if caps[3].len() == 2 {
                year += if year >= 50 { 1900 } else { 2000 };
            }
            return ymd(year, month, day).map(Timex::point);
        }
        if let Some(caps) = MONTH_YEAR.captures(text) {
            let month = parse_month(&caps[1])?;
            return Some(Timex::point(format!("{}-{:02}", &caps[2], month)));
        }
        if let Some(caps) = YEAR.captures(text) {
            return Some(Timex::point(caps[1].to_string()));
        }
        if let Some(caps) = DECADE.captures(text) {
            return Some(Timex::point(caps[1].to_string()));
        }
        None
    }

    /// A day with an explicit year, else the document's year, else `XXXX`.
    fn day_in_year(&self, year: Option<&str>, month: u32, day: u32) -> Option<Timex> {
        let year = match year {
            Some(year) => Some(year.parse::<i32>().ok()?),
            None => self.anchor.map(|a| a.year()),
        };
        match year {
            Some(year) => ymd(year, month, day).map(Timex::point),
            // leap day is fine for an unknown year
            None => ymd(2000, month, day).map(|_| Timex::point(format!("XXXX-{:02}-{:02}", month, day))),
        }
    }

    fn deictic(&self, text: &str) -> Option<Timex> {
        let anchor = self.anchor?;
        let (offset, suffix) = match text {
            "today" => (0, ""),
            "yesterday" => (-1, ""),
            "tomorrow" => (1, ""),
            "tonight" => (0, "TNI"),
            "this morning" => (0, "TMO"),
            "this afternoon" => (0, "TAF"),
            "this evening" => (0, "TEV"),
            "last night" => (-1, "TNI"),
            _ => return None,
        };
        let date = shift(anchor, Unit::Day, offset)?;
        Some(Timex::point(format!("{}{}", format_unit(date, Unit::Day), suffix)))
    }

    fn relative(&self, text: &str) -> Option<Timex> {
        let caps = RELATIVE.captures(text)?;
        let anchor = self.anchor?;
        let direction: i64 = match &caps[1] {
            "last" | "past" | "previous" => -1,
            "next" | "coming" => 1,
            _ => 0,
        };
        if let Some(weekday) = parse_weekday(&caps[2]) {
            return Some(Timex::point(format_unit(Self::weekday_near(anchor, weekday, direction), Unit::Day)));
        }
        let unit = Unit::parse(&caps[2])?;
        let date = shift(anchor, unit, direction)?;
        Some(Timex::point(format_unit(date, unit)))
    }

    /// Strictly before the anchor, strictly after, or within the anchor's week.
    fn weekday_near(anchor: NaiveDate, weekday: Weekday, direction: i64) -> NaiveDate {
        let from = i64::from(anchor.weekday().num_days_from_monday());
        let to = i64::from(weekday.num_days_from_monday());
        let days = match direction {
            d if d < 0 => -((from - to + 6).rem_euclid(7) + 1),
            d if d > 0 => (to - from + 6).rem_euclid(7) + 1,
            _ => to - from,
        };
        anchor + Duration::days(days)
    }

    fn ago(&self, text: &str) -> Option<Timex> {
        let caps = AGO.captures(text)?;
        let anchor = self.anchor?;
        let count = parse_count(&caps[1])?;
        let unit = Unit::parse(&caps[2])?;
        let date = shift(anchor, unit, -i64::from(count))?;
        Some(Timex::point(format_unit(date, unit)))
    }

    fn recurring(text: &str) -> Option<Timex> {
        let unit = match text {
            "daily" => Some(Unit::Day),
            "weekly" => Some(Unit::Week),
            "monthly" => Some(Unit::Month),
            "yearly" | "annually" => Some(Unit::Year),
            _ => None,
        };
        if let Some(unit) = unit {
            return Some(Timex::recurring(unit.period()));
        }
        let caps = EVERY.captures(text)?;
        if let Some(weekday) = parse_weekday(&caps[1]) {
            return Some(Timex::recurring(format!("XXXX-WXX-{}", weekday.number_from_monday())));
        }
        Unit::parse(&caps[1]).map(|unit| Timex::recurring(unit.period()))
    }
}

/// Normalize every TIMEX2 value of the document's value set.
///
/// Returns the number of values that received a normalized value.
pub fn normalize_timex_values(doc: &mut DocTheory) -> usize {
    let normalizer = TemporalNormalizer::new(doc.date);
    let mut normalized = 0;
    for value in doc.value_set.iter_mut().filter(|v| v.value_type.is_timex()) {
        match normalizer.normalize(&value.text) {
            Some(timex) => {
                value.timex_value = Some(timex.value);
                value.timex_set = timex.set;
                normalized += 1;
            }
            None => log::debug!("no normalization for timex `{}`", value.text),
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anchored() -> TemporalNormalizer {
        TemporalNormalizer::new(NaiveDate::from_ymd_opt(2004, 1, 12))
    }

    fn value(normalizer: &TemporalNormalizer, text: &str) -> Option<String> {
        normalizer.normalize(text).map(|t| t.value)
    }

    #[test]
    fn absolute_forms() {
        let n = TemporalNormalizer::default();
        assert_eq!(value(&n, "2004-01-05").as_deref(), Some("2004-01-05"));
        assert_eq!(value(&n, "January 5 , 2004").as_deref(), Some("2004-01-05"));
        assert_eq!(value(&n, "Jan . 5 2004").as_deref(), Some("2004-01-05"));
        assert_eq!(value(&n, "5 January 2004").as_deref(), Some("2004-01-05"));
        assert_eq!(value(&n, "01 / 05 / 2004").as_deref(), Some("2004-01-05"));
        assert_eq!(value(&n, "March 1998").as_deref(), Some("1998-03"));
        assert_eq!(value(&n, "in 1998").as_deref(), Some("1998"));
        assert_eq!(value(&n, "the 1990s").as_deref(), Some("199"));
        assert_eq!(value(&n, "February 30 , 2004"), None);
    }

    #[test]
    fn missing_year_uses_document_year() {
        assert_eq!(value(&anchored(), "March 3").as_deref(), Some("2004-03-03"));
        assert_eq!(value(&TemporalNormalizer::default(), "March 3").as_deref(), Some("XXXX-03-03"));
    }

    #[test]
    fn deictic_and_reference() {
        let n = anchored();
        assert_eq!(value(&n, "today").as_deref(), Some("2004-01-12"));
        assert_eq!(value(&n, "yesterday").as_deref(), Some("2004-01-11"));
        assert_eq!(value(&n, "tonight").as_deref(), Some("2004-01-12TNI"));
        assert_eq!(value(&n, "now").as_deref(), Some(PRESENT_REF));
        assert_eq!(value(&TemporalNormalizer::default(), "currently").as_deref(), Some(PRESENT_REF));
        assert_eq!(value(&TemporalNormalizer::default(), "today"), None);
    }

    #[test]
    fn relative_to_document_date() {
        // 2004-01-12 is a Monday in ISO week 3
        let n = anchored();
        assert_eq!(value(&n, "last week").as_deref(), Some("2004-W02"));
        assert_eq!(value(&n, "next month").as_deref(), Some("2004-02"));
        assert_eq!(value(&n, "last year").as_deref(), Some("2003"));
        assert_eq!(value(&n, "last Friday").as_deref(), Some("2004-01-09"));
        assert_eq!(value(&n, "next Monday").as_deref(), Some("2004-01-19"));
        assert_eq!(value(&n, "last Monday").as_deref(), Some("2004-01-05"));
        assert_eq!(value(&n, "this Wednesday").as_deref(), Some("2004-01-14"));
        assert_eq!(value(&n, "three years ago").as_deref(), Some("2001"));
        assert_eq!(value(&n, "10 days ago").as_deref(), Some("2004-01-02"));
        assert_eq!(value(&n, "two months ago").as_deref(), Some("2003-11"));
    }

    #[test]
    fn recurring_expressions_are_sets() {
        let n = TemporalNormalizer::default();
        assert_eq!(n.normalize("every Monday"), Some(Timex::recurring("XXXX-WXX-1")));
        assert_eq!(n.normalize("each week"), Some(Timex::recurring("P1W")));
        assert_eq!(n.normalize("annually"), Some(Timex::recurring("P1Y")));
    }

    #[test]
    fn specific_dates() {
        assert!(is_specific_date("2004-01-05"));
        assert!(is_specific_date("2004-01-05TNI"));
        assert!(!is_specific_date("2004-W02"));
        assert!(!is_specific_date(PRESENT_REF));
    }
}
