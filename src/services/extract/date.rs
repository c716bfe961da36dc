use chrono::{Datelike, Days, NaiveDate};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::{normalize, number_word};

const MONTH: &str = r"(jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sept?(?:ember)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)";

static ISO: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{4})-(\d{1,2})-(\d{1,2})\b").expect("valid pattern"));

static NUMERIC_DMY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(\d{1,2})[/.-](\d{1,2})[/.-](\d{4})\b").expect("valid pattern")
});

static NUMERIC_DM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{1,2})/(\d{1,2})\b").expect("valid pattern"));

static DAY_MONTH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"\b(\d{{1,2}})(?:st|nd|rd|th)?\s+(?:of\s+)?{MONTH}\.?(?:,?\s+(\d{{4}}))?\b"
    ))
    .expect("valid pattern")
});

static MONTH_DAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"\b{MONTH}\.?\s+(?:the\s+)?(\d{{1,2}})(?:st|nd|rd|th)?(?:,?\s+(\d{{4}}))?\b"
    ))
    .expect("valid pattern")
});

static RELATIVE_IN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bin\s+(\d{1,3}|[a-z]+)\s+(days?|weeks?)\b").expect("valid pattern")
});

static RELATIVE_FROM_NOW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(\d{1,3}|[a-z]+)\s+(days?|weeks?)\s+from\s+(?:now|today)\b")
        .expect("valid pattern")
});

static WEEKDAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(?:(next|this|on)\s+)?(monday|mon|tuesday|tues|tue|wednesday|wed|thursday|thurs|thur|thu|friday|fri|saturday|sat|sunday|sun)\b",
    )
    .expect("valid pattern")
});

static TODAY: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(?:today|tonight)\b").expect("valid pattern"));

static TOMORROW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:tomorrow|tomorow|tommorow|tommorrow|tmrw|tmr)\b").expect("valid pattern")
});

static DAY_AFTER_TOMORROW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bday\s+after\s+(?:tomorrow|tomorow|tommorow|tmrw)\b").expect("valid pattern")
});

static NEXT_WEEK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bnext\s+week\b").expect("valid pattern"));

/// Parses a free-text date, resolving anything relative or year-less toward
/// the future as seen from `today`.
///
/// Explicit calendar forms win over relative phrases. A recognised form that
/// names an impossible date (`2027-02-30`) is rejected outright rather than
/// falling through to the relative rules.
pub fn parse_date(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    let text = normalize(text);
    if text.is_empty() {
        return None;
    }

    if let Some(caps) = ISO.captures(&text) {
        return ymd(num(&caps, 1)?, num(&caps, 2)?, num(&caps, 3)?);
    }
    if let Some(caps) = NUMERIC_DMY.captures(&text) {
        return ymd(num(&caps, 3)?, num(&caps, 2)?, num(&caps, 1)?);
    }
    if let Some(caps) = DAY_MONTH.captures(&text) {
        let day = num(&caps, 1)?;
        let month = month_number(caps.get(2)?.as_str())?;
        return with_optional_year(caps.get(3), month, day, today);
    }
    if let Some(caps) = MONTH_DAY.captures(&text) {
        let month = month_number(caps.get(1)?.as_str())?;
        let day = num(&caps, 2)?;
        return with_optional_year(caps.get(3), month, day, today);
    }
    if let Some(caps) = NUMERIC_DM.captures(&text) {
        return next_occurrence(num(&caps, 2)?, num(&caps, 1)?, today);
    }

    relative(&text, today)
}

fn relative(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    if DAY_AFTER_TOMORROW.is_match(text) {
        return today.checked_add_days(Days::new(2));
    }
    // Before the single-word rules so "a week from today" is not read as today.
    if let Some(caps) = RELATIVE_IN
        .captures(text)
        .or_else(|| RELATIVE_FROM_NOW.captures(text))
    {
        let count = count_word(caps.get(1)?.as_str())?;
        let unit = if caps.get(2)?.as_str().starts_with("week") { 7 } else { 1 };
        return today.checked_add_days(Days::new(count * unit));
    }
    if TOMORROW.is_match(text) {
        return today.checked_add_days(Days::new(1));
    }
    if TODAY.is_match(text) {
        return Some(today);
    }
    if NEXT_WEEK.is_match(text) {
        return today.checked_add_days(Days::new(7));
    }
    if let Some(caps) = WEEKDAY.captures(text) {
        let target = weekday_index(caps.get(2)?.as_str())?;
        let current = today.weekday().num_days_from_monday();
        let mut ahead = (target + 7 - current) % 7;
        if ahead == 0 && caps.get(1).map(|m| m.as_str()) == Some("next") {
            ahead = 7;
        }
        return today.checked_add_days(Days::new(u64::from(ahead)));
    }
    None
}

fn num(caps: &Captures, index: usize) -> Option<u32> {
    caps.get(index)?.as_str().parse().ok()
}

fn ymd(year: u32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(i32::try_from(year).ok()?, month, day)
}

fn with_optional_year(
    year: Option<regex::Match>,
    month: u32,
    day: u32,
    today: NaiveDate,
) -> Option<NaiveDate> {
    match year {
        Some(y) => ymd(y.as_str().parse().ok()?, month, day),
        None => next_occurrence(month, day, today),
    }
}

/// The first `month`/`day` on or after `today`; looks a few years ahead so
/// 29 February resolves to the next leap year.
fn next_occurrence(month: u32, day: u32, today: NaiveDate) -> Option<NaiveDate> {
    (0..=4)
        .filter_map(|offset| NaiveDate::from_ymd_opt(today.year() + offset, month, day))
        .find(|date| *date >= today)
}

fn month_number(name: &str) -> Option<u32> {
    let month = match name.get(..3)? {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

fn weekday_index(name: &str) -> Option<u32> {
    let index = match name.get(..3)? {
        "mon" => 0,
        "tue" => 1,
        "wed" => 2,
        "thu" => 3,
        "fri" => 4,
        "sat" => 5,
        "sun" => 6,
        _ => return None,
    };
    Some(index)
}

fn count_word(word: &str) -> Option<u64> {
    match word {
        "a" | "an" => Some(1),
        w => w
            .parse()
            .ok()
            .or_else(|| number_word(w).map(u64::from)),
    }
}
