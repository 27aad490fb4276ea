//! Date and time normalization for calendar navigation and class lookup.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeParseError {
    #[error("unrecognized time '{0}' (expected H:MM or H:MM am/pm)")]
    Time(String),
    #[error("unrecognized date '{0}' (expected YYYY-MM-DD)")]
    Date(String),
    #[error("unrecognized calendar header '{0}'")]
    Header(String),
}

/// `H:MM`, `HH:MM`, `H:MMam`, `H:MM pm`. The meridiem is optional.
static TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(\d{1,2}):(\d{2})\s*([ap]\.?m\.?)?\s*$").expect("valid time regex")
});

/// Same shape as [`TIME_RE`] but unanchored, for pulling a time out of event text.
static TIME_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d{1,2}):(\d{2})(?:\s*([ap])\.?m\b\.?)?").expect("valid token regex")
});

static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d{4})-(\d{2})-(\d{2})\s*$").expect("valid date regex"));

const MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetTime {
    pub hour24: u8,
    pub minute: u8,
}

impl TargetTime {
    pub fn new(hour24: u8, minute: u8) -> Option<Self> {
        (hour24 < 24 && minute < 60).then_some(Self { hour24, minute })
    }

    pub fn parse(input: &str) -> Result<Self, TimeParseError> {
        let err = || TimeParseError::Time(input.to_string());
        let caps = TIME_RE.captures(input).ok_or_else(err)?;
        let hour: u8 = caps[1].parse().map_err(|_| err())?;
        let minute: u8 = caps[2].parse().map_err(|_| err())?;
        let meridiem = caps.get(3).map(|m| m.as_str());
        Self::from_parts(hour, minute, meridiem).ok_or_else(err)
    }

    fn from_parts(hour: u8, minute: u8, meridiem: Option<&str>) -> Option<Self> {
        let hour24 = match meridiem.map(|m| m.to_ascii_lowercase()) {
            None => hour,
            Some(m) => {
                if !(1..=12).contains(&hour) {
                    return None;
                }
                let pm = m.starts_with('p');
                match (hour, pm) {
                    (12, false) => 0,
                    (12, true) => 12,
                    (h, false) => h,
                    (h, true) => h + 12,
                }
            }
        };
        Self::new(hour24, minute)
    }
}

impl fmt::Display for TargetTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour24, self.minute)
    }
}

/// First time token found in `text`, as written (lowercased, spaces removed)
/// and normalized.
pub fn extract_time_token(text: &str) -> Option<(String, TargetTime)> {
    let caps = TIME_TOKEN_RE.captures(text)?;
    let hour: u8 = caps[1].parse().ok()?;
    let minute: u8 = caps[2].parse().ok()?;
    let meridiem = caps.get(3).map(|m| m.as_str().to_ascii_lowercase());
    let time = TargetTime::from_parts(hour, minute, meridiem.as_deref())?;
    let token = match &meridiem {
        Some(m) => format!("{}:{:02}{}m", hour, minute, m),
        None => format!("{}:{:02}", hour, minute),
    };
    Some((token, time))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetDate {
    pub year: i32,
    pub month: u8,
    pub day: u8,
}

impl TargetDate {
    pub fn parse(input: &str) -> Result<Self, TimeParseError> {
        let err = || TimeParseError::Date(input.to_string());
        let caps = DATE_RE.captures(input).ok_or_else(err)?;
        let year: i32 = caps[1].parse().map_err(|_| err())?;
        let month: u8 = caps[2].parse().map_err(|_| err())?;
        let day: u8 = caps[3].parse().map_err(|_| err())?;
        if !(1..=12).contains(&month) || day == 0 || day > days_in_month(year, month) {
            return Err(err());
        }
        Ok(Self { year, month, day })
    }

    pub fn month_year(&self) -> MonthYear {
        MonthYear {
            year: self.year,
            month: self.month,
        }
    }
}

impl fmt::Display for TargetDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

fn days_in_month(year: i32, month: u8) -> u8 {
    match month {
        4 | 6 | 9 | 11 => 30,
        2 if (year % 4 == 0 && year % 100 != 0) || year % 400 == 0 => 29,
        2 => 28,
        _ => 31,
    }
}

/// Month shown by a calendar header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthYear {
    pub year: i32,
    pub month: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonthStep {
    Forward,
    Backward,
    Stay,
}

impl MonthYear {
    /// `year * 12 + month`, so adjacent months differ by one across years.
    pub fn linear_index(&self) -> i64 {
        self.year as i64 * 12 + self.month as i64
    }

    /// Which way to page the date picker to get from `self` to `target`.
    pub fn step_towards(&self, target: &MonthYear) -> MonthStep {
        match self.linear_index().cmp(&target.linear_index()) {
            Ordering::Less => MonthStep::Forward,
            Ordering::Greater => MonthStep::Backward,
            Ordering::Equal => MonthStep::Stay,
        }
    }

    /// Parses headers such as `November 2025`, `Nov 2025` or `nov. 2025`.
    pub fn parse_header(text: &str) -> Result<Self, TimeParseError> {
        let err = || TimeParseError::Header(text.to_string());
        let mut month = None;
        let mut year = None;
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            if year.is_none() && word.len() == 4 {
                if let Ok(y) = word.parse::<i32>() {
                    year = Some(y);
                    continue;
                }
            }
            if month.is_none() && word.len() >= 3 {
                let lower = word.to_ascii_lowercase();
                month = MONTHS
                    .iter()
                    .position(|m| m.starts_with(&lower) || lower.starts_with(m))
                    .map(|i| i as u8 + 1);
            }
        }
        match (month, year) {
            (Some(month), Some(year)) => Ok(Self { year, month }),
            _ => Err(err()),
        }
    }
}

/// A visible calendar event and the time parsed from its text.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarEventCandidate {
    pub display_text: String,
    pub time_token: Option<String>,
    pub parsed_time: Option<TargetTime>,
}

impl CalendarEventCandidate {
    pub fn from_text(text: &str) -> Self {
        let display_text = text.split_whitespace().collect::<Vec<_>>().join(" ");
        match extract_time_token(&display_text) {
            Some((token, time)) => Self {
                display_text,
                time_token: Some(token),
                parsed_time: Some(time),
            },
            None => Self {
                display_text,
                time_token: None,
                parsed_time: None,
            },
        }
    }
}

/// Outcome of matching candidates against a requested time.
#[derive(Debug, Clone, PartialEq)]
pub enum EventMatch {
    /// Index of the first candidate whose time equals the target, plus how
    /// many candidates matched in total.
    Found { index: usize, matches: usize },
    NotFound { available: Vec<String> },
}

/// Exact hour and minute equality. No nearest-match tolerance.
pub fn match_event(candidates: &[CalendarEventCandidate], target: TargetTime) -> EventMatch {
    let mut hits = candidates
        .iter()
        .enumerate()
        .filter(|(_, c)| c.parsed_time == Some(target))
        .map(|(i, _)| i);
    match hits.next() {
        Some(index) => EventMatch::Found {
            index,
            matches: 1 + hits.count(),
        },
        None => EventMatch::NotFound {
            available: candidates
                .iter()
                .filter_map(|c| c.time_token.clone())
                .collect(),
        },
    }
}
