use anyhow::{Context, Result};
use chrono::NaiveDate;
use clausewise_core::types::{DurationUnit, TimelineEntry, TimelineValue};
use regex::{Captures, Regex};

pub const DEADLINE_KEYWORDS: &[&str] = &[
    "deadline",
    "due date",
    "expiry",
    "termination date",
    "completion date",
];

const MONTHS: &str =
    "january|february|march|april|may|june|july|august|september|october|november|december";

/// Field order of the captures in each date pattern.
#[derive(Clone, Copy)]
enum DateShape {
    /// 12/31/2024, 12-31-2024
    NumericMdy,
    /// March 5, 2024
    MonthDayYear,
    /// 5 March 2024
    DayMonthYear,
}

pub struct TimelineExtractor {
    dates: Vec<(Regex, DateShape)>,
    duration: Regex,
}

impl TimelineExtractor {
    pub fn new() -> Result<Self> {
        let patterns = [
            (r"\b(\d{1,2})/(\d{1,2})/(\d{4})\b".to_string(), DateShape::NumericMdy),
            (r"\b(\d{1,2})-(\d{1,2})-(\d{4})\b".to_string(), DateShape::NumericMdy),
            (
                format!(r"(?i)\b({MONTHS})\s+(\d{{1,2}}),?\s+(\d{{4}})\b"),
                DateShape::MonthDayYear,
            ),
            (
                format!(r"(?i)\b(\d{{1,2}})\s+({MONTHS})\s+(\d{{4}})\b"),
                DateShape::DayMonthYear,
            ),
        ];
        let dates = patterns
            .into_iter()
            .map(|(p, shape)| {
                Regex::new(&p)
                    .map(|re| (re, shape))
                    .with_context(|| format!("bad date pattern {p:?}"))
            })
            .collect::<Result<Vec<_>>>()?;
        let duration = Regex::new(
            r"(?i)\b(?:(within|after|before|no later than)\s+)?((\d+)\s+(day|week|month|year)s?)\b",
        )
        .context("bad duration pattern")?;
        Ok(Self { dates, duration })
    }

    /// Dates, durations and deadline keywords, in sentence order. Within a
    /// sentence: dates first, then durations, then deadline keywords.
    pub fn extract(&self, text: &str) -> Vec<TimelineEntry> {
        let mut out = Vec::new();
        for (sentence_id, sentence) in crate::sentences(text) {
            if sentence.is_empty() {
                continue;
            }
            for (re, shape) in &self.dates {
                for caps in re.captures_iter(sentence) {
                    out.push(TimelineEntry {
                        sentence_id,
                        raw_text: caps[0].to_string(),
                        value: TimelineValue::Date {
                            date: parse_date(&caps, *shape),
                        },
                    });
                }
            }
            for caps in self.duration.captures_iter(sentence) {
                let (Some(amount), Some(unit)) = (
                    caps[3].parse::<u64>().ok(),
                    DurationUnit::parse(&caps[4]),
                ) else {
                    continue;
                };
                out.push(TimelineEntry {
                    sentence_id,
                    raw_text: caps[2].to_string(),
                    value: TimelineValue::Duration {
                        amount,
                        unit,
                        qualifier: caps.get(1).map(|q| q.as_str().to_lowercase()),
                    },
                });
            }
            let lower = sentence.to_lowercase();
            for keyword in DEADLINE_KEYWORDS {
                if lower.contains(keyword) {
                    out.push(TimelineEntry {
                        sentence_id,
                        raw_text: (*keyword).to_string(),
                        value: TimelineValue::Deadline,
                    });
                }
            }
        }
        out
    }
}

fn month_number(name: &str) -> Option<u32> {
    let lower = name.to_lowercase();
    MONTHS
        .split('|')
        .position(|m| m == lower)
        .map(|i| i as u32 + 1)
}

fn parse_date(caps: &Captures<'_>, shape: DateShape) -> Option<NaiveDate> {
    let (year, month, day) = match shape {
        DateShape::NumericMdy => (
            caps[3].parse().ok()?,
            caps[1].parse().ok()?,
            caps[2].parse().ok()?,
        ),
        DateShape::MonthDayYear => (
            caps[3].parse().ok()?,
            month_number(&caps[1])?,
            caps[2].parse().ok()?,
        ),
        DateShape::DayMonthYear => (
            caps[3].parse().ok()?,
            month_number(&caps[2])?,
            caps[1].parse().ok()?,
        ),
    };
    NaiveDate::from_ymd_opt(year, month, day)
}
