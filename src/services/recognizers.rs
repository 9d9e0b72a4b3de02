//! Answer recognizers
//!
//! Lightweight recognition for replies that arrive as plain text: date/time
//! resolution for the scheduling prompt and choice matching for the service
//! type prompt. Channels that already resolve these upstream send the result
//! as an [`ActivityValue`](crate::models::ActivityValue) instead.

use std::sync::OnceLock;
use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use serde::{Deserialize, Serialize};
use crate::utils::helpers::normalize_input;

const DATE_TIME_FORMATS: &[&str] = &[
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M %p",
    "%m/%d/%Y %I:%M%p",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %I:%M %p",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
];

/// An hour followed by am/pm with no minutes, e.g. `9am` or `11 PM`
const HOUR_ONLY_PATTERN: &str = r"(?i)(^|[^:\d])(\d{1,2})\s*(am|pm)\b";

const DATE_FORMATS: &[&str] = &["%m/%d/%Y", "%Y-%m-%d"];

const ORDINALS: &[&str] = &["first", "second", "third", "fourth", "fifth", "sixth"];

/// Minimum share of the reply's words that must belong to a choice
const MIN_TOKEN_SCORE: f32 = 0.5;

/// Resolve date/time candidates from free text
///
/// A date without a time resolves to midnight.
pub fn recognize_date_times(text: &str) -> Vec<NaiveDateTime> {
    let cleaned = text
        .split_whitespace()
        .filter(|word| !word.eq_ignore_ascii_case("at"))
        .collect::<Vec<_>>()
        .join(" ");

    if cleaned.is_empty() {
        return Vec::new();
    }
    let cleaned = with_minutes(&cleaned);

    let mut resolutions: Vec<NaiveDateTime> = DATE_TIME_FORMATS
        .iter()
        .filter_map(|format| NaiveDateTime::parse_from_str(&cleaned, format).ok())
        .collect();

    if resolutions.is_empty() {
        resolutions = DATE_FORMATS
            .iter()
            .filter_map(|format| NaiveDate::parse_from_str(&cleaned, format).ok())
            .filter_map(|date| date.and_hms_opt(0, 0, 0))
            .collect();
    }

    resolutions.sort();
    resolutions.dedup();
    resolutions
}

/// Rewrite hour-only times to `H:00 am` so the minute formats apply
fn with_minutes(text: &str) -> String {
    static HOUR_ONLY: OnceLock<Option<Regex>> = OnceLock::new();
    match HOUR_ONLY.get_or_init(|| Regex::new(HOUR_ONLY_PATTERN).ok()) {
        Some(pattern) => pattern.replace_all(text, "${1}${2}:00 ${3}").into_owned(),
        None => text.to_string(),
    }
}

/// One selectable option of a choice prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub value: String,
    #[serde(default)]
    pub synonyms: Vec<String>,
}

impl Choice {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            synonyms: Vec::new(),
        }
    }

    pub fn with_synonyms(mut self, synonyms: &[&str]) -> Self {
        self.synonyms = synonyms.iter().map(|s| s.to_string()).collect();
        self
    }

    fn tokens(&self) -> Vec<String> {
        std::iter::once(&self.value)
            .chain(self.synonyms.iter())
            .flat_map(|text| tokenize(text))
            .collect()
    }
}

/// Build choices from plain values
pub fn to_choices(values: &[String]) -> Vec<Choice> {
    values.iter().map(Choice::new).collect()
}

/// A recognized choice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoundChoice {
    pub value: String,
    pub index: usize,
    pub score: f32,
}

/// Match a reply against a list of choices
///
/// Tries, in order: the choice text or a synonym, a 1-based number or an
/// ordinal word, then word overlap. Ties are treated as no match.
pub fn recognize_choice(text: &str, choices: &[Choice]) -> Option<FoundChoice> {
    let normalized = normalize_input(text);
    if normalized.is_empty() || choices.is_empty() {
        return None;
    }

    for (index, choice) in choices.iter().enumerate() {
        let exact = normalize_input(&choice.value) == normalized
            || choice.synonyms.iter().any(|s| normalize_input(s) == normalized);
        if exact {
            return Some(found(choice, index, 1.0));
        }
    }

    let ordinal = normalized
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .or_else(|| ORDINALS.iter().position(|word| *word == normalized));
    if let Some(index) = ordinal {
        return choices.get(index).map(|choice| found(choice, index, 1.0));
    }

    let words = tokenize(&normalized);
    if words.is_empty() {
        return None;
    }

    let mut best: Option<(usize, f32)> = None;
    let mut tied = false;
    for (index, choice) in choices.iter().enumerate() {
        let tokens = choice.tokens();
        let matched = words.iter().filter(|word| tokens.contains(word)).count();
        let score = matched as f32 / words.len() as f32;
        if score < MIN_TOKEN_SCORE {
            continue;
        }
        match best {
            Some((_, top)) if score < top => {}
            Some((_, top)) if (score - top).abs() < f32::EPSILON => tied = true,
            _ => {
                best = Some((index, score));
                tied = false;
            }
        }
    }

    match best {
        Some((index, score)) if !tied => Some(found(&choices[index], index, score)),
        _ => None,
    }
}

fn found(choice: &Choice, index: usize, score: f32) -> FoundChoice {
    FoundChoice {
        value: choice.value.clone(),
        index,
        score,
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
        .collect()
}
