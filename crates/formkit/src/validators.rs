//! Synchronous validators.
//!
//! Each validator is one variant of a closed union plus a user-facing
//! message. A validator may read other fields through operand references;
//! those references feed the owning control's dependency set.

use std::sync::OnceLock;

use regex::Regex;

use crate::controls::Control;
use crate::data::FormData;
use crate::datetime;
use crate::refs::{self, VariableResolver};

// RFC-2822-derived pattern, matched case-insensitively over the whole value.
const EMAIL_PATTERN: &str = concat!(
    r#"(?:[a-zA-Z0-9!#$%\&'*+/=?\^_`{|}~-]+(?:\.[a-zA-Z0-9!#$%\&'*+/=?\^_`{|}~-]+)*"#,
    r#"|"(?:[\x01-\x08\x0b\x0c\x0e-\x1f\x21\x23-\x5b\x5d-\x7f]|\\[\x01-\x09\x0b\x0c\x0e-\x7f])*")"#,
    r#"@(?:(?:[a-z0-9](?:[a-z0-9-]*[a-z0-9])?\.)+[a-z0-9](?:[a-z0-9-]*[a-z0-9])?"#,
    r#"|\[(?:(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\.){3}"#,
    r#"(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?|[a-z0-9-]*[a-z0-9]:"#,
    r#"(?:[\x01-\x08\x0b\x0c\x0e-\x1f\x21-\x5a\x53-\x7f]|\\[\x01-\x09\x0b\x0c\x0e-\x7f])+)\])"#
);

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(&format!("^(?i){EMAIL_PATTERN}$")).expect("email pattern is valid")
    })
}

/// The closed set of synchronous checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidatorKind {
    Required,
    AnswerMustMatch { value: String },
    Email,
    Date,
    DateTime,
    DateMustBeAfter { value: String },
    DateMustBeBefore { value: String },
    MustBeBetween { min: String, max: String },
    MinimumWordCount { count: usize },
}

/// A check plus the message shown when it fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validator {
    pub kind: ValidatorKind,
    pub message: String,
}

impl Validator {
    pub fn required(message: &str) -> Self {
        Self::new(ValidatorKind::Required, message)
    }

    pub fn answer_must_match(value: &str, message: &str) -> Self {
        Self::new(
            ValidatorKind::AnswerMustMatch {
                value: value.to_string(),
            },
            message,
        )
    }

    pub fn email(message: &str) -> Self {
        Self::new(ValidatorKind::Email, message)
    }

    pub fn date(message: &str) -> Self {
        Self::new(ValidatorKind::Date, message)
    }

    pub fn date_time(message: &str) -> Self {
        Self::new(ValidatorKind::DateTime, message)
    }

    pub fn date_must_be_after(min: &str, message: &str) -> Self {
        Self::new(
            ValidatorKind::DateMustBeAfter {
                value: min.to_string(),
            },
            message,
        )
    }

    pub fn date_must_be_before(max: &str, message: &str) -> Self {
        Self::new(
            ValidatorKind::DateMustBeBefore {
                value: max.to_string(),
            },
            message,
        )
    }

    pub fn must_be_between(min: &str, max: &str, message: &str) -> Self {
        Self::new(
            ValidatorKind::MustBeBetween {
                min: min.to_string(),
                max: max.to_string(),
            },
            message,
        )
    }

    pub fn minimum_word_count(count: usize, message: &str) -> Self {
        Self::new(ValidatorKind::MinimumWordCount { count }, message)
    }

    fn new(kind: ValidatorKind, message: &str) -> Self {
        Self {
            kind,
            message: message.to_string(),
        }
    }

    /// Short label used in validity-change notifications.
    pub fn kind_label(&self) -> &'static str {
        match self.kind {
            ValidatorKind::Required => "Required",
            ValidatorKind::AnswerMustMatch { .. } => "AnswerMustMatch",
            ValidatorKind::Email => "Email",
            ValidatorKind::Date => "Date",
            ValidatorKind::DateTime => "DateTime",
            ValidatorKind::DateMustBeAfter { .. } => "DateMustBeAfter",
            ValidatorKind::DateMustBeBefore { .. } => "DateMustBeBefore",
            ValidatorKind::MustBeBetween { .. } => "MustBeBetween",
            ValidatorKind::MinimumWordCount { .. } => "MinimumWordCount",
        }
    }

    /// Field names this validator's operands reference.
    pub fn references(&self) -> Vec<String> {
        let operands: Vec<&String> = match &self.kind {
            ValidatorKind::AnswerMustMatch { value }
            | ValidatorKind::DateMustBeAfter { value }
            | ValidatorKind::DateMustBeBefore { value } => vec![value],
            ValidatorKind::MustBeBetween { min, max } => vec![min, max],
            _ => Vec::new(),
        };

        operands
            .into_iter()
            .filter_map(|operand| refs::field_reference(operand))
            .map(str::to_string)
            .collect()
    }

    /// Run the check against the control's current answer.
    pub fn is_valid(
        &self,
        control: &Control,
        data: &FormData,
        variables: &dyn VariableResolver,
    ) -> bool {
        let answer = data.get_value(&control.name);

        match &self.kind {
            ValidatorKind::Required => {
                // An option control with no options cannot be answered and
                // passes the requirement.
                !answer.is_empty() || control.has_empty_option_list()
            }
            ValidatorKind::AnswerMustMatch { value } => {
                answer == refs::resolve(value, data, variables)
            }
            ValidatorKind::Email => answer.is_empty() || email_regex().is_match(&answer),
            ValidatorKind::Date => {
                answer.is_empty() || datetime::parse_datetime(&answer).is_some()
            }
            ValidatorKind::DateTime => {
                answer.is_empty()
                    || (answer.contains(':') && datetime::parse_datetime(&answer).is_some())
            }
            ValidatorKind::DateMustBeAfter { value } => {
                if answer.is_empty() {
                    return true;
                }
                let bound = refs::resolve(value, data, variables);
                match (
                    datetime::parse_datetime(&answer),
                    datetime::parse_datetime(&bound),
                ) {
                    (Some(answer), Some(bound)) => answer > bound,
                    _ => false,
                }
            }
            ValidatorKind::DateMustBeBefore { value } => {
                if answer.is_empty() {
                    return true;
                }
                let bound = refs::resolve(value, data, variables);
                match (
                    datetime::parse_datetime(&answer),
                    datetime::parse_datetime(&bound),
                ) {
                    (Some(answer), Some(bound)) => answer < bound,
                    _ => false,
                }
            }
            ValidatorKind::MustBeBetween { min, max } => {
                if answer.is_empty() {
                    return true;
                }
                let min = refs::resolve(min, data, variables);
                let max = refs::resolve(max, data, variables);
                if control.is_date_kind() {
                    date_in_range(&answer, &min, &max)
                } else {
                    numeric_in_range(&answer, &min, &max)
                }
            }
            ValidatorKind::MinimumWordCount { count } => {
                answer.split_whitespace().count() >= *count
            }
        }
    }
}

// An unparsable side leaves a date range check passing; this mirrors the
// numeric asymmetry the engine has always had.
fn date_in_range(answer: &str, min: &str, max: &str) -> bool {
    match (
        datetime::parse_datetime(answer),
        datetime::parse_datetime(min),
        datetime::parse_datetime(max),
    ) {
        (Some(value), Some(min), Some(max)) => min < value && value < max,
        _ => true,
    }
}

fn numeric_in_range(answer: &str, min: &str, max: &str) -> bool {
    match (
        answer.parse::<i64>(),
        min.parse::<i64>(),
        max.parse::<i64>(),
    ) {
        (Ok(value), Ok(min), Ok(max)) => min < value && value < max,
        _ => false,
    }
}
