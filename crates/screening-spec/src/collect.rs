use chrono::NaiveDate;
use serde_json::Value;
use thiserror::Error;

use crate::form::{Control, FormState, INPUT_DATE_FORMAT};
use crate::spec::descriptor::{QuestionDescriptor, ResponseKind};

/// Date format the screening server expects in answers.
pub const ANSWER_DATE_FORMAT: &str = "%m-%d-%Y";

/// Why a batch of answers could not be collected. Collection is all-or-nothing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CollectError {
    #[error("question {index} has no widget")]
    MissingWidget { index: usize },
    #[error("question {index} requires an answer")]
    Incomplete { index: usize },
    #[error("question {index} holds an invalid date '{value}'")]
    InvalidDate { index: usize, value: String },
}

/// `YYYY-MM-DD` -> `MM-DD-YYYY`.
pub fn reformat_date(raw: &str) -> Option<String> {
    NaiveDate::parse_from_str(raw.trim(), INPUT_DATE_FORMAT)
        .ok()
        .map(|date| date.format(ANSWER_DATE_FORMAT).to_string())
}

/// Read every widget into a positional answer array, one entry per descriptor.
pub fn collect_answers(
    descriptors: &[QuestionDescriptor],
    form: &FormState,
) -> Result<Vec<Value>, CollectError> {
    descriptors
        .iter()
        .enumerate()
        .map(|(index, descriptor)| collect_one(index, descriptor, form))
        .collect()
}

fn collect_one(
    index: usize,
    descriptor: &QuestionDescriptor,
    form: &FormState,
) -> Result<Value, CollectError> {
    let control = form
        .control(index)
        .ok_or(CollectError::MissingWidget { index })?;

    if !form.is_visible(index) {
        return Ok(descriptor.fallback());
    }

    match &descriptor.response {
        ResponseKind::DateList => {
            let dates = rows(index, control)?
                .iter()
                .filter(|row| !row.is_empty())
                .map(|row| {
                    reformat_date(row).ok_or_else(|| CollectError::InvalidDate {
                        index,
                        value: row.clone(),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            if dates.is_empty() {
                Ok(descriptor.fallback())
            } else {
                Ok(Value::String(dates.join(",")))
            }
        }
        ResponseKind::StringList => {
            let items = rows(index, control)?
                .iter()
                .map(|row| row.trim())
                .filter(|row| !row.is_empty())
                .map(|row| Value::String(row.to_string()))
                .collect::<Vec<_>>();
            if items.is_empty() {
                Ok(descriptor.fallback())
            } else {
                Ok(Value::Array(items))
            }
        }
        kind => {
            let value = control
                .value()
                .ok_or(CollectError::MissingWidget { index })?;
            if is_unanswered(kind, &value) {
                return if descriptor.optional {
                    Ok(descriptor.fallback())
                } else {
                    Err(CollectError::Incomplete { index })
                };
            }
            match kind {
                ResponseKind::Date => reformat_date(&value)
                    .map(Value::String)
                    .ok_or(CollectError::InvalidDate { index, value }),
                _ => Ok(Value::String(value)),
            }
        }
    }
}

fn is_unanswered(kind: &ResponseKind, value: &str) -> bool {
    match kind {
        ResponseKind::String => value.trim().is_empty(),
        _ => value.is_empty(),
    }
}

fn rows(index: usize, control: &Control) -> Result<&[String], CollectError> {
    control.rows().ok_or(CollectError::MissingWidget { index })
}
