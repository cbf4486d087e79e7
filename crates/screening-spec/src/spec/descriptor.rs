use std::sync::LazyLock;

use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SpecError;
use crate::note::Note;

static OPTION_BRACKETS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[|\]$").expect("valid option bracket regex"));

/// Question descriptor exactly as the screening server sends it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RawDescriptor {
    pub question: String,
    #[serde(default)]
    pub response_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<RawOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<Vec<String>>,
    /// `"<index>,<value>"` visibility gate. The spelling is part of the wire format.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependancy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optional: Option<OptionalFlag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

/// Choice labels for `Int` questions, either a list or a bracketed string such as `"[a, b]"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum RawOptions {
    List(Vec<String>),
    Joined(String),
}

impl RawOptions {
    /// An empty joined string carries no options at all.
    pub fn is_blank(&self) -> bool {
        matches!(self, RawOptions::Joined(text) if text.trim().is_empty())
    }

    pub fn labels(&self) -> Vec<String> {
        match self {
            RawOptions::List(items) => items.clone(),
            RawOptions::Joined(text) => OPTION_BRACKETS
                .replace_all(text, "")
                .split(',')
                .map(|label| label.trim().to_string())
                .collect(),
        }
    }
}

/// The server marks optional questions with the string `"True"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum OptionalFlag {
    Flag(bool),
    Text(String),
}

impl OptionalFlag {
    pub fn is_set(&self) -> bool {
        match self {
            OptionalFlag::Flag(flag) => *flag,
            OptionalFlag::Text(text) => text == "True",
        }
    }
}

/// Typed response kind; one variant per `response_type`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseKind {
    Boolean,
    Int { options: Option<Vec<String>> },
    Float,
    Date,
    DateList,
    StringList,
    String,
}

/// Show the owning question only while widget `index` holds `value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    pub index: usize,
    pub value: String,
}

impl Dependency {
    pub fn parse(raw: &str) -> Option<Self> {
        let mut parts = raw.split(',').map(str::trim);
        let index = parts.next()?.parse().ok()?;
        let value = parts.next()?.to_string();
        Some(Self { index, value })
    }
}

/// A descriptor after ingestion: compound strings are parsed and never re-read.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionDescriptor {
    pub question: String,
    pub response: ResponseKind,
    pub note: Option<Note>,
    pub dependency: Option<Dependency>,
    pub optional: bool,
    pub default: Option<Value>,
}

impl QuestionDescriptor {
    pub fn from_raw(index: usize, raw: &RawDescriptor) -> Result<Self, SpecError> {
        let response = match raw.response_type.as_str() {
            "Boolean" => ResponseKind::Boolean,
            "Int" => ResponseKind::Int {
                options: raw
                    .options
                    .as_ref()
                    .filter(|options| !options.is_blank())
                    .map(RawOptions::labels),
            },
            "Float" => ResponseKind::Float,
            "Date" => ResponseKind::Date,
            "DateList" => ResponseKind::DateList,
            "StringList" => ResponseKind::StringList,
            _ => ResponseKind::String,
        };

        let dependency = match raw.dependancy.as_deref() {
            None => None,
            Some(text) if text.trim().is_empty() => None,
            Some(text) => Some(Dependency::parse(text).ok_or_else(|| {
                SpecError::InvalidDependency {
                    index,
                    raw: text.to_string(),
                }
            })?),
        };

        let note = raw
            .note
            .as_deref()
            .filter(|text| !text.is_empty())
            .map(|text| Note::parse(text, raw.link.as_deref().unwrap_or_default()));

        Ok(Self {
            question: raw.question.clone(),
            response,
            note,
            dependency,
            optional: raw.optional.as_ref().is_some_and(OptionalFlag::is_set),
            default: raw.default.clone(),
        })
    }

    /// Value sent when the question is hidden, or optional and left empty.
    pub fn fallback(&self) -> Value {
        self.default
            .clone()
            .unwrap_or_else(|| Value::String(String::new()))
    }
}

/// Parse a whole batch, keeping positional order.
pub fn parse_descriptors(raw: &[RawDescriptor]) -> Result<Vec<QuestionDescriptor>, SpecError> {
    raw.iter()
        .enumerate()
        .map(|(index, descriptor)| QuestionDescriptor::from_raw(index, descriptor))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> RawDescriptor {
        serde_json::from_value(value).expect("descriptor")
    }

    #[test]
    fn unknown_response_type_falls_back_to_string() {
        let descriptor = QuestionDescriptor::from_raw(
            0,
            &raw(json!({ "question": "Q", "response_type": "Blob" })),
        )
        .expect("parse");
        assert_eq!(descriptor.response, ResponseKind::String);
    }

    #[test]
    fn empty_option_string_means_no_options() {
        let descriptor = QuestionDescriptor::from_raw(
            0,
            &raw(json!({ "question": "How many?", "response_type": "Int", "options": "" })),
        )
        .expect("parse");
        assert_eq!(descriptor.response, ResponseKind::Int { options: None });
    }

    #[test]
    fn bracketed_options_are_split_and_trimmed() {
        let descriptor = QuestionDescriptor::from_raw(
            0,
            &raw(json!({
                "question": "Case type",
                "response_type": "Int",
                "options": "[Felony, Misdemeanor , Arrest]"
            })),
        )
        .expect("parse");
        assert_eq!(
            descriptor.response,
            ResponseKind::Int {
                options: Some(vec![
                    "Felony".to_string(),
                    "Misdemeanor".to_string(),
                    "Arrest".to_string()
                ])
            }
        );
    }

    #[test]
    fn list_options_are_kept() {
        let descriptor = QuestionDescriptor::from_raw(
            0,
            &raw(json!({ "question": "Pick", "response_type": "Int", "options": ["a", "b"] })),
        )
        .expect("parse");
        assert!(matches!(
            descriptor.response,
            ResponseKind::Int { options: Some(ref labels) } if labels.len() == 2
        ));
    }

    #[test]
    fn dependency_is_parsed_eagerly() {
        let descriptor = QuestionDescriptor::from_raw(
            3,
            &raw(json!({ "question": "Q", "response_type": "Date", "dependancy": "2, yes" })),
        )
        .expect("parse");
        assert_eq!(
            descriptor.dependency,
            Some(Dependency {
                index: 2,
                value: "yes".into()
            })
        );
    }

    #[test]
    fn malformed_dependency_is_rejected() {
        let err = QuestionDescriptor::from_raw(
            4,
            &raw(json!({ "question": "Q", "response_type": "Date", "dependancy": "two,yes" })),
        )
        .unwrap_err();
        assert!(matches!(err, SpecError::InvalidDependency { index: 4, .. }));
    }

    #[test]
    fn optional_marker_and_fallback() {
        let descriptor = QuestionDescriptor::from_raw(
            0,
            &raw(json!({
                "question": "Fines",
                "response_type": "Int",
                "optional": "True",
                "default": 0
            })),
        )
        .expect("parse");
        assert!(descriptor.optional);
        assert_eq!(descriptor.fallback(), json!(0));

        let plain =
            QuestionDescriptor::from_raw(0, &raw(json!({ "question": "Name", "default": null })))
                .expect("parse");
        assert!(!plain.optional);
        assert_eq!(plain.fallback(), json!(""));
    }
}
