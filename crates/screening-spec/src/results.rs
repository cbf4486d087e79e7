use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Result entry as returned by `/api/results`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RawResultItem {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub data: Value,
}

/// Verdict for one case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseVerdict {
    pub case_name: String,
    pub verdict: String,
    pub eligible: bool,
}

impl CaseVerdict {
    pub fn new(case_name: impl Into<String>, verdict: impl Into<String>) -> Self {
        let verdict = verdict.into();
        let eligible = is_eligible(&verdict);
        Self {
            case_name: case_name.into(),
            verdict,
            eligible,
        }
    }
}

/// A verdict reads eligible when it says "expungeable" but not "not expungeable".
pub fn is_eligible(verdict: &str) -> bool {
    let lower = verdict.to_lowercase();
    lower.contains("expungeable") && !lower.contains("not expungeable")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultItem {
    Cases(Vec<CaseVerdict>),
    Message(String),
}

impl From<RawResultItem> for ResultItem {
    fn from(raw: RawResultItem) -> Self {
        match (raw.kind.as_str(), raw.data) {
            ("cases", Value::Object(cases)) => ResultItem::Cases(
                cases
                    .into_iter()
                    .map(|(case_name, verdict)| CaseVerdict::new(case_name, display_value(verdict)))
                    .collect(),
            ),
            (_, data) => ResultItem::Message(display_value(data)),
        }
    }
}

pub fn results_from_raw(raw: Vec<RawResultItem>) -> Vec<ResultItem> {
    raw.into_iter().map(ResultItem::from).collect()
}

fn display_value(value: Value) -> String {
    match value {
        Value::String(text) => text,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
